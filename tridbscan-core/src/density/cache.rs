//! In-process density cache implementations.

use std::{collections::HashMap, sync::Mutex};

use super::DensityCache;
use crate::error::DensityError;

/// A cache that never stores anything and always recomputes.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDensityCache;

impl DensityCache for NoDensityCache {
    fn load_or_compute(
        &self,
        _key: &str,
        compute: &mut dyn FnMut() -> Result<Vec<f64>, DensityError>,
    ) -> Result<Vec<f64>, DensityError> {
        compute()
    }
}

/// A process-local cache keyed by string.
#[derive(Debug, Default)]
pub struct MemoryDensityCache {
    entries: Mutex<HashMap<String, Vec<f64>>>,
}

impl MemoryDensityCache {
    /// Number of cached vectors.
    ///
    /// # Errors
    /// Returns [`DensityError::Cache`] when the cache mutex is poisoned.
    pub fn entry_count(&self) -> Result<usize, DensityError> {
        self.entries
            .lock()
            .map(|entries| entries.len())
            .map_err(|_| poisoned("*"))
    }
}

impl DensityCache for MemoryDensityCache {
    fn load_or_compute(
        &self,
        key: &str,
        compute: &mut dyn FnMut() -> Result<Vec<f64>, DensityError>,
    ) -> Result<Vec<f64>, DensityError> {
        if let Some(hit) = self
            .entries
            .lock()
            .map_err(|_| poisoned(key))?
            .get(key)
            .cloned()
        {
            return Ok(hit);
        }

        let computed = compute()?;
        self.entries
            .lock()
            .map_err(|_| poisoned(key))?
            .insert(key.to_owned(), computed.clone());
        Ok(computed)
    }
}

fn poisoned(key: &str) -> DensityError {
    DensityError::Cache {
        key: key.into(),
        message: "cache mutex poisoned".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_errors_are_not_cached() {
        let cache = MemoryDensityCache::default();
        let mut failing = || -> Result<Vec<f64>, DensityError> {
            Err(DensityError::InsufficientPoints { points: 1 })
        };
        assert!(cache.load_or_compute("k", &mut failing).is_err());
        assert_eq!(cache.entry_count().expect("mutex is healthy"), 0);

        let mut succeeding = || -> Result<Vec<f64>, DensityError> { Ok(vec![1.0]) };
        assert_eq!(cache.load_or_compute("k", &mut succeeding), Ok(vec![1.0]));
        assert_eq!(cache.entry_count().expect("mutex is healthy"), 1);
    }

    #[test]
    fn no_cache_always_recomputes() {
        let mut calls = 0;
        let mut compute = || -> Result<Vec<f64>, DensityError> {
            calls += 1;
            Ok(vec![2.0])
        };
        for _ in 0..2 {
            assert_eq!(NoDensityCache.load_or_compute("k", &mut compute), Ok(vec![2.0]));
        }
        assert_eq!(calls, 2);
    }
}
