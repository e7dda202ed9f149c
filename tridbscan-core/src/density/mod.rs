//! Per-point density estimation and caching.
//!
//! The partitioner only needs one finite density per point. Estimators
//! produce them, caches avoid recomputing them for the same input, and
//! [`attach_densities`] ties the two together.

mod cache;
mod kde;

pub use self::{
    cache::{MemoryDensityCache, NoDensityCache},
    kde::GaussianKde,
};

use crate::{
    Result,
    error::{DensityError, TriDbscanError},
    point::PointSet,
};

/// Produces one density value per point, in positional order.
pub trait DensityEstimator {
    /// Estimates densities for every point in `points`.
    ///
    /// # Errors
    /// Returns a [`DensityError`] when the estimate cannot be formed.
    fn estimate(&self, points: &PointSet) -> core::result::Result<Vec<f64>, DensityError>;
}

/// Stores density vectors under string keys.
///
/// # Examples
/// ```
/// use tridbscan_core::{DensityCache, DensityError, MemoryDensityCache};
///
/// let cache = MemoryDensityCache::default();
/// let mut calls = 0;
/// let mut compute = || {
///     calls += 1;
///     Ok::<_, DensityError>(vec![0.5, 0.25])
/// };
/// assert_eq!(cache.load_or_compute("demo", &mut compute)?, vec![0.5, 0.25]);
/// assert_eq!(cache.load_or_compute("demo", &mut compute)?, vec![0.5, 0.25]);
/// assert_eq!(calls, 1);
/// # Ok::<(), DensityError>(())
/// ```
pub trait DensityCache {
    /// Returns the vector stored under `key`, calling `compute` and storing
    /// its output when nothing is cached yet.
    ///
    /// # Errors
    /// Propagates errors from `compute` and returns
    /// [`DensityError::Cache`] when the cache itself fails.
    fn load_or_compute(
        &self,
        key: &str,
        compute: &mut dyn FnMut() -> core::result::Result<Vec<f64>, DensityError>,
    ) -> core::result::Result<Vec<f64>, DensityError>;
}

/// Ensures every point in `points` carries a density.
///
/// Sets that already carry densities are returned unchanged. Otherwise the
/// cache is consulted under `key` and the estimator runs on a miss.
///
/// # Errors
/// Returns [`TriDbscanError::Density`] when estimation or the cache fails,
/// or when the resolved vector does not hold exactly one value per point.
///
/// # Examples
/// ```
/// use tridbscan_core::{GaussianKde, NoDensityCache, PointSet, attach_densities};
///
/// let set = PointSet::from_coordinates("demo", &[(0.0, 0.0), (1.0, 0.2), (0.3, 1.0), (2.0, 2.0)])?;
/// let set = attach_densities(set, &GaussianKde::default(), &NoDensityCache, "demo")?;
/// assert!(set.densities().is_some_and(|values| values.iter().all(|value| *value > 0.0)));
/// # Ok::<(), tridbscan_core::TriDbscanError>(())
/// ```
pub fn attach_densities<E, C>(points: PointSet, estimator: &E, cache: &C, key: &str) -> Result<PointSet>
where
    E: DensityEstimator + ?Sized,
    C: DensityCache + ?Sized,
{
    if points.densities().is_some() {
        return Ok(points);
    }

    let resolved = {
        let mut compute = || estimator.estimate(&points);
        cache.load_or_compute(key, &mut compute)
    };
    let values = resolved.map_err(|error| TriDbscanError::Density {
        data_source: points.shared_name(),
        error,
    })?;
    if values.len() != points.len() {
        return Err(TriDbscanError::Density {
            data_source: points.shared_name(),
            error: DensityError::LengthMismatch {
                expected: points.len(),
                actual: values.len(),
            },
        });
    }
    if let Some((index, &value)) = values.iter().enumerate().find(|(_, value)| !value.is_finite()) {
        return Err(TriDbscanError::Density {
            data_source: points.shared_name(),
            error: DensityError::NonFinite { index, value },
        });
    }
    points.with_densities(&values)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    use rstest::rstest;

    struct Fixed(Vec<f64>, Cell<usize>);

    impl DensityEstimator for Fixed {
        fn estimate(&self, _points: &PointSet) -> core::result::Result<Vec<f64>, DensityError> {
            self.1.set(self.1.get() + 1);
            Ok(self.0.clone())
        }
    }

    fn triangle() -> PointSet {
        PointSet::from_coordinates("tri", &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]).expect("finite")
    }

    #[test]
    fn existing_densities_skip_estimation() {
        let set = triangle().with_densities(&[1.0, 2.0, 3.0]).expect("one per point");
        let estimator = Fixed(vec![9.0; 3], Cell::new(0));
        let out = attach_densities(set, &estimator, &NoDensityCache, "tri").expect("kept");
        assert_eq!(out.densities(), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(estimator.1.get(), 0);
    }

    #[rstest]
    #[case(vec![1.0, 2.0], "DENSITY_LENGTH_MISMATCH")]
    #[case(vec![1.0, f64::NAN, 2.0], "DENSITY_NON_FINITE")]
    fn rejects_unusable_vectors(#[case] values: Vec<f64>, #[case] code: &str) {
        let estimator = Fixed(values, Cell::new(0));
        let err = attach_densities(triangle(), &estimator, &NoDensityCache, "tri")
            .expect_err("unusable densities must fail");
        assert_eq!(err.density_code().map(|inner| inner.as_str()), Some(code));
    }

    #[test]
    fn memory_cache_reuses_vectors_across_sets() {
        let cache = MemoryDensityCache::default();
        let estimator = Fixed(vec![0.1, 0.2, 0.3], Cell::new(0));
        for _ in 0..3 {
            let out = attach_densities(triangle(), &estimator, &cache, "tri").expect("resolved");
            assert_eq!(out.densities(), Some(vec![0.1, 0.2, 0.3]));
        }
        assert_eq!(estimator.1.get(), 1);
    }
}
