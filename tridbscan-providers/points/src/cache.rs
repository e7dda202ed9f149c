//! File-backed density cache scoped to one directory.
use std::{io, path::Path};

use cap_std::{ambient_authority, fs::Dir};
use csv::{ReaderBuilder, WriterBuilder};
use tracing::{debug, info};
use tridbscan_core::{DensityCache, DensityError};

use crate::errors::PointProviderError;

/// Stores density vectors as files inside a directory capability.
///
/// Each key names a file holding one density per line, in input row order,
/// with no header. Keys cannot escape the directory.
///
/// # Examples
/// ```no_run
/// use tridbscan_core::{GaussianKde, NoDensityCache, PointSet, attach_densities};
/// use tridbscan_providers_points::CsvDensityCache;
///
/// let cache = CsvDensityCache::open_ambient("cache")?;
/// let set = PointSet::from_coordinates("demo", &[(0.0, 0.0), (1.0, 0.2), (0.3, 1.0)])?;
/// let set = attach_densities(set, &GaussianKde, &cache, "density.csv")?;
/// assert!(set.densities().is_some());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct CsvDensityCache {
    dir: Dir,
}

impl CsvDensityCache {
    /// Wraps an already opened directory.
    #[must_use]
    pub fn new(dir: Dir) -> Self {
        Self { dir }
    }

    /// Opens `path` with ambient authority, creating it when missing.
    ///
    /// # Errors
    /// Returns [`PointProviderError::Io`] when the directory cannot be
    /// created or opened.
    pub fn open_ambient(path: impl AsRef<Path>) -> Result<Self, PointProviderError> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self::new(dir))
    }

    /// Loads the vector stored under `key`, or `None` when the file does
    /// not exist.
    ///
    /// # Errors
    /// Returns [`PointProviderError::Io`] or [`PointProviderError::Csv`]
    /// when the file cannot be read or a line is not a number.
    pub fn load(&self, key: &str) -> Result<Option<Vec<f64>>, PointProviderError> {
        let file = match self.dir.open(key) {
            Ok(file) => file,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        let values = ReaderBuilder::new()
            .has_headers(false)
            .from_reader(file)
            .deserialize::<f64>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(values))
    }

    /// Writes `values` under `key`, replacing any previous file.
    ///
    /// # Errors
    /// Returns [`PointProviderError::Io`] or [`PointProviderError::Csv`]
    /// when the file cannot be written.
    pub fn store(&self, key: &str, values: &[f64]) -> Result<(), PointProviderError> {
        let file = self.dir.create(key)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        for value in values {
            writer.serialize(value)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl DensityCache for CsvDensityCache {
    fn load_or_compute(
        &self,
        key: &str,
        compute: &mut dyn FnMut() -> Result<Vec<f64>, DensityError>,
    ) -> Result<Vec<f64>, DensityError> {
        if let Some(values) = self.load(key).map_err(|error| cache_error(key, &error))? {
            debug!(key, values = values.len(), "density cache hit");
            return Ok(values);
        }
        let values = compute()?;
        self.store(key, &values)
            .map_err(|error| cache_error(key, &error))?;
        info!(key, values = values.len(), "density cache written");
        Ok(values)
    }
}

fn cache_error(key: &str, error: &PointProviderError) -> DensityError {
    DensityError::Cache {
        key: key.into(),
        message: error.to_string().into(),
    }
}
