//! Builder utilities for configuring TriDBSCAN runs.
//!
//! Exposes the execution strategy and clustering mode selection surface and
//! the validation applied before constructing [`TriDbscan`] instances.

use std::{fmt, num::NonZeroUsize, sync::Arc};

use crate::{
    Result,
    density::{DensityCache, DensityEstimator, GaussianKde, NoDensityCache},
    error::{TriDbscanError, validate_min_pts},
    prune::GraphPruner,
    tridbscan::{DensitySource, TriDbscan},
};

/// Seed used for the random start-point selection when none is configured.
pub const DEFAULT_RNG_SEED: u64 = 0x5EED_CAFE;

/// Indicates how [`TriDbscan`] schedules independent partitions when
/// [`TriDbscan::run`] is invoked in density-guided mode.
///
/// `Auto` resolves deterministically: it selects the rayon pool when the
/// `parallel` feature is compiled in and sequential execution otherwise.
/// Labels are identical across strategies for a fixed seed.
///
/// # Examples
/// ```
/// use tridbscan_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::Auto;
/// assert!(matches!(strategy, ExecutionStrategy::Auto));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Allow the library to select an appropriate scheduler automatically.
    Auto,
    /// Process partitions one after another on the calling thread.
    Sequential,
    /// Process partitions on the rayon thread pool.
    Parallel,
}

/// Selects how the point set is clustered.
///
/// # Examples
/// ```
/// use tridbscan_core::ClusteringMode;
///
/// assert_eq!(ClusteringMode::default(), ClusteringMode::Direct);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusteringMode {
    /// Run the pipeline once on the full point set.
    #[default]
    Direct,
    /// Split the set into density-guided seed paths and cluster each one.
    DensityGuided,
}

/// Configures and constructs [`TriDbscan`] instances.
///
/// # Examples
/// ```
/// use tridbscan_core::{ClusteringMode, ExecutionStrategy, TriDbscanBuilder};
///
/// let tridbscan = TriDbscanBuilder::new()
///     .with_min_pts(4)
///     .with_mode(ClusteringMode::DensityGuided)
///     .with_execution_strategy(ExecutionStrategy::Sequential)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(tridbscan.min_pts().get(), 4);
/// assert_eq!(tridbscan.mode(), ClusteringMode::DensityGuided);
/// assert_eq!(tridbscan.execution_strategy(), ExecutionStrategy::Sequential);
/// ```
#[derive(Clone)]
pub struct TriDbscanBuilder {
    min_pts: usize,
    local_std: f64,
    min_sample: usize,
    mode: ClusteringMode,
    rng_seed: u64,
    execution_strategy: ExecutionStrategy,
    density: DensitySource,
}

impl Default for TriDbscanBuilder {
    fn default() -> Self {
        Self {
            min_pts: 5,
            local_std: GraphPruner::DEFAULT_LOCAL_STD,
            min_sample: 12,
            mode: ClusteringMode::Direct,
            rng_seed: DEFAULT_RNG_SEED,
            execution_strategy: ExecutionStrategy::Auto,
            density: DensitySource {
                estimator: Arc::new(GaussianKde),
                cache: Arc::new(NoDensityCache),
                key: None,
            },
        }
    }
}

impl fmt::Debug for TriDbscanBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriDbscanBuilder")
            .field("min_pts", &self.min_pts)
            .field("local_std", &self.local_std)
            .field("min_sample", &self.min_sample)
            .field("mode", &self.mode)
            .field("rng_seed", &self.rng_seed)
            .field("execution_strategy", &self.execution_strategy)
            .field("density_cache_key", &self.density.key)
            .finish_non_exhaustive()
    }
}

impl TriDbscanBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use tridbscan_core::{ExecutionStrategy, TriDbscanBuilder};
    ///
    /// let builder = TriDbscanBuilder::new();
    /// assert_eq!(builder.min_pts(), 5);
    /// assert_eq!(builder.local_std(), 2.5);
    /// assert_eq!(builder.min_sample(), 12);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Auto);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the neighbour count a point needs to be a core point.
    ///
    /// # Examples
    /// ```
    /// use tridbscan_core::TriDbscanBuilder;
    ///
    /// let builder = TriDbscanBuilder::new().with_min_pts(10);
    /// assert_eq!(builder.min_pts(), 10);
    /// ```
    #[must_use]
    pub fn with_min_pts(mut self, min_pts: usize) -> Self {
        self.min_pts = min_pts;
        self
    }

    /// Returns the configured core-point threshold.
    #[must_use]
    pub fn min_pts(&self) -> usize {
        self.min_pts
    }

    /// Overrides the multiplier used by the local pruning pass.
    ///
    /// # Examples
    /// ```
    /// use tridbscan_core::TriDbscanBuilder;
    ///
    /// let builder = TriDbscanBuilder::new().with_local_std(1.5);
    /// assert_eq!(builder.local_std(), 1.5);
    /// ```
    #[must_use]
    pub fn with_local_std(mut self, local_std: f64) -> Self {
        self.local_std = local_std;
        self
    }

    /// Returns the configured local pruning multiplier.
    #[must_use]
    pub fn local_std(&self) -> f64 {
        self.local_std
    }

    /// Overrides the number of unconditional seed-path extensions.
    #[must_use]
    pub fn with_min_sample(mut self, min_sample: usize) -> Self {
        self.min_sample = min_sample;
        self
    }

    /// Returns the configured number of unconditional seed-path extensions.
    #[must_use]
    pub fn min_sample(&self) -> usize {
        self.min_sample
    }

    /// Selects direct or density-guided clustering.
    #[must_use]
    pub fn with_mode(mut self, mode: ClusteringMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the configured clustering mode.
    #[must_use]
    pub fn mode(&self) -> ClusteringMode {
        self.mode
    }

    /// Sets the seed for the random start-point selection.
    ///
    /// # Examples
    /// ```
    /// use tridbscan_core::TriDbscanBuilder;
    ///
    /// let builder = TriDbscanBuilder::new().with_rng_seed(7);
    /// assert_eq!(builder.rng_seed(), 7);
    /// ```
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Returns the configured seed.
    #[must_use]
    pub fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Sets the execution strategy to use when running the algorithm.
    ///
    /// # Examples
    /// ```
    /// use tridbscan_core::{ExecutionStrategy, TriDbscanBuilder};
    ///
    /// let builder = TriDbscanBuilder::new().with_execution_strategy(ExecutionStrategy::Sequential);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Sequential);
    /// ```
    #[must_use]
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Returns the currently configured execution strategy.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Replaces the estimator used when density-guided input carries no
    /// densities. Defaults to [`GaussianKde`].
    #[must_use]
    pub fn with_density_estimator(
        mut self,
        estimator: Arc<dyn DensityEstimator + Send + Sync>,
    ) -> Self {
        self.density.estimator = estimator;
        self
    }

    /// Sets the cache consulted before estimating densities. Defaults to
    /// [`NoDensityCache`].
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use tridbscan_core::{ClusteringMode, MemoryDensityCache, PointSet, TriDbscanBuilder};
    ///
    /// let cache = Arc::new(MemoryDensityCache::default());
    /// let tridbscan = TriDbscanBuilder::new()
    ///     .with_mode(ClusteringMode::DensityGuided)
    ///     .with_density_cache(cache.clone())
    ///     .build()?;
    /// let coords: Vec<(f64, f64)> = (0..16)
    ///     .map(|i| (f64::from(i % 4), f64::from(i / 4) + 0.1 * f64::from(i % 4)))
    ///     .collect();
    /// tridbscan.run(&PointSet::from_coordinates("grid", &coords)?)?;
    /// assert_eq!(cache.entry_count()?, 1);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn with_density_cache(mut self, cache: Arc<dyn DensityCache + Send + Sync>) -> Self {
        self.density.cache = cache;
        self
    }

    /// Sets the key densities are cached under. Defaults to the name of the
    /// point set being clustered.
    #[must_use]
    pub fn with_density_cache_key(mut self, key: impl Into<Arc<str>>) -> Self {
        self.density.key = Some(key.into());
        self
    }

    /// Validates the configuration and constructs a [`TriDbscan`] instance.
    ///
    /// # Errors
    /// Returns [`TriDbscanError::InvalidMinPts`] or
    /// [`TriDbscanError::InvalidMinSample`] for zero counts and
    /// [`TriDbscanError::InvalidLocalStd`] when the multiplier is negative or
    /// not finite.
    ///
    /// # Examples
    /// ```
    /// use tridbscan_core::{TriDbscanBuilder, TriDbscanError};
    ///
    /// let err = TriDbscanBuilder::new().with_min_pts(0).build().unwrap_err();
    /// assert!(matches!(err, TriDbscanError::InvalidMinPts { got: 0 }));
    /// ```
    pub fn build(self) -> Result<TriDbscan> {
        let min_pts = validate_min_pts(self.min_pts)?;
        let pruner = GraphPruner::new(self.local_std)?;
        let min_sample = NonZeroUsize::new(self.min_sample).ok_or(
            TriDbscanError::InvalidMinSample {
                got: self.min_sample,
            },
        )?;

        Ok(TriDbscan::new(
            min_pts,
            pruner,
            min_sample,
            self.mode,
            self.rng_seed,
            self.execution_strategy,
            self.density,
        ))
    }
}
