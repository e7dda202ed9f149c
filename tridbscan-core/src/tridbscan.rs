//! Core clustering orchestration for the TriDBSCAN library.
//!
//! Provides the [`TriDbscan`] runtime entry point, scheduler selection for
//! density-guided partitions and the reconciliation of per-partition labels.

use std::{fmt, num::NonZeroUsize, sync::Arc};

use rand::{Rng, SeedableRng, rngs::SmallRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{Span, field, info, instrument, warn};

use crate::{
    Result,
    builder::{ClusteringMode, ExecutionStrategy},
    density::{DensityCache, DensityEstimator, attach_densities},
    engine::ConnectivityEngine,
    error::{MIN_TRIANGULATION_POINTS, TriDbscanError},
    partition::{LabelReconciler, SeedPathPartitioner, mix_partition_seed},
    pipeline::label_partition,
    point::PointSet,
    prune::GraphPruner,
    result::{Assignment, ClusterLabel, ClusteringResult},
};

/// How independent partitions are scheduled once the strategy is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scheduler {
    Sequential,
    #[cfg(feature = "parallel")]
    Parallel,
}

/// Where density-guided runs get densities for points that carry none.
#[derive(Clone)]
pub(crate) struct DensitySource {
    pub(crate) estimator: Arc<dyn DensityEstimator + Send + Sync>,
    pub(crate) cache: Arc<dyn DensityCache + Send + Sync>,
    /// Cache key; the point set name when unset.
    pub(crate) key: Option<Arc<str>>,
}

/// Entry point for running the clustering pipeline.
///
/// # Examples
/// ```
/// use tridbscan_core::{PointSet, TriDbscanBuilder};
///
/// let coords: Vec<(f64, f64)> = (0..25)
///     .map(|i| (f64::from(i % 5), f64::from(i / 5) + 0.01 * f64::from(i % 5)))
///     .collect();
/// let set = PointSet::from_coordinates("grid", &coords)?;
/// let tridbscan = TriDbscanBuilder::new().with_min_pts(4).build()?;
/// let result = tridbscan.run(&set)?;
/// assert_eq!(result.rows().len(), 25);
/// assert_eq!(result.cluster_count(), 1);
/// # Ok::<(), tridbscan_core::TriDbscanError>(())
/// ```
#[derive(Clone)]
pub struct TriDbscan {
    min_pts: NonZeroUsize,
    pruner: GraphPruner,
    min_sample: NonZeroUsize,
    mode: ClusteringMode,
    rng_seed: u64,
    execution_strategy: ExecutionStrategy,
    density: DensitySource,
}

impl fmt::Debug for TriDbscan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriDbscan")
            .field("min_pts", &self.min_pts)
            .field("pruner", &self.pruner)
            .field("min_sample", &self.min_sample)
            .field("mode", &self.mode)
            .field("rng_seed", &self.rng_seed)
            .field("execution_strategy", &self.execution_strategy)
            .field("density_cache_key", &self.density.key)
            .finish_non_exhaustive()
    }
}

impl TriDbscan {
    pub(crate) fn new(
        min_pts: NonZeroUsize,
        pruner: GraphPruner,
        min_sample: NonZeroUsize,
        mode: ClusteringMode,
        rng_seed: u64,
        execution_strategy: ExecutionStrategy,
        density: DensitySource,
    ) -> Self {
        Self {
            min_pts,
            pruner,
            min_sample,
            mode,
            rng_seed,
            execution_strategy,
            density,
        }
    }

    /// Returns the core-point threshold configured for this instance.
    #[must_use]
    pub fn min_pts(&self) -> NonZeroUsize {
        self.min_pts
    }

    /// Returns the local pruning multiplier.
    #[must_use]
    pub fn local_std(&self) -> f64 {
        self.pruner.local_std()
    }

    /// Returns the number of unconditional seed-path extensions.
    #[must_use]
    pub fn min_sample(&self) -> NonZeroUsize {
        self.min_sample
    }

    /// Returns the clustering mode.
    #[must_use]
    pub fn mode(&self) -> ClusteringMode {
        self.mode
    }

    /// Returns the seed used by [`Self::run`].
    #[must_use]
    pub fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Returns the execution strategy that will be used when running.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Clusters `points` with a random source seeded from
    /// [`Self::rng_seed`].
    ///
    /// # Errors
    /// See [`Self::run_with_rng`].
    pub fn run(&self, points: &PointSet) -> Result<ClusteringResult> {
        let mut rng = SmallRng::seed_from_u64(self.rng_seed);
        self.run_with_rng(points, &mut rng)
    }

    /// Clusters `points`, drawing start points from `rng`.
    ///
    /// In direct mode labels are factorised to `1..=k` in order of first
    /// appearance. In density-guided mode a single base seed is drawn from
    /// `rng` and each partition derives its own seed from it, so results do
    /// not depend on the scheduler. Points without densities get them from
    /// the configured cache, falling back to the configured estimator.
    ///
    /// # Errors
    /// Returns [`TriDbscanError::EmptySource`] for an empty set,
    /// [`TriDbscanError::InsufficientPoints`] when a direct run has fewer
    /// than three points, [`TriDbscanError::BackendUnavailable`] when the
    /// requested scheduler is not compiled in and
    /// [`TriDbscanError::Density`] when densities cannot be estimated.
    #[instrument(
        name = "core.run",
        err,
        skip(self, points, rng),
        fields(
            data_source = %points.name(),
            points = points.len(),
            min_pts = %self.min_pts,
            mode = ?self.mode,
            strategy = ?self.execution_strategy,
        ),
    )]
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        points: &PointSet,
        rng: &mut R,
    ) -> Result<ClusteringResult> {
        if points.is_empty() {
            warn!(data_source = points.name(), "point set is empty, returning error");
            return Err(TriDbscanError::EmptySource {
                data_source: points.shared_name(),
            });
        }
        let scheduler = self.resolve_scheduler()?;

        let result = match self.mode {
            ClusteringMode::Direct => self.run_direct(points, rng)?,
            ClusteringMode::DensityGuided => {
                let base_seed: u64 = rng.r#gen();
                let key = self.density.key.as_deref().unwrap_or(points.name());
                let prepared = attach_densities(
                    points.clone(),
                    self.density.estimator.as_ref(),
                    self.density.cache.as_ref(),
                    key,
                )?;
                self.run_partitioned(&prepared, base_seed, scheduler)?
            }
        };

        info!(
            clusters = result.cluster_count(),
            noise = result.noise_count(),
            dropped = result.dropped().len(),
            partitions = result.partitions(),
            "clustering completed"
        );
        Ok(result)
    }

    fn resolve_scheduler(&self) -> Result<Scheduler> {
        match self.execution_strategy {
            ExecutionStrategy::Sequential => Ok(Scheduler::Sequential),
            #[cfg(feature = "parallel")]
            ExecutionStrategy::Auto | ExecutionStrategy::Parallel => Ok(Scheduler::Parallel),
            #[cfg(not(feature = "parallel"))]
            ExecutionStrategy::Auto => Ok(Scheduler::Sequential),
            #[cfg(not(feature = "parallel"))]
            ExecutionStrategy::Parallel => Err(TriDbscanError::BackendUnavailable {
                requested: ExecutionStrategy::Parallel,
            }),
        }
    }

    fn engine(&self) -> ConnectivityEngine {
        ConnectivityEngine::new(self.min_pts)
    }

    #[instrument(name = "core.direct", err, skip(self, points, rng), fields(points = points.len()))]
    fn run_direct<R: Rng + ?Sized>(
        &self,
        points: &PointSet,
        rng: &mut R,
    ) -> Result<ClusteringResult> {
        if points.len() < MIN_TRIANGULATION_POINTS {
            return Err(TriDbscanError::InsufficientPoints {
                data_source: points.shared_name(),
                points: points.len(),
            });
        }
        let labels = label_partition(points, &self.pruner, &self.engine(), rng)?;
        let rows = assignments(points, labels);
        Ok(ClusteringResult::new(rows, Vec::new(), 1).factorized())
    }

    #[instrument(
        name = "core.partitioned",
        err,
        skip(self, points, scheduler),
        fields(
            points = points.len(),
            min_sample = self.min_sample.get(),
            partitions = field::Empty,
            dropped = field::Empty,
        ),
    )]
    fn run_partitioned(
        &self,
        points: &PointSet,
        base_seed: u64,
        scheduler: Scheduler,
    ) -> Result<ClusteringResult> {
        let plan = SeedPathPartitioner::new(self.min_sample).partition(points)?;
        let positions = points.positions_by_index();
        let partitions: Vec<PointSet> = plan
            .paths()
            .iter()
            .map(|path| {
                let members: Vec<usize> = path
                    .indices()
                    .iter()
                    .filter_map(|index| positions.get(index).copied())
                    .collect();
                points.subset(&members)
            })
            .collect();

        let span = Span::current();
        span.record("partitions", partitions.len());
        span.record("dropped", plan.dropped().len());

        let labelled: Vec<Vec<ClusterLabel>> = match scheduler {
            Scheduler::Sequential => partitions
                .iter()
                .enumerate()
                .map(|(ordinal, partition)| self.label_path(ordinal, partition, base_seed))
                .collect::<Result<_>>()?,
            #[cfg(feature = "parallel")]
            Scheduler::Parallel => partitions
                .par_iter()
                .enumerate()
                .map(|(ordinal, partition)| self.label_path(ordinal, partition, base_seed))
                .collect::<Result<_>>()?,
        };

        let mut reconciler = LabelReconciler::new();
        let mut rows = Vec::with_capacity(points.len());
        for (partition, mut labels) in partitions.iter().zip(labelled) {
            reconciler.reconcile(&mut labels);
            rows.extend(assignments(partition, labels));
        }
        Ok(ClusteringResult::new(
            rows,
            plan.dropped().to_vec(),
            partitions.len(),
        ))
    }

    fn label_path(
        &self,
        ordinal: usize,
        partition: &PointSet,
        base_seed: u64,
    ) -> Result<Vec<ClusterLabel>> {
        if partition.len() < MIN_TRIANGULATION_POINTS {
            warn!(
                ordinal,
                points = partition.len(),
                "partition too small to triangulate, labelling it noise"
            );
            return Ok(vec![ClusterLabel::NOISE; partition.len()]);
        }
        let mut rng = SmallRng::seed_from_u64(mix_partition_seed(base_seed, ordinal));
        label_partition(partition, &self.pruner, &self.engine(), &mut rng)
    }
}

fn assignments(points: &PointSet, labels: Vec<ClusterLabel>) -> Vec<Assignment> {
    points
        .points()
        .iter()
        .zip(labels)
        .map(|(point, label)| Assignment {
            x: point.x(),
            y: point.y(),
            index: point.index(),
            label,
        })
        .collect()
}
