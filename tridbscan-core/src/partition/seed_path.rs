//! Density-guided seed-path partitioning.
//!
//! Repeatedly seeds a path at the densest remaining point and grows it one
//! closest neighbour at a time over the Delaunay graph of the remaining
//! pool. The path stops once a step is much longer than the steps taken so
//! far, and its points leave the pool.

use std::{collections::HashSet, num::NonZeroUsize};

use tracing::{Span, field, instrument, trace, warn};

use crate::{
    Result,
    error::{DensityError, MIN_TRIANGULATION_POINTS, TriDbscanError},
    graph::Adjacency,
    point::{Point, PointSet},
    stats::{Ddof, Summary},
    telemetry,
    triangulation::delaunay,
};

/// Pool size subtracted from the number of conditional extensions.
const EXTENSION_HEADROOM: usize = 10;

/// Standard deviations above the mean step length that end a path.
const STOP_STD_MULTIPLIER: f64 = 4.0;

/// An ordered run of stable point indices grown from one density seed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedPath {
    indices: Vec<usize>,
}

impl SeedPath {
    /// Stable indices in the order they joined the path; the seed is first.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of points on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns whether the path is empty. Paths produced by
    /// [`SeedPathPartitioner::partition`] never are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Seed paths in discovery order plus the points no path claimed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartitionPlan {
    paths: Vec<SeedPath>,
    dropped: Vec<usize>,
}

impl PartitionPlan {
    /// Paths in the order they were grown.
    #[must_use]
    pub fn paths(&self) -> &[SeedPath] {
        &self.paths
    }

    /// Stable indices left over once fewer than three points remained.
    #[must_use]
    pub fn dropped(&self) -> &[usize] {
        &self.dropped
    }
}

/// One accepted path extension between pool positions.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Step {
    from: usize,
    to: usize,
    distance: f64,
}

/// Splits a point set into density-guided seed paths.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
///
/// use tridbscan_core::{PointSet, SeedPathPartitioner};
///
/// let coords: Vec<(f64, f64)> = (0..12)
///     .map(|i| (f64::from(i % 4), f64::from(i / 4) + 0.1 * f64::from(i % 4)))
///     .collect();
/// let densities: Vec<f64> = (0..12).map(f64::from).collect();
/// let set = PointSet::from_coordinates("grid", &coords)?.with_densities(&densities)?;
///
/// let plan = SeedPathPartitioner::new(NonZeroUsize::new(3).expect("non-zero")).partition(&set)?;
/// assert_eq!(plan.paths()[0].indices()[0], 11);
/// let covered: usize = plan.paths().iter().map(|path| path.len()).sum::<usize>() + plan.dropped().len();
/// assert_eq!(covered, 12);
/// # Ok::<(), tridbscan_core::TriDbscanError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedPathPartitioner {
    min_sample: NonZeroUsize,
}

impl SeedPathPartitioner {
    /// Creates a partitioner that extends every path at least `min_sample`
    /// times when candidates exist.
    #[must_use]
    pub const fn new(min_sample: NonZeroUsize) -> Self {
        Self { min_sample }
    }

    /// Number of unconditional extensions per path.
    #[rustfmt::skip]
    #[must_use]
    pub const fn min_sample(&self) -> NonZeroUsize { self.min_sample }

    /// Partitions `points`, which must all carry a density.
    ///
    /// Every stable index ends up in exactly one path or in the dropped set.
    ///
    /// # Errors
    /// Returns [`TriDbscanError::Density`] with
    /// [`DensityError::LengthMismatch`] when some point lacks a density.
    #[instrument(
        name = "core.partition_seed_paths",
        err,
        skip(self, points),
        fields(
            data_source = %points.name(),
            points = points.len(),
            min_sample = self.min_sample.get(),
            paths = field::Empty,
            dropped = field::Empty,
        ),
    )]
    pub fn partition(&self, points: &PointSet) -> Result<PartitionPlan> {
        let densities = points.densities().ok_or_else(|| TriDbscanError::Density {
            data_source: points.shared_name(),
            error: DensityError::LengthMismatch {
                expected: points.len(),
                actual: points.points().iter().filter_map(Point::density).count(),
            },
        })?;

        let mut pool: Vec<usize> = (0..points.len()).collect();
        let mut plan = PartitionPlan::default();
        while !pool.is_empty() {
            if pool.len() < MIN_TRIANGULATION_POINTS {
                plan.dropped = pool.iter().map(|&position| points.points()[position].index()).collect();
                warn!(
                    dropped = plan.dropped.len(),
                    "too few points remain to triangulate, dropping them"
                );
                telemetry::record_points_dropped(plan.dropped.len());
                break;
            }

            let remaining = points.subset(&pool);
            let triangles = delaunay(&remaining)?;
            let adjacency = Adjacency::from_triangles(remaining.len(), &triangles);
            let seed = densest(pool.iter().map(|&position| densities[position]));
            let local_path = self.grow(&remaining, &adjacency, seed);

            let taken: HashSet<usize> = local_path.iter().map(|&local| pool[local]).collect();
            plan.paths.push(SeedPath {
                indices: local_path
                    .iter()
                    .map(|&local| remaining.points()[local].index())
                    .collect(),
            });
            pool.retain(|position| !taken.contains(position));
        }

        let span = Span::current();
        span.record("paths", plan.paths.len());
        span.record("dropped", plan.dropped.len());
        Ok(plan)
    }

    /// Grows one path from `seed`, returning pool-local positions.
    fn grow(&self, pool: &PointSet, adjacency: &Adjacency, seed: usize) -> Vec<usize> {
        let mut included = vec![false; pool.len()];
        included[seed] = true;
        let mut path = vec![seed];
        let mut lengths: Vec<f64> = Vec::new();

        for _ in 0..self.min_sample.get() {
            let Some(step) = next_step(pool, adjacency, &path, &included) else {
                return path;
            };
            accept(step, &mut path, &mut included, &mut lengths);
        }

        for _ in 0..pool.len().saturating_sub(EXTENSION_HEADROOM) {
            let Some(step) = next_step(pool, adjacency, &path, &included) else {
                break;
            };
            let limit = Summary::of(&lengths, Ddof::Population)
                .map(|summary| summary.threshold(STOP_STD_MULTIPLIER));
            if limit.is_some_and(|cutoff| step.distance > cutoff) {
                trace!(distance = step.distance, ?limit, "seed path stopped at a long step");
                break;
            }
            accept(step, &mut path, &mut included, &mut lengths);
        }
        path
    }
}

fn accept(step: Step, path: &mut Vec<usize>, included: &mut [bool], lengths: &mut Vec<f64>) {
    trace!(from = step.from, to = step.to, distance = step.distance, "extended seed path");
    included[step.to] = true;
    path.push(step.to);
    lengths.push(step.distance);
}

/// The shortest edge from any path member to a point not yet on the path.
///
/// Ties go to the earliest member, then to the lowest neighbour position.
fn next_step(pool: &PointSet, adjacency: &Adjacency, path: &[usize], included: &[bool]) -> Option<Step> {
    let mut best: Option<Step> = None;
    for &member in path {
        let closest = adjacency
            .neighbours(member)
            .iter()
            .filter(|&&neighbour| !included[neighbour])
            .map(|&neighbour| (neighbour, pool.distance(member, neighbour)))
            .reduce(|best_so_far, next| if next.1 < best_so_far.1 { next } else { best_so_far });
        if let Some((to, distance)) = closest {
            if best.is_none_or(|step| distance < step.distance) {
                best = Some(Step {
                    from: member,
                    to,
                    distance,
                });
            }
        }
    }
    best
}

/// Position of the first maximum.
fn densest(values: impl Iterator<Item = f64>) -> usize {
    let mut best = (0, f64::NEG_INFINITY);
    for (position, value) in values.enumerate() {
        if value > best.1 {
            best = (position, value);
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    fn partitioner(min_sample: usize) -> SeedPathPartitioner {
        SeedPathPartitioner::new(NonZeroUsize::new(min_sample).expect("non-zero min_sample"))
    }

    /// Thirteen points zig-zagging along the x axis at unit spacing with
    /// density falling away from the origin, followed by one point far above
    /// the end of the chain.
    #[fixture]
    fn chain_with_outlier() -> PointSet {
        let mut coords: Vec<(f64, f64)> = (0..13)
            .map(|step| (f64::from(step), if step % 2 == 1 { 0.05 } else { 0.0 }))
            .collect();
        coords.push((12.0, 100.0));
        let mut densities: Vec<f64> = (0..13).map(|step| f64::from(13 - step)).collect();
        densities.push(0.5);
        PointSet::from_coordinates("chain", &coords)
            .expect("finite coordinates")
            .with_densities(&densities)
            .expect("one density per point")
    }

    #[rstest]
    fn path_stops_before_a_long_step(chain_with_outlier: PointSet) {
        let plan = partitioner(12)
            .partition(&chain_with_outlier)
            .expect("densities are attached");
        assert_eq!(plan.paths().len(), 1);
        assert_eq!(plan.paths()[0].indices(), (0..13).collect::<Vec<_>>().as_slice());
        assert_eq!(plan.dropped(), &[13]);
    }

    #[rstest]
    fn unconditional_extensions_ignore_step_length(chain_with_outlier: PointSet) {
        let plan = partitioner(13)
            .partition(&chain_with_outlier)
            .expect("densities are attached");
        assert_eq!(plan.paths().len(), 1);
        assert_eq!(plan.paths()[0].len(), 14);
        assert_eq!(plan.paths()[0].indices().last(), Some(&13));
        assert!(plan.dropped().is_empty());
    }

    #[test]
    fn seed_is_the_first_densest_point() {
        assert_eq!(densest([1.0, 3.0, 2.0, 3.0].into_iter()), 1);
        assert_eq!(densest(std::iter::empty()), 0);
    }

    #[test]
    fn missing_densities_are_rejected() {
        let set = PointSet::from_coordinates("bare", &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)])
            .expect("finite coordinates");
        let err = partitioner(2).partition(&set).expect_err("densities are required");
        assert_eq!(
            err,
            TriDbscanError::Density {
                data_source: "bare".into(),
                error: DensityError::LengthMismatch {
                    expected: 3,
                    actual: 0
                },
            }
        );
    }

    #[test]
    fn fewer_than_three_points_are_dropped_outright() {
        let set = PointSet::from_coordinates("pair", &[(0.0, 0.0), (1.0, 0.0)])
            .expect("finite coordinates")
            .with_densities(&[1.0, 2.0])
            .expect("one density per point");
        let plan = partitioner(4).partition(&set).expect("densities are attached");
        assert!(plan.paths().is_empty());
        assert_eq!(plan.dropped(), &[0, 1]);
    }

    proptest! {
        #[test]
        fn every_point_is_claimed_once(
            rows in prop::collection::vec((0.0f64..50.0, 0.0f64..50.0, 0.0f64..1.0), 3..40),
            min_sample in 1usize..8,
        ) {
            let coords: Vec<(f64, f64)> = rows.iter().map(|&(x, y, _)| (x, y)).collect();
            let densities: Vec<f64> = rows.iter().map(|&(_, _, density)| density).collect();
            let set = PointSet::from_coordinates("random", &coords)
                .expect("finite coordinates")
                .with_densities(&densities)
                .expect("one density per point");
            let plan = partitioner(min_sample).partition(&set).expect("densities are attached");

            let mut claimed: Vec<usize> = plan
                .paths()
                .iter()
                .flat_map(|path| path.indices().iter().copied())
                .chain(plan.dropped().iter().copied())
                .collect();
            claimed.sort_unstable();
            prop_assert_eq!(claimed, (0..coords.len()).collect::<Vec<_>>());
            prop_assert!(plan.dropped().len() < MIN_TRIANGULATION_POINTS);
            prop_assert!(plan.paths().iter().all(|path| !path.is_empty()));
        }
    }
}
