//! Two-pass statistical pruning of Delaunay triangles.
//!
//! The global pass drops triangles that are unusually large for the whole
//! set. The local pass then drops triangles spanning an edge that is long
//! relative to the neighbourhood of one of its endpoints.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::{
    Result,
    error::TriDbscanError,
    graph::Adjacency,
    point::PointSet,
    stats::{Ddof, Summary},
    telemetry,
    triangulation::{Triangle, delaunay},
};

/// Triangles that survived pruning together with per-pass removal counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PruneOutcome {
    triangles: Vec<Triangle>,
    delaunay: usize,
    global_removed: usize,
    local_removed: usize,
}

impl PruneOutcome {
    /// Surviving triangles.
    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Consumes the outcome, returning the surviving triangles.
    #[must_use]
    pub fn into_triangles(self) -> Vec<Triangle> {
        self.triangles
    }

    /// Number of triangles before pruning.
    #[rustfmt::skip]
    #[must_use]
    pub const fn delaunay(&self) -> usize { self.delaunay }

    /// Triangles removed by the global pass.
    #[rustfmt::skip]
    #[must_use]
    pub const fn global_removed(&self) -> usize { self.global_removed }

    /// Triangles removed by the local pass.
    #[rustfmt::skip]
    #[must_use]
    pub const fn local_removed(&self) -> usize { self.local_removed }
}

/// Removes statistically anomalous triangles from a triangulation.
///
/// # Examples
/// ```
/// use tridbscan_core::{GraphPruner, PointSet};
///
/// let pruner = GraphPruner::new(2.5)?;
/// let set = PointSet::from_coordinates(
///     "demo",
///     &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)],
/// )?;
/// let outcome = pruner.prune(&set)?;
/// assert_eq!(outcome.delaunay(), 2);
/// assert!(outcome.triangles().len() <= 2);
/// # Ok::<(), tridbscan_core::TriDbscanError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GraphPruner {
    local_std: f64,
}

impl GraphPruner {
    /// Multiplier applied by the local pass when none is configured.
    pub const DEFAULT_LOCAL_STD: f64 = 2.5;

    /// Creates a pruner with the given local multiplier.
    ///
    /// # Errors
    /// Returns [`TriDbscanError::InvalidLocalStd`] when `local_std` is
    /// negative or not finite.
    pub fn new(local_std: f64) -> Result<Self> {
        if !local_std.is_finite() || local_std < 0.0 {
            return Err(TriDbscanError::InvalidLocalStd { got: local_std });
        }
        Ok(Self { local_std })
    }

    /// Multiplier used by the local pass.
    #[rustfmt::skip]
    #[must_use]
    pub const fn local_std(&self) -> f64 { self.local_std }

    /// Triangulates `points` and prunes the result.
    ///
    /// # Errors
    /// Returns [`TriDbscanError::InsufficientPoints`] when fewer than three
    /// points are supplied.
    #[instrument(
        name = "core.prune",
        err,
        skip(self, points),
        fields(data_source = %points.name(), points = points.len()),
    )]
    pub fn prune(&self, points: &PointSet) -> Result<PruneOutcome> {
        let triangles = delaunay(points)?;
        Ok(self.prune_triangles(points, triangles))
    }

    /// Runs both passes over an existing triangle set.
    ///
    /// # Panics
    /// Panics when a triangle references a position outside `points`.
    #[must_use]
    pub fn prune_triangles(&self, points: &PointSet, triangles: Vec<Triangle>) -> PruneOutcome {
        let delaunay = triangles.len();
        let after_global = global_pass(points, &triangles);
        let global_removed = delaunay - after_global.len();
        let after_local = local_pass(points, &after_global, self.local_std);
        let local_removed = after_global.len() - after_local.len();

        debug!(
            delaunay,
            global_removed,
            local_removed,
            kept = after_local.len(),
            "pruned triangulation"
        );
        telemetry::record_pruned(global_removed, local_removed);

        PruneOutcome {
            triangles: after_local,
            delaunay,
            global_removed,
            local_removed,
        }
    }
}

impl Default for GraphPruner {
    fn default() -> Self {
        Self {
            local_std: Self::DEFAULT_LOCAL_STD,
        }
    }
}

/// Drops triangles whose area, or any of whose edges, exceeds the set-wide
/// mean by more than one sample standard deviation.
///
/// Fewer than two triangles leave the standard deviation undefined and
/// nothing is removed.
///
/// # Panics
/// Panics when a triangle references a position outside `points`.
#[must_use]
pub fn global_pass(points: &PointSet, triangles: &[Triangle]) -> Vec<Triangle> {
    let sides: Vec<[f64; 3]> = triangles
        .iter()
        .map(|triangle| side_lengths(points, triangle))
        .collect();
    let areas: Vec<f64> = sides.iter().map(heron_area).collect();
    let lengths: Vec<f64> = sides.iter().flatten().copied().collect();

    let area_summary = Summary::of(&areas, Ddof::Sample);
    let edge_summary = Summary::of(&lengths, Ddof::Sample);

    triangles
        .iter()
        .zip(sides.iter().zip(&areas))
        .filter(|(_, (edges, area))| {
            let large = area_summary.is_some_and(|summary| summary.exceeds(**area, 1.0));
            let long = edge_summary
                .is_some_and(|summary| edges.iter().any(|&edge| summary.exceeds(edge, 1.0)));
            !(large || long)
        })
        .map(|(triangle, _)| *triangle)
        .collect()
}

/// Drops every triangle containing an edge that is anomalous for at least
/// one endpoint: longer than that endpoint's mean neighbour distance by more
/// than `local_std` population standard deviations.
///
/// # Panics
/// Panics when a triangle references a position outside `points`.
#[must_use]
pub fn local_pass(points: &PointSet, triangles: &[Triangle], local_std: f64) -> Vec<Triangle> {
    let adjacency = Adjacency::from_triangles(points.len(), triangles);
    let mut anomalous: HashSet<(usize, usize)> = HashSet::new();

    for position in 0..adjacency.len() {
        let around = adjacency.neighbours(position);
        let distances: Vec<f64> = around
            .iter()
            .map(|&other| points.distance(position, other))
            .collect();
        let Some(summary) = Summary::of(&distances, Ddof::Population) else {
            continue;
        };
        for (&other, &distance) in around.iter().zip(&distances) {
            if summary.exceeds(distance, local_std) {
                anomalous.insert((position.min(other), position.max(other)));
            }
        }
    }

    triangles
        .iter()
        .filter(|triangle| !triangle.edges().iter().any(|edge| anomalous.contains(edge)))
        .copied()
        .collect()
}

fn side_lengths(points: &PointSet, triangle: &Triangle) -> [f64; 3] {
    triangle
        .edges()
        .map(|(a, b)| points.distance(a, b))
}

/// Heron's formula with the radicand clamped at zero for degenerate input.
fn heron_area(sides: &[f64; 3]) -> f64 {
    let [a, b, c] = *sides;
    let s = (a + b + c) / 2.0;
    (s * (s - a) * (s - b) * (s - c)).max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    fn point_set(coords: &[(f64, f64)]) -> PointSet {
        PointSet::from_coordinates("prune", coords).expect("finite coordinates")
    }

    /// A 5 x 2 unit grid followed by one distant point at position 10.
    #[fixture]
    fn grid_with_outlier() -> PointSet {
        let mut coords: Vec<(f64, f64)> = (0..2)
            .flat_map(|row| (0..5).map(move |col| (f64::from(col), f64::from(row))))
            .collect();
        coords.push((50.0, 50.0));
        point_set(&coords)
    }

    #[rstest]
    fn global_pass_isolates_distant_point(grid_with_outlier: PointSet) {
        let triangles = delaunay(&grid_with_outlier).expect("triangulates");
        assert!(triangles.iter().any(|triangle| triangle.contains(10)));

        let kept = global_pass(&grid_with_outlier, &triangles);
        assert!(kept.iter().all(|triangle| !triangle.contains(10)));
        assert_eq!(kept.len(), 8);
    }

    #[test]
    fn global_pass_keeps_a_lone_triangle() {
        let set = point_set(&[(0.0, 0.0), (100.0, 0.0), (0.0, 100.0)]);
        let triangles = vec![Triangle::new(0, 1, 2)];
        assert_eq!(global_pass(&set, &triangles), triangles);
    }

    #[test]
    fn heron_area_is_zero_for_degenerate_sides() {
        assert_eq!(heron_area(&[1.0, 2.0, 3.0]), 0.0);
        assert!((heron_area(&[3.0, 4.0, 5.0]) - 6.0).abs() < 1e-12);
    }

    /// A unit hexagon fan around position 0 plus one spike towards a far
    /// point at position 7.
    #[fixture]
    fn fan_with_spike() -> (PointSet, Vec<Triangle>) {
        let mut coords = vec![(0.0, 0.0)];
        for step in 0..6 {
            let angle = f64::from(step) * std::f64::consts::FRAC_PI_3;
            coords.push((angle.cos(), angle.sin()));
        }
        coords.push((10.0, 0.0));
        let mut triangles: Vec<Triangle> = (1..=6)
            .map(|ring| Triangle::new(0, ring, ring % 6 + 1))
            .collect();
        triangles.push(Triangle::new(0, 1, 7));
        (point_set(&coords), triangles)
    }

    #[rstest]
    fn local_pass_removes_triangles_with_anomalous_edges(
        fan_with_spike: (PointSet, Vec<Triangle>),
    ) {
        let (set, triangles) = fan_with_spike;
        let kept = local_pass(&set, &triangles, 2.0);
        assert_eq!(kept.len(), 6);
        assert!(kept.iter().all(|triangle| !triangle.contains(7)));
    }

    #[rstest]
    fn local_pass_respects_the_multiplier(fan_with_spike: (PointSet, Vec<Triangle>)) {
        let (set, triangles) = fan_with_spike;
        assert_eq!(local_pass(&set, &triangles, 2.5), triangles);
    }

    #[rstest]
    fn outcome_counts_each_pass(fan_with_spike: (PointSet, Vec<Triangle>)) {
        let (set, triangles) = fan_with_spike;
        let pruner = GraphPruner::new(2.0).expect("valid multiplier");
        let outcome = pruner.prune_triangles(&set, triangles);
        assert_eq!(outcome.delaunay(), 7);
        assert_eq!(
            outcome.global_removed() + outcome.local_removed(),
            7 - outcome.triangles().len()
        );
        assert!(outcome.triangles().iter().all(|triangle| !triangle.contains(7)));
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn new_rejects_invalid_multiplier(#[case] local_std: f64) {
        assert!(GraphPruner::new(local_std).is_err());
    }

    proptest! {
        #[test]
        fn pruning_never_adds_triangles(
            coords in prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0), 3..60),
            local_std in 0.0f64..4.0,
        ) {
            let set = point_set(&coords);
            let triangles = delaunay(&set).expect("enough points");
            let original: HashSet<Triangle> = triangles.iter().copied().collect();
            let outcome = GraphPruner::new(local_std)
                .expect("valid multiplier")
                .prune_triangles(&set, triangles);
            prop_assert!(outcome.triangles().iter().all(|triangle| original.contains(triangle)));
            prop_assert_eq!(
                outcome.delaunay(),
                outcome.triangles().len() + outcome.global_removed() + outcome.local_removed()
            );
        }
    }
}
