#![allow(dead_code)]

use tridbscan_core::{ClusteringResult, PointSet};
use tridbscan_test_support::fixtures::separated_lattices;

/// Two 6x6 lattices forty units apart.
#[must_use]
pub fn two_blobs() -> PointSet {
    PointSet::from_coordinates("two-blobs", &separated_lattices(2, 6, 40.0))
        .expect("lattice coordinates are finite")
}

/// Every stable index that appears in the rows or the dropped list, sorted.
#[must_use]
pub fn covered_indices(result: &ClusteringResult) -> Vec<usize> {
    let mut seen: Vec<usize> = result.rows().iter().map(|row| row.index).collect();
    seen.extend_from_slice(result.dropped());
    seen.sort_unstable();
    seen
}
