//! Result types for clustering runs.
//!
//! Provides the per-point output rows, the cluster label newtype and the
//! summary counts reported by [`crate::TriDbscan::run`].

use std::collections::{HashMap, HashSet};

use thiserror::Error;

/// Cluster label attached to a point; `0` marks noise.
///
/// # Examples
/// ```
/// use tridbscan_core::ClusterLabel;
///
/// let label = ClusterLabel::new(4);
/// assert_eq!(label.get(), 4);
/// assert!(!label.is_noise());
/// assert!(ClusterLabel::NOISE.is_noise());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ClusterLabel(u64);

impl ClusterLabel {
    /// The noise label.
    pub const NOISE: Self = Self(0);

    /// Creates a label from its numeric value.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(label: u64) -> Self { Self(label) }

    /// Returns the underlying numeric label.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }

    /// Returns whether this is the noise label.
    #[rustfmt::skip]
    #[must_use]
    pub const fn is_noise(self) -> bool { self.0 == 0 }
}

/// One output row: a point's coordinates, stable index and cluster label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// Stable index of the point.
    pub index: usize,
    /// Assigned cluster label.
    pub label: ClusterLabel,
}

/// Error returned when output rows do not describe each point at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidAssignments {
    /// Two rows carry the same stable index.
    #[error("point index {index} is assigned more than once")]
    DuplicateIndex {
        /// The repeated index.
        index: usize,
    },
    /// A dropped index also appears among the rows.
    #[error("point index {index} is both assigned and dropped")]
    DroppedAndAssigned {
        /// The conflicting index.
        index: usize,
    },
}

/// Represents the output of a [`crate::TriDbscan::run`] invocation.
///
/// # Examples
/// ```
/// use tridbscan_core::{Assignment, ClusterLabel, ClusteringResult};
///
/// let rows = vec![
///     Assignment { x: 0.0, y: 0.0, index: 0, label: ClusterLabel::new(3) },
///     Assignment { x: 1.0, y: 0.0, index: 1, label: ClusterLabel::new(3) },
///     Assignment { x: 9.0, y: 9.0, index: 2, label: ClusterLabel::new(7) },
/// ];
/// let result = ClusteringResult::try_from_rows(rows, Vec::new(), 1)?;
/// assert_eq!(result.cluster_count(), 2);
/// assert_eq!(result.label_of(2), Some(ClusterLabel::new(7)));
/// # Ok::<(), tridbscan_core::InvalidAssignments>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringResult {
    rows: Vec<Assignment>,
    dropped: Vec<usize>,
    partitions: usize,
    cluster_count: usize,
    noise_count: usize,
}

impl ClusteringResult {
    /// Builds a result from output rows, the indices dropped by the
    /// partitioner and the number of partitions processed.
    ///
    /// # Errors
    /// Returns [`InvalidAssignments::DuplicateIndex`] when two rows share an
    /// index and [`InvalidAssignments::DroppedAndAssigned`] when a dropped
    /// index also has a row.
    pub fn try_from_rows(
        rows: Vec<Assignment>,
        dropped: Vec<usize>,
        partitions: usize,
    ) -> Result<Self, InvalidAssignments> {
        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            if !seen.insert(row.index) {
                return Err(InvalidAssignments::DuplicateIndex { index: row.index });
            }
        }
        if let Some(&index) = dropped.iter().find(|index| seen.contains(index)) {
            return Err(InvalidAssignments::DroppedAndAssigned { index });
        }
        Ok(Self::new(rows, dropped, partitions))
    }

    /// Builds a result from rows already known to be consistent.
    pub(crate) fn new(rows: Vec<Assignment>, dropped: Vec<usize>, partitions: usize) -> Self {
        let clusters: HashSet<ClusterLabel> = rows
            .iter()
            .map(|row| row.label)
            .filter(|label| !label.is_noise())
            .collect();
        let noise_count = rows.iter().filter(|row| row.label.is_noise()).count();
        Self {
            cluster_count: clusters.len(),
            noise_count,
            rows,
            dropped,
            partitions,
        }
    }

    /// Output rows in emission order.
    #[must_use]
    pub fn rows(&self) -> &[Assignment] {
        &self.rows
    }

    /// Stable indices left out of every partition.
    #[must_use]
    pub fn dropped(&self) -> &[usize] {
        &self.dropped
    }

    /// Number of partitions processed; `1` for a direct run.
    #[rustfmt::skip]
    #[must_use]
    pub const fn partitions(&self) -> usize { self.partitions }

    /// Number of distinct non-noise labels.
    #[rustfmt::skip]
    #[must_use]
    pub const fn cluster_count(&self) -> usize { self.cluster_count }

    /// Number of rows still labelled noise.
    #[rustfmt::skip]
    #[must_use]
    pub const fn noise_count(&self) -> usize { self.noise_count }

    /// Label assigned to the point with stable `index`, if it has a row.
    #[must_use]
    pub fn label_of(&self, index: usize) -> Option<ClusterLabel> {
        self.rows
            .iter()
            .find(|row| row.index == index)
            .map(|row| row.label)
    }

    /// Relabels clusters as `1..=k` in order of first appearance, leaving
    /// noise at `0`.
    ///
    /// # Examples
    /// ```
    /// use tridbscan_core::{Assignment, ClusterLabel, ClusteringResult};
    ///
    /// let row = |index, label| Assignment { x: 0.0, y: 0.0, index, label: ClusterLabel::new(label) };
    /// let result = ClusteringResult::try_from_rows(
    ///     vec![row(0, 9), row(1, 0), row(2, 4), row(3, 9)],
    ///     Vec::new(),
    ///     1,
    /// )?
    /// .factorized();
    /// let labels: Vec<u64> = result.rows().iter().map(|row| row.label.get()).collect();
    /// assert_eq!(labels, vec![1, 0, 2, 1]);
    /// # Ok::<(), tridbscan_core::InvalidAssignments>(())
    /// ```
    #[must_use]
    pub fn factorized(mut self) -> Self {
        let mut mapping: HashMap<ClusterLabel, ClusterLabel> = HashMap::new();
        for row in &mut self.rows {
            if row.label.is_noise() {
                continue;
            }
            let next = ClusterLabel::new(mapping.len() as u64 + 1);
            row.label = *mapping.entry(row.label).or_insert(next);
        }
        self
    }
}
