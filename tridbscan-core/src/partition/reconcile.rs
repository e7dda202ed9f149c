//! Cross-partition label reconciliation.

use std::collections::{HashMap, HashSet};

use crate::result::ClusterLabel;

/// Keeps labels from independently clustered partitions globally unique.
///
/// Partitions are folded in order. A label already used by an earlier
/// partition is remapped to a fresh value above every label seen so far,
/// including the partition's own kept labels; noise is never remapped.
///
/// # Examples
/// ```
/// use tridbscan_core::{ClusterLabel, LabelReconciler};
///
/// let mut reconciler = LabelReconciler::new();
/// let mut first = vec![ClusterLabel::new(1), ClusterLabel::NOISE];
/// let mut second = vec![ClusterLabel::new(1), ClusterLabel::new(2)];
/// reconciler.reconcile(&mut first);
/// reconciler.reconcile(&mut second);
/// assert_eq!(first, vec![ClusterLabel::new(1), ClusterLabel::NOISE]);
/// assert_eq!(second, vec![ClusterLabel::new(3), ClusterLabel::new(2)]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LabelReconciler {
    used: HashSet<ClusterLabel>,
    highest: u64,
}

impl LabelReconciler {
    /// Creates a reconciler with no labels in use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrites one partition's labels in place and records them as used.
    pub fn reconcile(&mut self, labels: &mut [ClusterLabel]) {
        let mut distinct = Vec::new();
        let mut seen = HashSet::new();
        for &label in labels.iter().filter(|label| !label.is_noise()) {
            if seen.insert(label) {
                distinct.push(label);
            }
        }

        let local_max = distinct.iter().map(|label| label.get()).max().unwrap_or(0);
        let mut fresh = self.highest.max(local_max) + 1;
        let mapping: HashMap<ClusterLabel, ClusterLabel> = distinct
            .into_iter()
            .map(|label| {
                if self.used.contains(&label) {
                    let renamed = ClusterLabel::new(fresh);
                    fresh += 1;
                    (label, renamed)
                } else {
                    (label, label)
                }
            })
            .collect();

        for label in labels.iter_mut() {
            if let Some(&mapped) = mapping.get(label) {
                *label = mapped;
            }
        }
        for &mapped in mapping.values() {
            self.highest = self.highest.max(mapped.get());
            self.used.insert(mapped);
        }
    }

    /// Number of distinct non-noise labels handed out so far.
    #[must_use]
    pub fn used(&self) -> usize {
        self.used.len()
    }
}
