//! Nearest-neighbour reassignment of noise points.

use crate::{point::PointSet, result::ClusterLabel, telemetry};

/// Counts reported by [`reassign_noise`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReassignOutcome {
    /// Noise points that received a cluster label.
    pub reassigned: usize,
    /// Labelled points used as the training set.
    pub training: usize,
}

/// Gives every noise point the label of its nearest labelled point.
///
/// Distances are Euclidean and ties go to the labelled point with the lowest
/// position. When no point is labelled, or none is noise, `labels` is left
/// untouched.
///
/// # Panics
/// Panics when `labels` is shorter than `points`.
///
/// # Examples
/// ```
/// use tridbscan_core::{ClusterLabel, PointSet, reassign_noise};
///
/// let set = PointSet::from_coordinates("demo", &[(0.0, 0.0), (10.0, 0.0), (1.0, 0.0)])?;
/// let mut labels = vec![ClusterLabel::new(1), ClusterLabel::new(2), ClusterLabel::NOISE];
/// let outcome = reassign_noise(&set, &mut labels);
/// assert_eq!(labels[2], ClusterLabel::new(1));
/// assert_eq!(outcome.reassigned, 1);
/// # Ok::<(), tridbscan_core::TriDbscanError>(())
/// ```
pub fn reassign_noise(points: &PointSet, labels: &mut [ClusterLabel]) -> ReassignOutcome {
    let (noise, training): (Vec<usize>, Vec<usize>) =
        (0..points.len()).partition(|&position| labels[position].is_noise());
    if training.is_empty() || noise.is_empty() {
        return ReassignOutcome {
            reassigned: 0,
            training: training.len(),
        };
    }

    let mut reassigned = 0;
    for &position in &noise {
        let nearest = training
            .iter()
            .map(|&candidate| (candidate, points.distance(position, candidate)))
            .reduce(|best, next| if next.1.total_cmp(&best.1).is_lt() { next } else { best });
        if let Some((candidate, _)) = nearest {
            labels[position] = labels[candidate];
            reassigned += 1;
        }
    }

    telemetry::record_noise_reassigned(reassigned);
    ReassignOutcome {
        reassigned,
        training: training.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn point_set(coords: &[(f64, f64)]) -> PointSet {
        PointSet::from_coordinates("reassign", coords).expect("finite coordinates")
    }

    #[test]
    fn ties_go_to_the_first_labelled_point() {
        let set = point_set(&[(-1.0, 0.0), (1.0, 0.0), (0.0, 0.0)]);
        let mut labels = vec![ClusterLabel::new(4), ClusterLabel::new(8), ClusterLabel::NOISE];
        reassign_noise(&set, &mut labels);
        assert_eq!(labels[2], ClusterLabel::new(4));
    }

    #[rstest]
    #[case(vec![ClusterLabel::NOISE; 3])]
    #[case(vec![ClusterLabel::new(1); 3])]
    fn leaves_labels_alone_without_both_kinds(#[case] mut labels: Vec<ClusterLabel>) {
        let set = point_set(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let before = labels.clone();
        let outcome = reassign_noise(&set, &mut labels);
        assert_eq!(labels, before);
        assert_eq!(outcome.reassigned, 0);
    }

    #[test]
    fn reassigned_labels_come_from_training_points_only() {
        let set = point_set(&[(0.0, 0.0), (0.5, 0.0), (5.0, 5.0), (5.5, 5.0), (9.0, 9.0)]);
        let mut labels = vec![
            ClusterLabel::new(1),
            ClusterLabel::NOISE,
            ClusterLabel::new(2),
            ClusterLabel::NOISE,
            ClusterLabel::NOISE,
        ];
        let outcome = reassign_noise(&set, &mut labels);
        assert_eq!(outcome, ReassignOutcome { reassigned: 3, training: 2 });
        assert_eq!(labels[1], ClusterLabel::new(1));
        assert_eq!(labels[3], ClusterLabel::new(2));
        assert_eq!(labels[4], ClusterLabel::new(2));
    }
}
