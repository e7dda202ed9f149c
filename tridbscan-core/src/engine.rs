//! Connectivity clustering over a pruned triangle set.
//!
//! Flood fill from randomly chosen start points: a point with at least
//! `min_pts` neighbours joins the current cluster and pushes its unvisited
//! neighbours, any other point becomes noise. Border points are therefore
//! labelled noise here and handed to the 1-NN reassignment later.

use std::num::NonZeroUsize;

use rand::Rng;

use crate::{graph::Adjacency, result::ClusterLabel, triangulation::Triangle};

/// Labels points by flood-filling the triangle adjacency.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
///
/// use rand::{SeedableRng, rngs::SmallRng};
/// use tridbscan_core::{ConnectivityEngine, Triangle};
///
/// let engine = ConnectivityEngine::new(NonZeroUsize::new(2).expect("non-zero"));
/// let triangles = [Triangle::new(0, 1, 2)];
/// let mut rng = SmallRng::seed_from_u64(7);
/// let labels = engine.cluster(4, &triangles, &mut rng);
/// assert!(labels[..3].iter().all(|label| *label == labels[0] && !label.is_noise()));
/// assert!(labels[3].is_noise());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectivityEngine {
    min_pts: NonZeroUsize,
}

impl ConnectivityEngine {
    /// Creates an engine with the given core-point threshold.
    #[must_use]
    pub const fn new(min_pts: NonZeroUsize) -> Self {
        Self { min_pts }
    }

    /// Neighbour count a point needs to be a core point.
    #[rustfmt::skip]
    #[must_use]
    pub const fn min_pts(&self) -> NonZeroUsize { self.min_pts }

    /// Assigns a label to each of `point_count` positions.
    ///
    /// Cluster ids start at 1 and advance after every drained expansion, so
    /// a start point that turns out to be noise consumes an id and gaps are
    /// possible. Every position is visited exactly once.
    ///
    /// # Panics
    /// Panics when a triangle references a position at or beyond
    /// `point_count`.
    pub fn cluster<R: Rng + ?Sized>(
        &self,
        point_count: usize,
        triangles: &[Triangle],
        rng: &mut R,
    ) -> Vec<ClusterLabel> {
        let adjacency = Adjacency::from_triangles(point_count, triangles);
        let mut labels = vec![ClusterLabel::NOISE; point_count];
        let mut unvisited = UnvisitedSet::full(point_count);
        let mut stack = Vec::new();
        let mut current = 1_u64;

        while let Some(start) = unvisited.pick_random(rng) {
            stack.push(start);
            while let Some(position) = stack.pop() {
                if !unvisited.remove(position) {
                    continue;
                }
                if adjacency.degree(position) < self.min_pts.get() {
                    continue;
                }
                labels[position] = ClusterLabel::new(current);
                stack.extend(
                    adjacency
                        .neighbours(position)
                        .iter()
                        .copied()
                        .filter(|&neighbour| unvisited.contains(neighbour)),
                );
            }
            current += 1;
        }
        labels
    }
}

/// Unvisited positions supporting O(1) removal and uniform random choice.
struct UnvisitedSet {
    members: Vec<usize>,
    slots: Vec<Option<usize>>,
}

impl UnvisitedSet {
    fn full(count: usize) -> Self {
        Self {
            members: (0..count).collect(),
            slots: (0..count).map(Some).collect(),
        }
    }

    fn contains(&self, position: usize) -> bool {
        self.slots.get(position).is_some_and(Option::is_some)
    }

    /// Removes `position`, returning whether it was still unvisited.
    fn remove(&mut self, position: usize) -> bool {
        let Some(slot) = self.slots.get_mut(position).and_then(Option::take) else {
            return false;
        };
        self.members.swap_remove(slot);
        if let Some(&moved) = self.members.get(slot) {
            self.slots[moved] = Some(slot);
        }
        true
    }

    fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.members.is_empty() {
            return None;
        }
        self.members.get(rng.gen_range(0..self.members.len())).copied()
    }
}
