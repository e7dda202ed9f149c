//! Neighbour queries over a triangle set.
//!
//! The triangle list is the single source of truth for adjacency: two
//! points are neighbours exactly when some surviving triangle contains both.

use std::collections::BTreeSet;

use crate::triangulation::Triangle;

/// Distinct neighbours of one point, in ascending position order.
///
/// # Examples
/// ```
/// use tridbscan_core::{Triangle, neighbours};
///
/// let triangles = [Triangle::new(0, 1, 2), Triangle::new(1, 2, 3)];
/// let around = neighbours(1, &triangles);
/// assert_eq!(around.members(), &[0, 2, 3]);
/// assert_eq!(around.count(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Neighbourhood {
    members: Vec<usize>,
}

impl Neighbourhood {
    /// Neighbour positions, ascending and without duplicates.
    #[must_use]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Number of distinct neighbours.
    #[must_use]
    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// Returns whether `position` is a neighbour.
    #[must_use]
    pub fn contains(&self, position: usize) -> bool {
        self.members.binary_search(&position).is_ok()
    }
}

/// Returns the points sharing at least one triangle with `point`.
///
/// A point never appears in its own neighbourhood and a point absent from
/// every triangle has an empty neighbourhood.
#[must_use]
pub fn neighbours(point: usize, triangles: &[Triangle]) -> Neighbourhood {
    let members: BTreeSet<usize> = triangles
        .iter()
        .filter(|triangle| triangle.contains(point))
        .flat_map(Triangle::vertices)
        .filter(|&vertex| vertex != point)
        .collect();
    Neighbourhood {
        members: members.into_iter().collect(),
    }
}

/// Neighbour lists for every point, derived from a triangle set in one pass.
///
/// Equivalent to calling [`neighbours`] for each position but linear in the
/// number of triangles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Adjacency {
    lists: Vec<Vec<usize>>,
}

impl Adjacency {
    /// Builds adjacency for `point_count` positions.
    ///
    /// # Panics
    /// Panics when a triangle references a position at or beyond
    /// `point_count`.
    #[must_use]
    pub fn from_triangles(point_count: usize, triangles: &[Triangle]) -> Self {
        let mut lists = vec![Vec::new(); point_count];
        for triangle in triangles {
            for (a, b) in triangle.edges() {
                lists[a].push(b);
                lists[b].push(a);
            }
        }
        for list in &mut lists {
            list.sort_unstable();
            list.dedup();
        }
        Self { lists }
    }

    /// Neighbours of `position` in ascending order.
    ///
    /// # Panics
    /// Panics when `position` is out of bounds.
    #[must_use]
    pub fn neighbours(&self, position: usize) -> &[usize] {
        &self.lists[position]
    }

    /// Number of neighbours of `position`.
    ///
    /// # Panics
    /// Panics when `position` is out of bounds.
    #[must_use]
    pub fn degree(&self, position: usize) -> usize {
        self.lists[position].len()
    }

    /// Number of positions covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// Returns whether no positions are covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}
