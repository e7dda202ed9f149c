//! Delaunay triangulation of a [`PointSet`].
//!
//! Wraps [`spade`]'s incremental Delaunay triangulation, whose orientation
//! and in-circle tests are exact, and maps its faces back to point
//! positions.

use spade::{DelaunayTriangulation, InsertionError, Point2, Triangulation};

use crate::{
    Result,
    error::{MIN_TRIANGULATION_POINTS, TriDbscanError},
    point::PointSet,
};

/// An unordered triple of point positions forming a Delaunay triangle.
///
/// Vertices are stored in ascending order so equal triangles compare equal
/// regardless of the winding they were discovered with.
///
/// # Examples
/// ```
/// use tridbscan_core::Triangle;
///
/// let triangle = Triangle::new(4, 1, 2);
/// assert_eq!(triangle.vertices(), [1, 2, 4]);
/// assert!(triangle.contains(4));
/// assert!(triangle.has_edge(4, 1));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triangle([usize; 3]);

impl Triangle {
    /// Creates a triangle from three point positions.
    #[must_use]
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        let mut vertices = [a, b, c];
        vertices.sort_unstable();
        Self(vertices)
    }

    /// Vertex positions in ascending order.
    #[rustfmt::skip]
    #[must_use]
    pub const fn vertices(&self) -> [usize; 3] { self.0 }

    /// Returns whether `vertex` is one of the corners.
    #[must_use]
    pub fn contains(&self, vertex: usize) -> bool {
        self.0.contains(&vertex)
    }

    /// Returns whether both endpoints of an edge are corners.
    #[must_use]
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        a != b && self.contains(a) && self.contains(b)
    }

    /// The three edges as `(lower, higher)` position pairs.
    #[must_use]
    pub const fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.0;
        [(a, b), (a, c), (b, c)]
    }
}

/// Computes the Delaunay triangulation of `points`.
///
/// Returned triangles reference positions within `points`. Of several
/// points sharing exact coordinates only the first is triangulated, and an
/// input whose points are all collinear yields no triangles; such points
/// surface later as isolated vertices. Cocircular points get one valid
/// triangulation of their hull.
///
/// # Errors
/// Returns [`TriDbscanError::InsufficientPoints`] when fewer than three
/// points are supplied and [`TriDbscanError::UntriangulableCoordinate`]
/// when a coordinate lies outside the range the exact predicates accept.
///
/// # Examples
/// ```
/// use tridbscan_core::{PointSet, delaunay};
///
/// let square = PointSet::from_coordinates(
///     "square",
///     &[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (1.0, 1.0)],
/// )?;
/// let triangles = delaunay(&square)?;
/// assert_eq!(triangles.len(), 4);
/// assert!(triangles.iter().all(|triangle| triangle.contains(4)));
/// # Ok::<(), tridbscan_core::TriDbscanError>(())
/// ```
pub fn delaunay(points: &PointSet) -> Result<Vec<Triangle>> {
    if points.len() < MIN_TRIANGULATION_POINTS {
        return Err(TriDbscanError::InsufficientPoints {
            data_source: points.shared_name(),
            points: points.len(),
        });
    }

    let mut mesh: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();
    // Vertex handle index -> position of the first point inserted there.
    let mut owners: Vec<usize> = Vec::with_capacity(points.len());
    for (position, point) in points.points().iter().enumerate() {
        let handle = mesh
            .insert(Point2::new(point.x(), point.y()))
            .map_err(|error| untriangulable(point.index(), error))?;
        if handle.index() == owners.len() {
            owners.push(position);
        }
    }

    Ok(mesh
        .inner_faces()
        .map(|face| {
            let [a, b, c] = face.vertices().map(|vertex| owners[vertex.fix().index()]);
            Triangle::new(a, b, c)
        })
        .collect())
}

fn untriangulable(index: usize, error: InsertionError) -> TriDbscanError {
    TriDbscanError::UntriangulableCoordinate {
        index,
        reason: format!("{error:?}").into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{collections::HashMap, f64::consts::TAU};

    use proptest::prelude::*;
    use rstest::rstest;

    fn point_set(coords: &[(f64, f64)]) -> PointSet {
        PointSet::from_coordinates("triangulation", coords).expect("finite coordinates")
    }

    fn sorted(mut triangles: Vec<Triangle>) -> Vec<Triangle> {
        triangles.sort_unstable();
        triangles
    }

    fn cross(o: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
        (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
    }

    fn triangle_area(coords: &[(f64, f64)], triangle: Triangle) -> f64 {
        let [a, b, c] = triangle.vertices();
        0.5 * cross(coords[a], coords[b], coords[c]).abs()
    }

    /// Area of the convex hull by Andrew's monotone chain.
    fn hull_area(coords: &[(f64, f64)]) -> f64 {
        let mut sorted_coords = coords.to_vec();
        sorted_coords.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        sorted_coords.dedup();
        if sorted_coords.len() < 3 {
            return 0.0;
        }
        let mut hull: Vec<(f64, f64)> = Vec::new();
        for pass in [sorted_coords.clone(), sorted_coords.iter().rev().copied().collect()] {
            let start = hull.len();
            for p in pass {
                while hull.len() >= start + 2
                    && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
                {
                    hull.pop();
                }
                hull.push(p);
            }
            hull.pop();
        }
        let shoelace: f64 = (0..hull.len())
            .map(|i| {
                let (p, q) = (hull[i], hull[(i + 1) % hull.len()]);
                p.0 * q.1 - q.0 * p.1
            })
            .sum();
        0.5 * shoelace.abs()
    }

    /// Checks that the triangles tile the convex hull without overlap.
    fn assert_tiles_hull(coords: &[(f64, f64)], triangles: &[Triangle]) {
        let summed: f64 = triangles
            .iter()
            .map(|&triangle| triangle_area(coords, triangle))
            .sum();
        let hull = hull_area(coords);
        assert!(
            (summed - hull).abs() <= 1e-9 * hull.max(1.0),
            "triangles cover {summed} but the hull is {hull}"
        );

        let mut uses: HashMap<(usize, usize), usize> = HashMap::new();
        for triangle in triangles {
            for edge in triangle.edges() {
                *uses.entry(edge).or_default() += 1;
            }
        }
        assert!(
            uses.values().all(|&count| count <= 2),
            "an edge is shared by more than two triangles"
        );
    }

    fn ring(count: u32, radius: f64) -> Vec<(f64, f64)> {
        (0..count)
            .map(|i| {
                let angle = TAU * f64::from(i) / f64::from(count);
                (radius * angle.cos(), radius * angle.sin())
            })
            .collect()
    }

    fn rotated_lattice(side: u32, angle: f64) -> Vec<(f64, f64)> {
        let (sin, cos) = angle.sin_cos();
        (0..side * side)
            .map(|i| {
                let (x, y) = (f64::from(i % side), f64::from(i / side));
                (x * cos - y * sin, x * sin + y * cos)
            })
            .collect()
    }

    #[rstest]
    #[case(&[])]
    #[case(&[(0.0, 0.0)])]
    #[case(&[(0.0, 0.0), (1.0, 1.0)])]
    fn rejects_fewer_than_three_points(#[case] coords: &[(f64, f64)]) {
        let err = delaunay(&point_set(coords)).expect_err("too few points must fail");
        assert_eq!(err.code().as_str(), "TRIDBSCAN_INSUFFICIENT_POINTS");
    }

    #[test]
    fn rejects_coordinates_beyond_the_predicate_range() {
        let err = delaunay(&point_set(&[(0.0, 0.0), (1.0, 0.0), (1e300, 1.0)]))
            .expect_err("huge coordinates must fail");
        assert!(matches!(
            err,
            TriDbscanError::UntriangulableCoordinate { index: 2, .. }
        ));
    }

    #[test]
    fn single_triangle() {
        let triangles = delaunay(&point_set(&[(0.0, 0.0), (0.0, 1.0), (1.0, 0.0)]))
            .expect("three points triangulate");
        assert_eq!(triangles, vec![Triangle::new(0, 1, 2)]);
    }

    #[test]
    fn collinear_points_yield_no_triangles() {
        let coords: Vec<(f64, f64)> = (0..6).map(|i| (f64::from(i), 2.0 * f64::from(i))).collect();
        let triangles = delaunay(&point_set(&coords)).expect("collinear input is accepted");
        assert!(triangles.is_empty());
    }

    #[test]
    fn duplicates_are_left_isolated() {
        let coords = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];
        let triangles = delaunay(&point_set(&coords)).expect("duplicates are accepted");
        assert_eq!(triangles.len(), 2);
        assert!(triangles.iter().all(|triangle| !triangle.contains(4)));
    }

    #[test]
    fn collinear_hull_rows_are_kept() {
        // 5 x 2 unit grid: both rows lie on the hull.
        let coords: Vec<(f64, f64)> = (0..2)
            .flat_map(|row| (0..5).map(move |col| (f64::from(col), f64::from(row))))
            .collect();
        let triangles = delaunay(&point_set(&coords)).expect("grid triangulates");
        assert_eq!(triangles.len(), 8);
        for vertex in 0..coords.len() {
            assert!(triangles.iter().any(|triangle| triangle.contains(vertex)));
        }
        assert_tiles_hull(&coords, &triangles);
    }

    #[test]
    fn insertion_order_does_not_change_a_unique_triangulation() {
        let coords = [(0.0, 0.0), (4.0, 0.3), (2.0, 3.1), (1.1, 1.0), (3.2, 1.4), (5.0, 2.2)];
        let forward = sorted(delaunay(&point_set(&coords)).expect("triangulates"));
        let reversed_coords: Vec<(f64, f64)> = coords.iter().rev().copied().collect();
        let last = coords.len() - 1;
        let reversed = sorted(
            delaunay(&point_set(&reversed_coords))
                .expect("triangulates")
                .into_iter()
                .map(|triangle| {
                    let [a, b, c] = triangle.vertices();
                    Triangle::new(last - a, last - b, last - c)
                })
                .collect(),
        );
        assert_eq!(forward, reversed);
    }

    #[rstest]
    #[case(8)]
    #[case(16)]
    #[case(32)]
    #[case(64)]
    fn cocircular_ring_is_tiled_once(#[case] count: u32) {
        let coords = ring(count, 10.0);
        let triangles = delaunay(&point_set(&coords)).expect("ring triangulates");
        assert_eq!(triangles.len(), count as usize - 2);
        assert_tiles_hull(&coords, &triangles);
    }

    #[rstest]
    #[case(8)]
    #[case(32)]
    fn ring_with_centre_forms_a_fan(#[case] count: u32) {
        let mut coords = ring(count, 10.0);
        coords.push((0.0, 0.0));
        let centre = coords.len() - 1;
        let triangles = delaunay(&point_set(&coords)).expect("ring triangulates");
        assert_eq!(triangles.len(), count as usize);
        assert!(triangles.iter().all(|triangle| triangle.contains(centre)));
        assert_tiles_hull(&coords, &triangles);
    }

    #[rstest]
    #[case(0.0)]
    #[case(0.3)]
    #[case(std::f64::consts::FRAC_PI_4)]
    fn square_lattices_are_tiled_at_any_rotation(#[case] angle: f64) {
        let coords = rotated_lattice(6, angle);
        let triangles = delaunay(&point_set(&coords)).expect("lattice triangulates");
        // Rounding may pull a boundary point inside the hull, adding a sliver.
        assert!(triangles.len() >= 2 * 5 * 5);
        for vertex in 0..coords.len() {
            assert!(triangles.iter().any(|triangle| triangle.contains(vertex)));
        }
        assert_tiles_hull(&coords, &triangles);
    }

    proptest! {
        #[test]
        fn triangulation_is_delaunay(
            coords in prop::collection::vec((0.0f64..100.0, 0.0f64..100.0), 3..40)
        ) {
            let set = point_set(&coords);
            let triangles = delaunay(&set).expect("enough points");
            for triangle in &triangles {
                let [a, b, c] = triangle.vertices();
                let (pa, pb, pc) = if cross(coords[a], coords[b], coords[c]) > 0.0 {
                    (coords[a], coords[b], coords[c])
                } else {
                    (coords[a], coords[c], coords[b])
                };
                for (other, &d) in coords.iter().enumerate() {
                    if triangle.contains(other) {
                        continue;
                    }
                    let rows = [pa, pb, pc].map(|p| {
                        let (dx, dy) = (p.0 - d.0, p.1 - d.1);
                        (dx, dy, dx * dx + dy * dy)
                    });
                    let det = rows[0].0 * (rows[1].1 * rows[2].2 - rows[2].1 * rows[1].2)
                        - rows[0].1 * (rows[1].0 * rows[2].2 - rows[2].0 * rows[1].2)
                        + rows[0].2 * (rows[1].0 * rows[2].1 - rows[2].0 * rows[1].1);
                    prop_assert!(det <= 1e-6, "point {} lies inside {:?}", other, triangle);
                }
            }
            assert_tiles_hull(&coords, &triangles);

            if !triangles.is_empty() {
                let mut distinct = coords.clone();
                distinct.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
                distinct.dedup();
                let mut used = vec![false; coords.len()];
                for triangle in &triangles {
                    for vertex in triangle.vertices() {
                        used[vertex] = true;
                    }
                }
                prop_assert_eq!(used.iter().filter(|&&flag| flag).count(), distinct.len());
            }
        }

        #[test]
        fn perturbed_rings_are_tiled_once(
            count in 4_u32..48,
            radius in 0.5f64..500.0,
            jitter in 0.0f64..1e-12,
        ) {
            let coords: Vec<(f64, f64)> = ring(count, radius)
                .into_iter()
                .enumerate()
                .map(|(i, (x, y))| if i % 2 == 0 { (x + jitter * radius, y) } else { (x, y) })
                .collect();
            let triangles = delaunay(&point_set(&coords)).expect("ring triangulates");
            assert_tiles_hull(&coords, &triangles);
        }
    }
}
