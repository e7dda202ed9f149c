//! Point and point-set types consumed by every pipeline stage.
//!
//! A [`PointSet`] owns its points exclusively. Stages refer to points by
//! *position* (`0..len`) while the stable [`Point::index`] survives
//! partitioning and is what ends up in the output table.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::{
    Result,
    error::{Axis, TriDbscanError},
};

/// An immutable 2D point with a stable index and an optional density.
///
/// # Examples
/// ```
/// use tridbscan_core::Point;
///
/// let point = Point::new(3, 1.0, 2.0).with_density(0.25);
/// assert_eq!(point.index(), 3);
/// assert_eq!(point.density(), Some(0.25));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    index: usize,
    x: f64,
    y: f64,
    density: Option<f64>,
}

impl Point {
    /// Creates a point without a density value.
    #[must_use]
    pub const fn new(index: usize, x: f64, y: f64) -> Self {
        Self {
            index,
            x,
            y,
            density: None,
        }
    }

    /// Returns a copy of the point carrying `density`.
    #[must_use]
    pub const fn with_density(self, density: f64) -> Self {
        Self {
            density: Some(density),
            ..self
        }
    }

    /// Stable index of the point (its row in the original input).
    #[rustfmt::skip]
    #[must_use]
    pub const fn index(&self) -> usize { self.index }

    /// Horizontal coordinate.
    #[rustfmt::skip]
    #[must_use]
    pub const fn x(&self) -> f64 { self.x }

    /// Vertical coordinate.
    #[rustfmt::skip]
    #[must_use]
    pub const fn y(&self) -> f64 { self.y }

    /// Density attached to the point, if any.
    #[rustfmt::skip]
    #[must_use]
    pub const fn density(&self) -> Option<f64> { self.density }

    /// Euclidean distance to `other`.
    ///
    /// # Examples
    /// ```
    /// use tridbscan_core::Point;
    ///
    /// let a = Point::new(0, 0.0, 0.0);
    /// let b = Point::new(1, 3.0, 4.0);
    /// assert_eq!(a.distance_to(&b), 5.0);
    /// ```
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn validate(&self) -> Result<()> {
        let checks = [
            (self.x, Axis::X),
            (self.y, Axis::Y),
            (self.density.unwrap_or(0.0), Axis::Density),
        ];
        for (value, axis) in checks {
            if !value.is_finite() {
                return Err(TriDbscanError::NonFiniteCoordinate {
                    index: self.index,
                    axis,
                });
            }
        }
        Ok(())
    }
}

/// An ordered, named collection of [`Point`]s.
///
/// # Examples
/// ```
/// use tridbscan_core::PointSet;
///
/// let set = PointSet::from_coordinates("demo", &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)])?;
/// assert_eq!(set.len(), 3);
/// assert_eq!(set.name(), "demo");
/// assert_eq!(set.distance(0, 1), 1.0);
/// # Ok::<(), tridbscan_core::TriDbscanError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    name: Arc<str>,
    points: Vec<Point>,
}

impl PointSet {
    /// Builds a point set after validating coordinates and index uniqueness.
    ///
    /// # Errors
    /// Returns [`TriDbscanError::NonFiniteCoordinate`] when a coordinate or
    /// density is NaN or infinite and [`TriDbscanError::DuplicateIndex`] when
    /// two points share an index.
    pub fn try_new(name: impl Into<Arc<str>>, points: Vec<Point>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(points.len());
        for point in &points {
            point.validate()?;
            if !seen.insert(point.index) {
                return Err(TriDbscanError::DuplicateIndex { index: point.index });
            }
        }
        Ok(Self {
            name: name.into(),
            points,
        })
    }

    /// Builds a point set from raw coordinates; row order defines the index.
    ///
    /// # Errors
    /// Returns [`TriDbscanError::NonFiniteCoordinate`] for NaN or infinite
    /// coordinates.
    pub fn from_coordinates(name: impl Into<Arc<str>>, coordinates: &[(f64, f64)]) -> Result<Self> {
        let points = coordinates
            .iter()
            .enumerate()
            .map(|(index, &(x, y))| Point::new(index, x, y))
            .collect();
        Self::try_new(name, points)
    }

    /// Attaches one density value per point, in positional order.
    ///
    /// # Errors
    /// Returns [`TriDbscanError::DensityLengthMismatch`] when the lengths
    /// differ and [`TriDbscanError::NonFiniteCoordinate`] for non-finite
    /// densities.
    pub fn with_densities(self, densities: &[f64]) -> Result<Self> {
        if densities.len() != self.points.len() {
            return Err(TriDbscanError::DensityLengthMismatch {
                data_source: self.name,
                expected: self.points.len(),
                actual: densities.len(),
            });
        }
        let points = self
            .points
            .iter()
            .zip(densities)
            .map(|(point, &density)| {
                let point = point.with_density(density);
                point.validate().map(|()| point)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: self.name,
            points,
        })
    }

    /// Returns the human-readable name of the set.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns whether the set holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in positional order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns the point at `position`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Point> {
        self.points.get(position)
    }

    /// Euclidean distance between the points at two positions.
    ///
    /// # Panics
    /// Panics when either position is out of bounds.
    #[must_use]
    pub fn distance(&self, left: usize, right: usize) -> f64 {
        self.points[left].distance_to(&self.points[right])
    }

    /// Returns the densities when every point carries one.
    #[must_use]
    pub fn densities(&self) -> Option<Vec<f64>> {
        self.points.iter().map(Point::density).collect()
    }

    /// Builds a new set from the points at `positions`, keeping their
    /// stable indices and densities.
    pub(crate) fn subset(&self, positions: &[usize]) -> Self {
        Self {
            name: self.shared_name(),
            points: positions.iter().map(|&pos| self.points[pos]).collect(),
        }
    }

    /// Maps every stable index to its current position.
    pub(crate) fn positions_by_index(&self) -> HashMap<usize, usize> {
        self.points
            .iter()
            .enumerate()
            .map(|(position, point)| (point.index, position))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(f64::NAN, 0.0, Axis::X)]
    #[case(0.0, f64::INFINITY, Axis::Y)]
    fn try_new_rejects_non_finite(#[case] x: f64, #[case] y: f64, #[case] axis: Axis) {
        let err = PointSet::try_new("bad", vec![Point::new(7, x, y)])
            .expect_err("non-finite coordinates must be rejected");
        assert_eq!(err, TriDbscanError::NonFiniteCoordinate { index: 7, axis });
    }

    #[test]
    fn try_new_rejects_duplicate_indices() {
        let err = PointSet::try_new(
            "dup",
            vec![Point::new(1, 0.0, 0.0), Point::new(1, 1.0, 1.0)],
        )
        .expect_err("duplicate indices must be rejected");
        assert_eq!(err, TriDbscanError::DuplicateIndex { index: 1 });
    }

    #[test]
    fn with_densities_checks_length() {
        let set = PointSet::from_coordinates("demo", &[(0.0, 0.0), (1.0, 1.0)])
            .expect("coordinates are finite");
        let err = set
            .with_densities(&[0.5])
            .expect_err("length mismatch must fail");
        assert!(matches!(
            err,
            TriDbscanError::DensityLengthMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn with_densities_rejects_nan() {
        let set = PointSet::from_coordinates("demo", &[(0.0, 0.0)]).expect("finite");
        let err = set
            .with_densities(&[f64::NAN])
            .expect_err("NaN density must fail");
        assert_eq!(
            err,
            TriDbscanError::NonFiniteCoordinate {
                index: 0,
                axis: Axis::Density
            }
        );
    }

    #[test]
    fn subset_keeps_stable_indices() {
        let set = PointSet::from_coordinates("demo", &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)])
            .expect("finite")
            .with_densities(&[0.1, 0.2, 0.3])
            .expect("one density per point");
        let subset = set.subset(&[2, 0]);
        let indices: Vec<usize> = subset.points().iter().map(Point::index).collect();
        assert_eq!(indices, vec![2, 0]);
        assert_eq!(subset.densities(), Some(vec![0.3, 0.1]));
        assert_eq!(subset.positions_by_index().get(&2), Some(&0));
    }

    #[test]
    fn densities_require_every_point() {
        let set = PointSet::try_new(
            "partial",
            vec![Point::new(0, 0.0, 0.0).with_density(1.0), Point::new(1, 1.0, 0.0)],
        )
        .expect("valid points");
        assert_eq!(set.densities(), None);
    }
}
