//! Deterministic point layouts with predictable Delaunay graphs.
//!
//! Every interior lattice point has exactly six equidistant neighbours, so
//! pruning leaves lattices intact and each lattice forms one cluster.

/// Row spacing of a unit triangular lattice.
const ROW_HEIGHT: f64 = 0.866_025_403_784_438_6;

/// A `side` by `side` triangular lattice with unit spacing, lower-left
/// corner at `origin`. Odd rows are shifted right by half a unit.
///
/// # Examples
/// ```
/// use tridbscan_test_support::fixtures::triangular_lattice;
///
/// let points = triangular_lattice((10.0, 0.0), 3);
/// assert_eq!(points.len(), 9);
/// assert_eq!(points[0], (10.0, 0.0));
/// assert_eq!(points[3].0, 10.5);
/// ```
#[must_use]
pub fn triangular_lattice(origin: (f64, f64), side: u32) -> Vec<(f64, f64)> {
    triangular_grid(origin, side, side)
}

/// A triangular lattice of `rows` rows holding `cols` points each.
#[must_use]
pub fn triangular_grid(origin: (f64, f64), cols: u32, rows: u32) -> Vec<(f64, f64)> {
    (0..rows)
        .flat_map(|row| {
            let shift = if row % 2 == 0 { 0.0 } else { 0.5 };
            (0..cols).map(move |col| {
                (
                    origin.0 + f64::from(col) + shift,
                    origin.1 + f64::from(row) * ROW_HEIGHT,
                )
            })
        })
        .collect()
}

/// Lattices of the given side placed `gap` units apart along the x axis.
#[must_use]
pub fn separated_lattices(count: u32, side: u32, gap: f64) -> Vec<(f64, f64)> {
    (0..count)
        .flat_map(|blob| triangular_lattice((f64::from(blob) * gap, 0.0), side))
        .collect()
}

/// Appends a far-away point to `points` and returns its position.
pub fn push_outlier(points: &mut Vec<(f64, f64)>, at: (f64, f64)) -> usize {
    points.push(at);
    points.len() - 1
}
