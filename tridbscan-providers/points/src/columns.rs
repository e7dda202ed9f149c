//! Column selection shared by the CSV and Parquet loaders.

/// Names of the columns holding each point's coordinates and, optionally,
/// a pre-computed density.
///
/// # Examples
/// ```
/// use tridbscan_providers_points::PointColumns;
///
/// let columns = PointColumns::default().with_density("kde");
/// assert_eq!(columns.x(), "x");
/// assert_eq!(columns.density(), Some("kde"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointColumns {
    x: String,
    y: String,
    density: Option<String>,
}

impl PointColumns {
    /// Selects the coordinate columns by name.
    #[must_use]
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            density: None,
        }
    }

    /// Also reads densities from `column`.
    #[must_use]
    pub fn with_density(mut self, column: impl Into<String>) -> Self {
        self.density = Some(column.into());
        self
    }

    #[must_use]
    pub fn x(&self) -> &str {
        &self.x
    }

    #[must_use]
    pub fn y(&self) -> &str {
        &self.y
    }

    #[must_use]
    pub fn density(&self) -> Option<&str> {
        self.density.as_deref()
    }
}

impl Default for PointColumns {
    fn default() -> Self {
        Self::new("x", "y")
    }
}
