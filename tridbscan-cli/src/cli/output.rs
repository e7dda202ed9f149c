//! CSV rendering of clustering results.

use std::io::{self, Write};

use serde::Serialize;
use tridbscan_core::{Assignment, ClusteringResult};

#[derive(Serialize)]
struct OutputRow {
    x: f64,
    y: f64,
    index: usize,
    est_clust: u64,
}

impl From<&Assignment> for OutputRow {
    fn from(row: &Assignment) -> Self {
        Self {
            x: row.x,
            y: row.y,
            index: row.index,
            est_clust: row.label.get(),
        }
    }
}

/// Writes `result` as a headed `x,y,index,est_clust` CSV table in emission
/// order; noise is labelled `0`.
///
/// # Errors
/// Returns [`io::Error`] if writing to `writer` fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use tridbscan_cli::cli::render_table;
/// # use tridbscan_core::{Assignment, ClusterLabel, ClusteringResult};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let result = ClusteringResult::try_from_rows(
///     vec![Assignment { x: 0.5, y: 1.0, index: 0, label: ClusterLabel::new(1) }],
///     Vec::new(),
///     1,
/// )?;
/// let mut buffer = Vec::new();
/// render_table(&result, &mut buffer)?;
/// assert_eq!(String::from_utf8(buffer)?, "x,y,index,est_clust\n0.5,1.0,0,1\n");
/// # Ok(())
/// # }
/// ```
pub fn render_table(result: &ClusteringResult, writer: impl Write) -> io::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in result.rows() {
        writer.serialize(OutputRow::from(row))?;
    }
    if result.rows().is_empty() {
        writer.write_record(["x", "y", "index", "est_clust"])?;
    }
    writer.flush()
}
