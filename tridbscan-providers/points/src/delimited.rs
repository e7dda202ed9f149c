//! CSV point loading.
use std::{fs::File, io::Read, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;
use tridbscan_core::{Point, PointSet};

use crate::{columns::PointColumns, errors::PointProviderError};

/// Reads points from a headed CSV stream. Row order defines each point's
/// stable index.
///
/// # Errors
/// Returns [`PointProviderError::ColumnNotFound`] when a selected column is
/// missing from the header, [`PointProviderError::NullValue`] or
/// [`PointProviderError::InvalidNumber`] for empty or malformed cells,
/// [`PointProviderError::EmptyInput`] when there are no data rows and
/// [`PointProviderError::Core`] for non-finite values.
///
/// # Examples
/// ```
/// use tridbscan_providers_points::{PointColumns, read_csv};
///
/// let input = "x,y\n0.0,0.0\n1.0,0.5\n";
/// let set = read_csv("inline", input.as_bytes(), &PointColumns::default())?;
/// assert_eq!(set.len(), 2);
/// assert_eq!(set.points()[1].y(), 0.5);
/// # Ok::<(), tridbscan_providers_points::PointProviderError>(())
/// ```
pub fn read_csv<R: Read>(
    name: &str,
    reader: R,
    columns: &PointColumns,
) -> Result<PointSet, PointProviderError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    let x = column_index(&headers, columns.x())?;
    let y = column_index(&headers, columns.y())?;
    let density = columns
        .density()
        .map(|column| column_index(&headers, column).map(|index| (index, column)))
        .transpose()?;

    let mut points = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let point = Point::new(
            row,
            parse_cell(&record, x, row, columns.x())?,
            parse_cell(&record, y, row, columns.y())?,
        );
        points.push(match density {
            Some((index, column)) => point.with_density(parse_cell(&record, index, row, column)?),
            None => point,
        });
    }
    if points.is_empty() {
        return Err(PointProviderError::EmptyInput {
            name: name.to_owned(),
        });
    }
    debug!(name, rows = points.len(), "loaded csv points");
    Ok(PointSet::try_new(name, points)?)
}

/// Reads points from the CSV file at `path`, naming the set after the path.
///
/// # Errors
/// Returns [`PointProviderError::Io`] when the file cannot be opened and
/// otherwise the errors of [`read_csv`].
pub fn read_csv_path(
    path: impl AsRef<Path>,
    columns: &PointColumns,
) -> Result<PointSet, PointProviderError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    read_csv(&path.display().to_string(), file, columns)
}

fn column_index(headers: &StringRecord, column: &str) -> Result<usize, PointProviderError> {
    headers
        .iter()
        .position(|header| header == column)
        .ok_or_else(|| PointProviderError::ColumnNotFound {
            column: column.to_owned(),
        })
}

fn parse_cell(
    record: &StringRecord,
    index: usize,
    row: usize,
    column: &str,
) -> Result<f64, PointProviderError> {
    let raw = record
        .get(index)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| PointProviderError::NullValue {
            row,
            column: column.to_owned(),
        })?;
    raw.parse().map_err(|_| PointProviderError::InvalidNumber {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
    })
}
