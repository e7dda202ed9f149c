//! Parquet point loading.
use std::{fs::File, path::Path};

use arrow_array::{Array, ArrayRef, Float32Array, Float64Array, RecordBatchReader};
use arrow_schema::DataType;
use parquet::arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder};
use parquet::file::reader::ChunkReader;
use tracing::debug;
use tridbscan_core::{Point, PointSet};

use crate::{columns::PointColumns, errors::PointProviderError};

/// Reads points from Parquet data whose coordinate columns are non-null
/// `Float64` or `Float32`.
///
/// # Errors
/// Returns [`PointProviderError::ColumnNotFound`] for missing columns,
/// [`PointProviderError::InvalidColumnType`] for non-float columns,
/// [`PointProviderError::NullValue`] for nulls,
/// [`PointProviderError::EmptyInput`] when no rows are present and
/// [`PointProviderError::Core`] for non-finite values.
pub fn read_parquet<R>(
    name: &str,
    reader: R,
    columns: &PointColumns,
) -> Result<PointSet, PointProviderError>
where
    R: ChunkReader + 'static,
{
    let wanted: Vec<&str> = [Some(columns.x()), Some(columns.y()), columns.density()]
        .into_iter()
        .flatten()
        .collect();
    let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
    let mask = ProjectionMask::columns(builder.parquet_schema(), wanted.iter().copied());
    let reader = builder.with_projection(mask).build()?;
    let schema = reader.schema();
    let index_of = |column: &str| {
        schema
            .index_of(column)
            .map_err(|_| PointProviderError::ColumnNotFound {
                column: column.to_owned(),
            })
    };
    let x = index_of(columns.x())?;
    let y = index_of(columns.y())?;
    let density = columns
        .density()
        .map(|column| index_of(column).map(|index| (index, column)))
        .transpose()?;

    let mut points = Vec::new();
    for batch in reader {
        let batch = batch?;
        let start = points.len();
        let xs = float_values(batch.column(x), columns.x(), start)?;
        let ys = float_values(batch.column(y), columns.y(), start)?;
        let densities = density
            .map(|(index, column)| float_values(batch.column(index), column, start))
            .transpose()?;
        for (offset, (&px, &py)) in xs.iter().zip(&ys).enumerate() {
            let point = Point::new(start + offset, px, py);
            points.push(match &densities {
                Some(values) => point.with_density(values[offset]),
                None => point,
            });
        }
    }
    if points.is_empty() {
        return Err(PointProviderError::EmptyInput {
            name: name.to_owned(),
        });
    }
    debug!(name, rows = points.len(), "loaded parquet points");
    Ok(PointSet::try_new(name, points)?)
}

/// Reads points from the Parquet file at `path`, naming the set after the
/// path.
///
/// # Errors
/// Returns [`PointProviderError::Io`] when the file cannot be opened and
/// otherwise the errors of [`read_parquet`].
pub fn read_parquet_path(
    path: impl AsRef<Path>,
    columns: &PointColumns,
) -> Result<PointSet, PointProviderError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    read_parquet(&path.display().to_string(), file, columns)
}

fn float_values(
    array: &ArrayRef,
    column: &str,
    start_row: usize,
) -> Result<Vec<f64>, PointProviderError> {
    if let Some(row) = (0..array.len()).find(|&row| array.is_null(row)) {
        return Err(PointProviderError::NullValue {
            row: start_row + row,
            column: column.to_owned(),
        });
    }
    let invalid = || PointProviderError::InvalidColumnType {
        column: column.to_owned(),
        actual: array.data_type().clone(),
    };
    match array.data_type() {
        DataType::Float64 => array
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|values| values.values().to_vec())
            .ok_or_else(invalid),
        DataType::Float32 => array
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|values| values.values().iter().copied().map(f64::from).collect())
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}
