use arrow_schema::{ArrowError, DataType};
use thiserror::Error;
use tridbscan_core::TriDbscanError;

#[derive(Debug, Error)]
pub enum PointProviderError {
    #[error("column `{column}` not found in the input header")]
    ColumnNotFound { column: String },
    #[error("column `{column}` must be Float64 or Float32 but found {actual:?}")]
    InvalidColumnType { column: String, actual: DataType },
    #[error("row {row} has no value in column `{column}`")]
    NullValue { row: usize, column: String },
    #[error("row {row} column `{column}` is not a number: `{raw}`")]
    InvalidNumber {
        row: usize,
        column: String,
        raw: String,
    },
    #[error("input `{name}` contains no rows")]
    EmptyInput { name: String },
    #[error(transparent)]
    Core(#[from] TriDbscanError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
