//! Point providers: CSV and Parquet loaders and a file-backed density cache.

mod cache;
mod columns;
mod delimited;
mod errors;
mod parquet_source;

pub use cache::CsvDensityCache;
pub use columns::PointColumns;
pub use delimited::{read_csv, read_csv_path};
pub use errors::PointProviderError;
pub use parquet_source::{read_parquet, read_parquet_path};

#[cfg(test)]
mod tests;
