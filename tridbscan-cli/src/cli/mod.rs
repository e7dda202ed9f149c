//! Command-line interface for TriDBSCAN.
//!
//! The `run` command loads points from CSV or Parquet, clusters them directly
//! or through density-guided partitions and reports one row per point.

mod commands;
mod output;

pub use commands::{
    Cli, CliError, ColumnArgs, Command, CsvArgs, ExecutionSummary, ParquetArgs, RunCommand,
    RunSource, StrategyArg, run_cli,
};
pub use output::render_table;
