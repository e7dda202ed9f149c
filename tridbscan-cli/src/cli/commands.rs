//! Command implementations and argument parsing for the tridbscan CLI.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::{Span, field, info, instrument};
use tridbscan_core::{
    ClusteringMode, ClusteringResult, ExecutionStrategy, PointSet, TriDbscan, TriDbscanBuilder,
    TriDbscanError,
};
use tridbscan_providers_points::{
    CsvDensityCache, PointColumns, PointProviderError, read_csv, read_parquet,
};

const DEFAULT_MIN_PTS: usize = 5;
const DEFAULT_LOCAL_STD: f64 = 2.5;
const DEFAULT_MIN_SAMPLE: usize = 12;
const DEFAULT_SEED: u64 = tridbscan_core::DEFAULT_RNG_SEED;
const DEFAULT_DENSITY_CACHE_KEY: &str = "density.csv";

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "tridbscan", about = "Cluster 2D points with triangulation-based DBSCAN.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Cluster a point file and print one row per point.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Neighbour count a point needs to be a core point.
    #[arg(long = "min-pts", default_value_t = DEFAULT_MIN_PTS)]
    pub min_pts: usize,

    /// Standard deviations above a point's mean edge length that mark an
    /// edge as locally anomalous.
    #[arg(long = "local-std", default_value_t = DEFAULT_LOCAL_STD)]
    pub local_std: f64,

    /// Unconditional extensions of every density seed path.
    #[arg(long = "min-sample", default_value_t = DEFAULT_MIN_SAMPLE)]
    pub min_sample: usize,

    /// Seed for start-point selection.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// How density-guided partitions are scheduled.
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    pub strategy: StrategyArg,

    /// Split the input into density-guided seed paths before clustering.
    #[arg(long = "density-guided")]
    pub density_guided: bool,

    /// Directory caching estimated densities between runs.
    #[arg(long = "density-cache", value_name = "DIR")]
    pub density_cache: Option<PathBuf>,

    /// File name of the cached densities inside the cache directory.
    #[arg(long = "density-cache-key", default_value = DEFAULT_DENSITY_CACHE_KEY)]
    pub density_cache_key: String,

    /// Point source configuration.
    #[command(subcommand)]
    pub source: RunSource,
}

/// Scheduler choices exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Parallel when available, otherwise sequential.
    Auto,
    /// One partition at a time.
    Sequential,
    /// Partitions on the rayon pool.
    Parallel,
}

impl From<StrategyArg> for ExecutionStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Auto => Self::Auto,
            StrategyArg::Sequential => Self::Sequential,
            StrategyArg::Parallel => Self::Parallel,
        }
    }
}

/// Point sources supported by the `run` command.
#[derive(Debug, Subcommand, Clone)]
pub enum RunSource {
    /// Read a headed CSV file.
    Csv(CsvArgs),
    /// Read a Parquet file with float coordinate columns.
    Parquet(ParquetArgs),
}

/// Column selection shared by every source.
#[derive(Debug, Args, Clone, PartialEq, Eq)]
pub struct ColumnArgs {
    /// Column holding x coordinates.
    #[arg(long = "x-column", default_value = "x")]
    pub x_column: String,

    /// Column holding y coordinates.
    #[arg(long = "y-column", default_value = "y")]
    pub y_column: String,

    /// Column holding pre-computed densities.
    #[arg(long = "density-column")]
    pub density_column: Option<String>,
}

impl Default for ColumnArgs {
    fn default() -> Self {
        Self {
            x_column: "x".into(),
            y_column: "y".into(),
            density_column: None,
        }
    }
}

impl From<&ColumnArgs> for PointColumns {
    fn from(value: &ColumnArgs) -> Self {
        let columns = PointColumns::new(value.x_column.as_str(), value.y_column.as_str());
        match &value.density_column {
            Some(column) => columns.with_density(column.as_str()),
            None => columns,
        }
    }
}

/// CSV ingestion arguments.
#[derive(Debug, Args, Clone)]
pub struct CsvArgs {
    /// Path to the CSV file.
    pub path: PathBuf,

    #[command(flatten)]
    pub columns: ColumnArgs,

    /// Override name for the point set (defaults to the file stem).
    #[arg(long)]
    pub name: Option<String>,
}

/// Parquet ingestion arguments.
#[derive(Debug, Args, Clone)]
pub struct ParquetArgs {
    /// Path to the Parquet file.
    pub path: PathBuf,

    #[command(flatten)]
    pub columns: ColumnArgs,

    /// Override name for the point set (defaults to the file stem).
    #[arg(long)]
    pub name: Option<String>,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while opening an input source.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Loading points or opening the density cache failed.
    #[error(transparent)]
    Provider(#[from] PointProviderError),
    /// Core clustering failed.
    #[error(transparent)]
    Core(#[from] TriDbscanError),
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name of the clustered point set.
    pub data_source: String,
    /// Labels and counts produced by the run.
    pub result: ClusteringResult,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading or clustering fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use clap::Parser;
/// # use tempfile::NamedTempFile;
/// # use tridbscan_cli::cli::{Cli, run_cli};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "x,y\n0,0\n1,0\n0,1\n1,1\n0.5,0.6\n")?;
/// let path = file.path().to_string_lossy().into_owned();
/// let cli = Cli::try_parse_from(["tridbscan", "run", "--min-pts", "3", "csv", path.as_str()])?;
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.result.rows().len(), 5);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(min_pts = command.min_pts, density_guided = command.density_guided, source = field::Empty),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let mut builder = TriDbscanBuilder::new()
        .with_min_pts(command.min_pts)
        .with_local_std(command.local_std)
        .with_min_sample(command.min_sample)
        .with_rng_seed(command.seed)
        .with_execution_strategy(command.strategy.into())
        .with_mode(if command.density_guided {
            ClusteringMode::DensityGuided
        } else {
            ClusteringMode::Direct
        });
    if let Some(cache) = open_density_cache(&command)? {
        builder = builder
            .with_density_cache(Arc::new(cache))
            .with_density_cache_key(command.density_cache_key.as_str());
    }
    let tridbscan = builder.build()?;

    let span = Span::current();
    let points = match &command.source {
        RunSource::Csv(args) => {
            span.record("source", field::display("csv"));
            load_csv(args)?
        }
        RunSource::Parquet(args) => {
            span.record("source", field::display("parquet"));
            load_parquet(args)?
        }
    };
    let summary = execute(&tridbscan, &points)?;

    info!(
        data_source = summary.data_source.as_str(),
        clusters = summary.result.cluster_count(),
        noise = summary.result.noise_count(),
        "command completed"
    );
    Ok(summary)
}

fn execute(tridbscan: &TriDbscan, points: &PointSet) -> Result<ExecutionSummary, CliError> {
    let result = tridbscan.run(points)?;
    Ok(ExecutionSummary {
        data_source: points.name().to_owned(),
        result,
    })
}

#[instrument(name = "cli.load_csv", err, skip(args), fields(path = %args.path.display()))]
pub(super) fn load_csv(args: &CsvArgs) -> Result<PointSet, CliError> {
    let name = derive_data_source_name(&args.path, args.name.as_deref());
    let file = open_input(&args.path)?;
    Ok(read_csv(&name, BufReader::new(file), &PointColumns::from(&args.columns))?)
}

#[instrument(name = "cli.load_parquet", err, skip(args), fields(path = %args.path.display()))]
pub(super) fn load_parquet(args: &ParquetArgs) -> Result<PointSet, CliError> {
    let name = derive_data_source_name(&args.path, args.name.as_deref());
    let file = open_input(&args.path)?;
    Ok(read_parquet(&name, file, &PointColumns::from(&args.columns))?)
}

/// Opens the file cache when one is configured for a density-guided run.
fn open_density_cache(command: &RunCommand) -> Result<Option<CsvDensityCache>, CliError> {
    command
        .density_cache
        .as_deref()
        .filter(|_| command.density_guided)
        .map(|dir| CsvDensityCache::open_ambient(dir))
        .transpose()
        .map_err(CliError::from)
}

fn open_input(path: &Path) -> Result<File, CliError> {
    File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(super) fn derive_data_source_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| "points".to_owned())
}
