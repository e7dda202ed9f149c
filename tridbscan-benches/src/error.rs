//! Benchmark setup error type.

use tridbscan_core::TriDbscanError;

/// Errors that may occur while preparing benchmark inputs.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// The synthetic cloud configuration was rejected.
    #[error("invalid synthetic configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected.
        reason: &'static str,
    },
    /// Building the point set or running the pipeline failed.
    #[error("tridbscan failed: {0}")]
    Core(#[from] TriDbscanError),
}
