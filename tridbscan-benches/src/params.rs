//! Benchmark parameter types.

use std::fmt;

use tridbscan_core::ClusteringMode;

/// Parameters for one pipeline benchmark run.
#[derive(Clone, Debug)]
pub struct PipelineBenchParams {
    /// Number of points in the cloud.
    pub point_count: usize,
    /// Direct or density-guided clustering.
    pub mode: ClusteringMode,
}

impl fmt::Display for PipelineBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            ClusteringMode::Direct => "direct",
            ClusteringMode::DensityGuided => "density",
        };
        write!(f, "n={},mode={mode}", self.point_count)
    }
}
