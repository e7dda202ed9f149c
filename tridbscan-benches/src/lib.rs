//! Benchmark support crate for tridbscan.
//!
//! Provides synthetic point clouds and parameter types used by the Criterion
//! benchmarks of triangulation, pruning and the full clustering pipeline.

pub mod error;
pub mod params;
pub mod source;
