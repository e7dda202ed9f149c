//! TriDBSCAN core library.
//!
//! Clusters two-dimensional points by building a Delaunay neighbour graph,
//! pruning statistically long edges, flood-filling from core points and
//! reassigning leftover noise to its nearest clustered point. Large inputs
//! can be split into density-guided seed paths that are clustered
//! independently and reconciled afterwards.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod density;
mod engine;
mod error;
mod graph;
mod partition;
mod pipeline;
mod point;
mod prune;
mod reassign;
mod result;
mod stats;
mod telemetry;
mod triangulation;
mod tridbscan;

pub use crate::{
    builder::{ClusteringMode, DEFAULT_RNG_SEED, ExecutionStrategy, TriDbscanBuilder},
    density::{
        DensityCache, DensityEstimator, GaussianKde, MemoryDensityCache, NoDensityCache,
        attach_densities,
    },
    engine::ConnectivityEngine,
    error::{Axis, DensityError, DensityErrorCode, Result, TriDbscanError, TriDbscanErrorCode},
    graph::{Adjacency, Neighbourhood, neighbours},
    partition::{LabelReconciler, PartitionPlan, SeedPath, SeedPathPartitioner},
    point::{Point, PointSet},
    prune::{GraphPruner, PruneOutcome, global_pass, local_pass},
    reassign::{ReassignOutcome, reassign_noise},
    result::{Assignment, ClusterLabel, ClusteringResult, InvalidAssignments},
    triangulation::{Triangle, delaunay},
    tridbscan::TriDbscan,
};
