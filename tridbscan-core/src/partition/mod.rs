//! Density-guided partitioning and cross-partition label reconciliation.

mod reconcile;
mod seed;
mod seed_path;

pub(crate) use self::seed::mix_partition_seed;
pub use self::{
    reconcile::LabelReconciler,
    seed_path::{PartitionPlan, SeedPath, SeedPathPartitioner},
};
