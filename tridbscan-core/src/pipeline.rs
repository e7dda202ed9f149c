//! The per-partition labelling pipeline: triangulate, prune, cluster and
//! reassign noise.

use rand::Rng;
use tracing::debug;

use crate::{
    Result,
    engine::ConnectivityEngine,
    point::PointSet,
    prune::GraphPruner,
    reassign::reassign_noise,
    result::ClusterLabel,
};

/// Labels every point of `points`, returning labels in positional order.
///
/// Labels are local to this call; callers running several partitions must
/// reconcile them.
pub(crate) fn label_partition<R: Rng + ?Sized>(
    points: &PointSet,
    pruner: &GraphPruner,
    engine: &ConnectivityEngine,
    rng: &mut R,
) -> Result<Vec<ClusterLabel>> {
    let pruned = pruner.prune(points)?;
    let mut labels = engine.cluster(points.len(), pruned.triangles(), rng);
    let reassigned = reassign_noise(points, &mut labels);
    debug!(
        points = points.len(),
        triangles = pruned.triangles().len(),
        reassigned = reassigned.reassigned,
        training = reassigned.training,
        "labelled partition"
    );
    Ok(labels)
}
