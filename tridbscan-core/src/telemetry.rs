//! Optional metrics counters; compiled to no-ops without the `metrics`
//! feature.

#[cfg(feature = "metrics")]
pub(crate) fn record_pruned(global: usize, local: usize) {
    metrics::counter!("tridbscan_triangles_pruned_global").increment(global as u64);
    metrics::counter!("tridbscan_triangles_pruned_local").increment(local as u64);
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_pruned(_global: usize, _local: usize) {}

#[cfg(feature = "metrics")]
pub(crate) fn record_noise_reassigned(count: usize) {
    metrics::counter!("tridbscan_noise_reassigned").increment(count as u64);
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_noise_reassigned(_count: usize) {}

#[cfg(feature = "metrics")]
pub(crate) fn record_points_dropped(count: usize) {
    metrics::counter!("tridbscan_points_dropped").increment(count as u64);
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_points_dropped(_count: usize) {}
