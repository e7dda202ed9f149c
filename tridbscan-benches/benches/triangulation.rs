//! Delaunay triangulation and graph pruning benchmarks.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use tridbscan_benches::{
    error::BenchSetupError,
    source::{BlobConfig, generate},
};
use tridbscan_core::{GraphPruner, delaunay};

const SEED: u64 = 42;

const POINT_COUNTS: &[usize] = &[500, 2_000, 8_000];

fn triangulation_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("triangulation");
    group.sample_size(20);

    for &point_count in POINT_COUNTS {
        let cloud = generate(&BlobConfig::separated(point_count, SEED))?;
        group.bench_with_input(
            BenchmarkId::new("delaunay", point_count),
            &cloud,
            |b, cloud| b.iter(|| delaunay(cloud)),
        );

        let triangles = delaunay(&cloud)?;
        let pruner = GraphPruner::default();
        group.bench_with_input(
            BenchmarkId::new("prune", point_count),
            &(cloud, triangles),
            |b, (cloud, triangles)| {
                b.iter(|| pruner.prune_triangles(cloud, triangles.clone()));
            },
        );
    }

    group.finish();
    Ok(())
}

fn triangulation(c: &mut Criterion) {
    if let Err(err) = triangulation_impl(c) {
        panic!("triangulation benchmark setup failed: {err}");
    }
}

criterion_group!(benches, triangulation);
criterion_main!(benches);
