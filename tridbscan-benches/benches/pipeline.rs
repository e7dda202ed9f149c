//! End-to-end clustering benchmarks in both modes.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use tridbscan_benches::{
    error::BenchSetupError,
    params::PipelineBenchParams,
    source::{BlobConfig, generate},
};
use tridbscan_core::{ClusteringMode, TriDbscanBuilder};

const SEED: u64 = 42;

const POINT_COUNTS: &[usize] = &[500, 2_000];

fn pipeline_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    for &point_count in POINT_COUNTS {
        let cloud = generate(&BlobConfig::separated(point_count, SEED))?;
        for mode in [ClusteringMode::Direct, ClusteringMode::DensityGuided] {
            let tridbscan = TriDbscanBuilder::new()
                .with_mode(mode)
                .with_rng_seed(SEED)
                .build()?;
            let params = PipelineBenchParams { point_count, mode };
            group.bench_with_input(BenchmarkId::from_parameter(&params), &cloud, |b, cloud| {
                b.iter(|| tridbscan.run(cloud));
            });
        }
    }

    group.finish();
    Ok(())
}

fn pipeline(c: &mut Criterion) {
    if let Err(err) = pipeline_impl(c) {
        panic!("pipeline benchmark setup failed: {err}");
    }
}

criterion_group!(benches, pipeline);
criterion_main!(benches);
