use cap_std::{ambient_authority, fs::Dir};
use rstest::{fixture, rstest};
use tempfile::TempDir;
use tridbscan_core::{
    DensityCache, DensityError, GaussianKde, PointSet, TriDbscanError, attach_densities,
};

use crate::CsvDensityCache;

#[fixture]
fn workspace() -> TempDir {
    tempfile::tempdir().expect("tempdir")
}

fn cache_in(dir: &TempDir) -> CsvDensityCache {
    CsvDensityCache::new(Dir::open_ambient_dir(dir.path(), ambient_authority()).expect("open dir"))
}

#[rstest]
fn computes_once_then_reads_the_file(workspace: TempDir) {
    let cache = cache_in(&workspace);
    let mut calls = 0;
    let mut compute = || -> Result<Vec<f64>, DensityError> {
        calls += 1;
        Ok(vec![0.5, 0.25, 0.125])
    };
    let first = cache.load_or_compute("density.csv", &mut compute).expect("computed");
    let second = cache.load_or_compute("density.csv", &mut compute).expect("cached");
    assert_eq!(first, second);
    assert_eq!(calls, 1);

    let stored = std::fs::read_to_string(workspace.path().join("density.csv")).expect("file");
    assert_eq!(stored.lines().collect::<Vec<_>>(), vec!["0.5", "0.25", "0.125"]);
}

#[rstest]
fn missing_file_loads_as_none(workspace: TempDir) {
    assert_eq!(cache_in(&workspace).load("absent.csv").expect("readable"), None);
}

#[rstest]
fn malformed_file_is_a_cache_error(workspace: TempDir) {
    std::fs::write(workspace.path().join("bad.csv"), "0.5\nnot-a-number\n").expect("write");
    let mut compute = || -> Result<Vec<f64>, DensityError> { Ok(vec![1.0]) };
    let err = cache_in(&workspace)
        .load_or_compute("bad.csv", &mut compute)
        .expect_err("malformed file must fail");
    assert!(matches!(err, DensityError::Cache { ref key, .. } if &**key == "bad.csv"));
}

#[rstest]
fn keys_cannot_escape_the_directory(workspace: TempDir) {
    let mut compute = || -> Result<Vec<f64>, DensityError> { Ok(vec![1.0]) };
    let err = cache_in(&workspace)
        .load_or_compute("../escape.csv", &mut compute)
        .expect_err("escaping key must fail");
    assert!(matches!(err, DensityError::Cache { .. }));
}

#[rstest]
fn stale_file_with_wrong_length_is_rejected(workspace: TempDir) {
    std::fs::write(workspace.path().join("density.csv"), "0.5\n0.5\n").expect("write");
    let set = PointSet::from_coordinates("tri", &[(0.0, 0.0), (1.0, 0.2), (0.3, 1.0)])
        .expect("finite coordinates");
    let err = attach_densities(set, &GaussianKde, &cache_in(&workspace), "density.csv")
        .expect_err("length mismatch must fail");
    assert!(matches!(
        err,
        TriDbscanError::Density {
            error: DensityError::LengthMismatch { expected: 3, actual: 2 },
            ..
        }
    ));
}
