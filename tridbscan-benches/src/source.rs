//! Seeded synthetic point clouds: uniform discs plus background noise.

use std::f64::consts::TAU;

use rand::{Rng, SeedableRng, rngs::SmallRng};
use tridbscan_core::PointSet;

use crate::error::BenchSetupError;

/// Shape of a synthetic cloud.
#[derive(Clone, Debug)]
pub struct BlobConfig {
    /// Total number of points, noise included.
    pub point_count: usize,
    /// Number of discs placed on a circle.
    pub blob_count: usize,
    /// Disc radius.
    pub radius: f64,
    /// Distance between disc centres and the origin.
    pub separation: f64,
    /// Fraction of points scattered uniformly over the bounding square.
    pub noise_fraction: f64,
    /// Random seed.
    pub seed: u64,
}

impl BlobConfig {
    /// Four well-separated discs with five percent noise.
    #[must_use]
    pub fn separated(point_count: usize, seed: u64) -> Self {
        Self {
            point_count,
            blob_count: 4,
            radius: 1.0,
            separation: 6.0,
            noise_fraction: 0.05,
            seed,
        }
    }
}

/// Generates the cloud described by `config`.
///
/// # Errors
/// Returns [`BenchSetupError::InvalidConfig`] for zero blobs, a noise
/// fraction outside `[0, 1)` or a non-positive radius.
///
/// # Examples
/// ```
/// use tridbscan_benches::source::{BlobConfig, generate};
///
/// let cloud = generate(&BlobConfig::separated(200, 7))?;
/// assert_eq!(cloud.len(), 200);
/// # Ok::<(), tridbscan_benches::error::BenchSetupError>(())
/// ```
pub fn generate(config: &BlobConfig) -> Result<PointSet, BenchSetupError> {
    if config.blob_count == 0 {
        return Err(BenchSetupError::InvalidConfig {
            reason: "blob_count must be positive",
        });
    }
    if !(0.0..1.0).contains(&config.noise_fraction) {
        return Err(BenchSetupError::InvalidConfig {
            reason: "noise_fraction must lie in [0, 1)",
        });
    }
    if !config.radius.is_finite() || config.radius <= 0.0 {
        return Err(BenchSetupError::InvalidConfig {
            reason: "radius must be positive",
        });
    }

    let mut rng = SmallRng::seed_from_u64(config.seed);
    let noise = (config.point_count as f64 * config.noise_fraction).round() as usize;
    let extent = config.separation + 2.0 * config.radius;
    let coords: Vec<(f64, f64)> = (0..config.point_count)
        .map(|i| {
            if i < noise {
                return (rng.gen_range(-extent..extent), rng.gen_range(-extent..extent));
            }
            let blob = (i - noise) % config.blob_count;
            let angle = TAU * blob as f64 / config.blob_count as f64;
            let (cx, cy) = (config.separation * angle.cos(), config.separation * angle.sin());
            let r = config.radius * rng.r#gen::<f64>().sqrt();
            let theta = rng.gen_range(0.0..TAU);
            (cx + r * theta.cos(), cy + r * theta.sin())
        })
        .collect();
    Ok(PointSet::from_coordinates("synthetic", &coords)?)
}
