//! Bivariate Gaussian kernel density estimation.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::DensityEstimator;
use crate::{error::DensityError, point::PointSet};

/// Gaussian KDE over point coordinates with a Scott's-rule bandwidth.
///
/// The kernel covariance is the sample covariance (n - 1 denominator)
/// scaled by `n^(-1/3)`, the square of Scott's factor for two dimensions.
/// The estimate is evaluated at every input point.
///
/// # Examples
/// ```
/// use tridbscan_core::{DensityEstimator, GaussianKde, PointSet};
///
/// let set = PointSet::from_coordinates(
///     "demo",
///     &[(0.0, 0.0), (0.1, 0.0), (0.0, 0.1), (0.1, 0.1), (5.0, 5.0)],
/// )?;
/// let densities = GaussianKde::default().estimate(&set)?;
/// assert_eq!(densities.len(), 5);
/// assert!(densities[0] > densities[4]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GaussianKde;

/// Inverse bandwidth matrix and normalisation for one fitted estimate.
#[derive(Clone, Copy, Debug)]
struct Kernel {
    inv_xx: f64,
    inv_xy: f64,
    inv_yy: f64,
    norm: f64,
}

impl Kernel {
    fn fit(coords: &[[f64; 2]]) -> Result<Self, DensityError> {
        let count = coords.len() as f64;
        let mean_x = coords.iter().map(|c| c[0]).sum::<f64>() / count;
        let mean_y = coords.iter().map(|c| c[1]).sum::<f64>() / count;
        let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
        for c in coords {
            let (dx, dy) = (c[0] - mean_x, c[1] - mean_y);
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }

        let scale = count.powf(-1.0 / 3.0) / (count - 1.0);
        let (hxx, hxy, hyy) = (sxx * scale, sxy * scale, syy * scale);
        let determinant = hxx * hyy - hxy * hxy;
        if !determinant.is_finite() || determinant <= 0.0 {
            return Err(DensityError::SingularCovariance { determinant });
        }

        Ok(Self {
            inv_xx: hyy / determinant,
            inv_xy: -hxy / determinant,
            inv_yy: hxx / determinant,
            norm: 1.0 / (2.0 * std::f64::consts::PI * determinant.sqrt() * count),
        })
    }

    fn evaluate(&self, coords: &[[f64; 2]], at: [f64; 2]) -> f64 {
        let sum: f64 = coords
            .iter()
            .map(|c| {
                let (dx, dy) = (at[0] - c[0], at[1] - c[1]);
                let quad = dx * dx * self.inv_xx + 2.0 * dx * dy * self.inv_xy + dy * dy * self.inv_yy;
                (-0.5 * quad).exp()
            })
            .sum();
        sum * self.norm
    }
}

impl DensityEstimator for GaussianKde {
    fn estimate(&self, points: &PointSet) -> Result<Vec<f64>, DensityError> {
        if points.len() < 3 {
            return Err(DensityError::InsufficientPoints {
                points: points.len(),
            });
        }
        let coords: Vec<[f64; 2]> = points
            .points()
            .iter()
            .map(|point| [point.x(), point.y()])
            .collect();
        let kernel = Kernel::fit(&coords)?;

        #[cfg(feature = "parallel")]
        let values: Vec<f64> = coords
            .par_iter()
            .map(|&at| kernel.evaluate(&coords, at))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let values: Vec<f64> = coords
            .iter()
            .map(|&at| kernel.evaluate(&coords, at))
            .collect();

        match values.iter().enumerate().find(|(_, value)| !value.is_finite()) {
            Some((index, &value)) => Err(DensityError::NonFinite { index, value }),
            None => Ok(values),
        }
    }
}
