//! Mean and standard deviation summaries used by the statistical thresholds.

/// Degrees of freedom removed from the sample count when computing the
/// standard deviation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Ddof {
    /// Divide by `n` (population standard deviation).
    Population,
    /// Divide by `n - 1` (sample standard deviation).
    Sample,
}

/// Mean and standard deviation of a sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Summary {
    pub(crate) mean: f64,
    pub(crate) std: f64,
}

impl Summary {
    /// Summarises `values`, returning `None` when the requested degrees of
    /// freedom leave nothing to divide by.
    pub(crate) fn of(values: &[f64], ddof: Ddof) -> Option<Self> {
        let count = values.len();
        let divisor = match ddof {
            Ddof::Population => count,
            Ddof::Sample => count.checked_sub(1)?,
        };
        if count == 0 || divisor == 0 {
            return None;
        }
        let mean = values.iter().sum::<f64>() / count as f64;
        let squares = values
            .iter()
            .map(|value| {
                let delta = value - mean;
                delta * delta
            })
            .sum::<f64>();
        Some(Self {
            mean,
            std: (squares / divisor as f64).sqrt(),
        })
    }

    /// Returns whether `value` lies strictly beyond `mean + k * std`.
    pub(crate) fn exceeds(&self, value: f64, k: f64) -> bool {
        value - self.mean > k * self.std
    }

    /// The cut-off `mean + k * std`.
    pub(crate) fn threshold(&self, k: f64) -> f64 {
        self.mean + k * self.std
    }
}
