//! Baseline statistics and the standardized score.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{GuardError, Result};
use crate::model::HistoricalSeries;

/// Relative tolerance below which a standard deviation counts as zero.
const EPSILON: f64 = 1e-10;

/// Minimum number of points for a sample standard deviation.
pub const MIN_SERIES_POINTS: usize = 2;

/// Mean and sample standard deviation of a historical series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineStats {
    /// Number of values the baseline was computed from.
    pub count: usize,
    /// Arithmetic mean, ppb.
    pub mean: f64,
    /// Sample standard deviation (denominator `n - 1`), ppb.
    pub std_dev: f64,
}

impl BaselineStats {
    /// Computes the baseline of `series`.
    ///
    /// Uses the sample standard deviation (`n - 1`). Fails with
    /// [`GuardError::DegenerateSeries`] when the series has fewer than
    /// [`MIN_SERIES_POINTS`] values or its standard deviation is zero. A
    /// standard deviation within `1e-10 * max(1, |mean|)` of zero is treated
    /// as zero.
    pub fn from_series(series: &HistoricalSeries) -> Result<Self> {
        let values = series.values();
        let count = values.len();
        if count < MIN_SERIES_POINTS {
            return Err(GuardError::degenerate_series(
                count,
                format!("at least {MIN_SERIES_POINTS} values are required"),
            ));
        }

        let mean = values.iter().sum::<f64>() / count as f64;
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        let std_dev = variance.sqrt();

        if !mean.is_finite() || !std_dev.is_finite() {
            return Err(GuardError::degenerate_series(
                count,
                format!("baseline statistics overflow (mean {mean}, std dev {std_dev})"),
            ));
        }
        if std_dev <= EPSILON * mean.abs().max(1.0) {
            return Err(GuardError::degenerate_series(
                count,
                format!("standard deviation is zero (all values ≈ {mean})"),
            ));
        }

        Ok(Self {
            count,
            mean,
            std_dev,
        })
    }

    /// Standardized deviation of `value` from this baseline.
    pub fn z_score(&self, value: f64) -> f64 {
        (value - self.mean) / self.std_dev
    }

    /// Like [`z_score`](Self::z_score), but fails with
    /// [`GuardError::InvalidMeasurement`] unless both `value` and the score
    /// are finite.
    pub fn checked_z_score(&self, value: f64) -> Result<f64> {
        if !value.is_finite() {
            return Err(GuardError::invalid_measurement(format!(
                "value to score must be finite, got {value}"
            )));
        }
        let z = self.z_score(value);
        if !z.is_finite() {
            return Err(GuardError::invalid_measurement(format!(
                "score of {value} against mean {} and std dev {} is not finite",
                self.mean, self.std_dev
            )));
        }
        Ok(z)
    }
}

/// Computes `z = (value - mean(series)) / stddev(series)`.
///
/// The standard deviation is the sample one (`n - 1`). See
/// [`BaselineStats::from_series`] for the failure conditions; a non-finite
/// `value` fails with [`GuardError::InvalidMeasurement`].
///
/// ```rust
/// use ch4_guard::classifier::score;
/// use ch4_guard::model::HistoricalSeries;
///
/// let series = HistoricalSeries::new(vec![90.0, 95.0, 100.0, 105.0, 110.0]).unwrap();
/// let z = score(125.0, &series).unwrap();
/// assert!((z - 3.162).abs() < 1e-3);
/// ```
#[instrument(skip(series), fields(points = series.len()))]
pub fn score(value: f64, series: &HistoricalSeries) -> Result<f64> {
    let baseline = BaselineStats::from_series(series)?;
    let z = baseline.checked_z_score(value)?;
    debug!(
        mean = baseline.mean,
        std_dev = baseline.std_dev,
        z_score = z,
        "Computed standardized score"
    );
    Ok(z)
}
