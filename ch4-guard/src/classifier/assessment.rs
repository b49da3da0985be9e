//! Risk assessment of one measurement against its baseline.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::stats::BaselineStats;
use super::tier::{ClassifierThresholds, RiskTier};
use crate::error::Result;
use crate::model::{HistoricalSeries, Measurement};

/// The `(score, tier, action)` triple, plus the baseline it came from.
///
/// Derived on every request and never stored by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: f64,
    pub tier: RiskTier,
    pub action: String,
    pub baseline: BaselineStats,
}

impl RiskAssessment {
    /// Whether the tier is above Normal.
    pub fn is_anomaly(&self) -> bool {
        self.tier > RiskTier::Normal
    }

    /// Short explanation of the score relative to the baseline.
    pub fn explanation(&self) -> String {
        format!(
            "Value is {:.2} standard deviations from the baseline mean of {:.2} ppb (std dev {:.2}, n={})",
            self.score, self.baseline.mean, self.baseline.std_dev, self.baseline.count
        )
    }
}

/// Scores `value_ppb` against `series` and classifies the result.
pub fn assess_value(
    value_ppb: f64,
    series: &HistoricalSeries,
    thresholds: &ClassifierThresholds,
) -> Result<RiskAssessment> {
    let baseline = BaselineStats::from_series(series)?;
    let score = baseline.checked_z_score(value_ppb)?;
    let tier = thresholds.tier_for(score);
    Ok(RiskAssessment {
        score,
        tier,
        action: tier.action().to_string(),
        baseline,
    })
}

/// Assesses a measurement against the historical series of its site.
#[instrument(skip(measurement, series, thresholds), fields(site = %measurement.site().name, value_ppb = measurement.value_ppb()))]
pub fn assess(
    measurement: &Measurement,
    series: &HistoricalSeries,
    thresholds: &ClassifierThresholds,
) -> Result<RiskAssessment> {
    let assessment = assess_value(measurement.value_ppb(), series, thresholds)?;
    info!(
        z_score = assessment.score,
        tier = %assessment.tier,
        "Assessed measurement"
    );
    Ok(assessment)
}
