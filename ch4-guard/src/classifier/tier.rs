//! Risk tiers and the z-score to tier mapping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};

/// Discrete risk classification, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    #[default]
    Normal,
    Anomalous,
    Critical,
}

impl RiskTier {
    /// Recommended operator action for this tier.
    pub fn action(self) -> &'static str {
        match self {
            Self::Normal => "Continuous monitoring",
            Self::Anomalous => "Field inspection required",
            Self::Critical => "Immediate inspection and alert",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Anomalous => "Anomalous",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "anomalous" => Ok(Self::Anomalous),
            "critical" => Ok(Self::Critical),
            other => Err(GuardError::Parse(format!("unknown risk tier '{other}'"))),
        }
    }
}

/// Lower bounds of the Anomalous and Critical tiers.
///
/// Each bound is exclusive: a score equal to `anomalous` is still Normal and
/// a score equal to `critical` is still Anomalous.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    pub anomalous: f64,
    pub critical: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            anomalous: 2.0,
            critical: 3.0,
        }
    }
}

impl ClassifierThresholds {
    /// Creates validated thresholds.
    pub fn new(anomalous: f64, critical: f64) -> Result<Self> {
        let thresholds = Self {
            anomalous,
            critical,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Both bounds must be finite and `anomalous < critical`.
    pub fn validate(&self) -> Result<()> {
        if !self.anomalous.is_finite() || !self.critical.is_finite() {
            return Err(GuardError::invalid_config(format!(
                "thresholds must be finite, got anomalous={} critical={}",
                self.anomalous, self.critical
            )));
        }
        if self.anomalous >= self.critical {
            return Err(GuardError::invalid_config(format!(
                "anomalous threshold ({}) must be below critical threshold ({})",
                self.anomalous, self.critical
            )));
        }
        Ok(())
    }

    /// Maps a score to its tier. Negative scores are Normal.
    pub fn tier_for(&self, z: f64) -> RiskTier {
        if z > self.critical {
            RiskTier::Critical
        } else if z > self.anomalous {
            RiskTier::Anomalous
        } else {
            RiskTier::Normal
        }
    }
}

/// Classifies `z` with the default 2/3 thresholds.
///
/// ```rust
/// use ch4_guard::classifier::{classify, RiskTier};
///
/// assert_eq!(classify(2.0).0, RiskTier::Normal);
/// assert_eq!(classify(3.0).0, RiskTier::Anomalous);
/// assert_eq!(classify(3.0001), (RiskTier::Critical, "Immediate inspection and alert"));
/// ```
pub fn classify(z: f64) -> (RiskTier, &'static str) {
    classify_with(z, &ClassifierThresholds::default())
}

/// Classifies `z` with caller-supplied thresholds.
pub fn classify_with(z: f64, thresholds: &ClassifierThresholds) -> (RiskTier, &'static str) {
    let tier = thresholds.tier_for(z);
    (tier, tier.action())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(classify(2.0).0, RiskTier::Normal);
        assert_eq!(classify(2.0001).0, RiskTier::Anomalous);
        assert_eq!(classify(3.0).0, RiskTier::Anomalous);
        assert_eq!(classify(3.0001).0, RiskTier::Critical);
    }

    #[test]
    fn test_actions() {
        assert_eq!(classify(0.5).1, "Continuous monitoring");
        assert_eq!(classify(2.5).1, "Field inspection required");
        assert_eq!(classify(7.0).1, "Immediate inspection and alert");
    }

    #[test]
    fn test_negative_scores_are_normal() {
        assert_eq!(classify(-10.0).0, RiskTier::Normal);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = ClassifierThresholds::new(1.5, 2.5).unwrap();
        assert_eq!(classify_with(1.6, &thresholds).0, RiskTier::Anomalous);
        assert_eq!(classify_with(2.6, &thresholds).0, RiskTier::Critical);
    }

    #[test]
    fn test_invalid_thresholds() {
        assert!(ClassifierThresholds::new(3.0, 2.0).is_err());
        assert!(ClassifierThresholds::new(2.0, 2.0).is_err());
        assert!(ClassifierThresholds::new(f64::NAN, 3.0).is_err());
    }

    #[test]
    fn test_tier_ordering_and_parse() {
        assert!(RiskTier::Normal < RiskTier::Anomalous);
        assert!(RiskTier::Anomalous < RiskTier::Critical);
        assert_eq!("CRITICAL".parse::<RiskTier>().unwrap(), RiskTier::Critical);
        assert!("severe".parse::<RiskTier>().is_err());
    }
}
