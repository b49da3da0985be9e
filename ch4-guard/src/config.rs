//! Monitoring configuration.
//!
//! Configuration is plain data passed explicitly to
//! [`SiteMonitor`](crate::monitor::SiteMonitor); there is no global state. It
//! can be built in code with the `with_*` methods or loaded from TOML:
//!
//! ```toml
//! lookback_days = 90
//! history_unit = "ppm"
//! alert_log_path = "alerts_hse.csv"
//! alert_min_tier = "anomalous"
//!
//! [thresholds]
//! anomalous = 2.0
//! critical = 3.0
//!
//! [[sites]]
//! name = "Hassi R'mel"
//! latitude = 32.93
//! longitude = 3.30
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::acquisition::{DEFAULT_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS};
use crate::classifier::{ClassifierThresholds, RiskTier, MIN_SERIES_POINTS};
use crate::error::{ErrorContext, GuardError, Result};
use crate::sites::SiteRegistry;
use crate::sources::DEFAULT_CH4_COLUMN_PATTERN;
use crate::units::ConcentrationUnit;

/// Default alert log file name.
pub const DEFAULT_ALERT_LOG: &str = "alerts_hse.csv";

/// Settings for a monitoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Tier boundaries for the classifier
    pub thresholds: ClassifierThresholds,
    /// Minimum historical points before a score is computed
    pub min_history_points: usize,
    /// Window, in days, searched for the latest reading
    pub lookback_days: i64,
    /// Pattern locating the CH4 column in historical CSV files
    pub ch4_column_pattern: String,
    /// Unit of the values in historical CSV files
    pub history_unit: ConcentrationUnit,
    /// Append-only alert log
    pub alert_log_path: PathBuf,
    /// Lowest tier that produces an alert row
    pub alert_min_tier: RiskTier,
    /// Monitored sites
    pub sites: SiteRegistry,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            thresholds: ClassifierThresholds::default(),
            min_history_points: MIN_SERIES_POINTS,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            ch4_column_pattern: DEFAULT_CH4_COLUMN_PATTERN.to_string(),
            history_unit: ConcentrationUnit::Ppb,
            alert_log_path: PathBuf::from(DEFAULT_ALERT_LOG),
            alert_min_tier: RiskTier::Anomalous,
            sites: SiteRegistry::default(),
        }
    }
}

impl MonitorConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Reading config file {}", path.display()))?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), sites = config.sites.len(), "Loaded configuration");
        Ok(config)
    }

    /// Serializes the configuration back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GuardError::Serialization(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        if self.min_history_points < MIN_SERIES_POINTS {
            return Err(GuardError::invalid_config(format!(
                "min_history_points must be at least {MIN_SERIES_POINTS}, got {}",
                self.min_history_points
            )));
        }
        if !(1..=MAX_LOOKBACK_DAYS).contains(&self.lookback_days) {
            return Err(GuardError::invalid_config(format!(
                "lookback_days must be between 1 and {MAX_LOOKBACK_DAYS}, got {}",
                self.lookback_days
            )));
        }
        if self.alert_log_path.as_os_str().is_empty() {
            return Err(GuardError::invalid_config("alert_log_path cannot be empty"));
        }
        self.sites.validate()
    }

    pub fn with_thresholds(mut self, thresholds: ClassifierThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_min_history_points(mut self, points: usize) -> Self {
        self.min_history_points = points;
        self
    }

    pub fn with_lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn with_history_unit(mut self, unit: ConcentrationUnit) -> Self {
        self.history_unit = unit;
        self
    }

    pub fn with_alert_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.alert_log_path = path.into();
        self
    }

    pub fn with_alert_min_tier(mut self, tier: RiskTier) -> Self {
        self.alert_min_tier = tier;
        self
    }

    pub fn with_sites(mut self, sites: SiteRegistry) -> Self {
        self.sites = sites;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = MonitorConfig::default();
        config.validate().unwrap();
        assert_eq!(config.lookback_days, 90);
        assert_eq!(config.alert_log_path, PathBuf::from("alerts_hse.csv"));
        assert_eq!(config.alert_min_tier, RiskTier::Anomalous);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = MonitorConfig::from_toml_str(
            r#"
            alert_min_tier = "critical"
            history_unit = "mole-fraction"

            [thresholds]
            anomalous = 1.5
            "#,
        )
        .unwrap();
        assert_eq!(config.alert_min_tier, RiskTier::Critical);
        assert_eq!(config.history_unit, ConcentrationUnit::MoleFraction);
        assert_eq!(config.thresholds.anomalous, 1.5);
        assert_eq!(config.thresholds.critical, 3.0);
        assert_eq!(config.sites.len(), 2);
    }

    #[test]
    fn test_sites_from_toml() {
        let config = MonitorConfig::from_toml_str(
            r#"
            [[sites]]
            name = "Tin Fouye"
            latitude = 28.2
            longitude = 7.1
            "#,
        )
        .unwrap();
        assert_eq!(config.sites.len(), 1);
        assert!(config.sites.get("Tin Fouye").is_some());
    }

    #[test]
    fn test_invalid_values() {
        assert!(MonitorConfig::from_toml_str("min_history_points = 1").is_err());
        assert!(MonitorConfig::from_toml_str("lookback_days = 0").is_err());
        assert!(MonitorConfig::from_toml_str("lookback_days = 9000000000000000").is_err());
        assert!(MonitorConfig::from_toml_str("lookback_days = 36500").is_ok());
        assert!(MonitorConfig::from_toml_str("[thresholds]\nanomalous = 4.0").is_err());
        assert!(MonitorConfig::from_toml_str("lookback_days = \"ninety\"").is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = MonitorConfig::default().with_lookback_days(30);
        let text = config.to_toml_string().unwrap();
        assert_eq!(MonitorConfig::from_toml_str(&text).unwrap(), config);
    }
}
