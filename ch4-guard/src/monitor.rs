//! Site monitoring: ties sources, classifier, reports and the alert log together.
//!
//! [`SiteMonitor`] holds only configuration. Every call receives the data it
//! works on, so one monitor can serve any number of sites.
//!
//! # Examples
//!
//! ```rust
//! use ch4_guard::config::MonitorConfig;
//! use ch4_guard::model::{HistoricalSeries, Measurement, Site};
//! use ch4_guard::monitor::SiteMonitor;
//!
//! let monitor = SiteMonitor::new(MonitorConfig::default())?;
//! let site = Site::new("Hassi R'mel", 32.93, 3.30)?;
//! let reading = Measurement::new(site, 1905.0, chrono::Utc::now())?;
//! let series = HistoricalSeries::new(vec![1880.0, 1890.0, 1900.0, 1910.0])?;
//!
//! let report = monitor.analyze(reading, &series, None)?;
//! assert!(!monitor.should_alert(report.assessment.tier));
//! # Ok::<(), ch4_guard::error::GuardError>(())
//! ```

use chrono::{DateTime, Utc};
use tracing::{instrument, warn};

use crate::acquisition::MeasurementProvider;
use crate::alert_log::{AlertLog, AlertRecord};
use crate::attribution::FlareAttribution;
use crate::classifier::{assess, RiskTier};
use crate::config::MonitorConfig;
use crate::error::{GuardError, Result};
use crate::logging::{truncate_field, LogConfig};
use crate::model::{HistoricalSeries, Measurement, Site};
use crate::report::SiteReport;
use crate::sources::{CsvHistoryOptions, CsvHistorySource, HistorySource};
use crate::{log_assessment, log_data_op, perf_debug};

/// Runs assessments with a fixed configuration.
#[derive(Debug, Clone)]
pub struct SiteMonitor {
    config: MonitorConfig,
    log_config: LogConfig,
}

impl SiteMonitor {
    /// Creates a monitor after validating `config`.
    pub fn new(config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            log_config: LogConfig::default(),
        })
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn log_config(&self) -> &LogConfig {
        &self.log_config
    }

    /// The alert log at the configured path.
    pub fn alert_log(&self) -> AlertLog {
        AlertLog::new(&self.config.alert_log_path)
    }

    /// Looks a configured site up by name.
    pub fn site(&self, name: &str) -> Result<&Site> {
        self.config.sites.require(name)
    }

    /// Loads a historical CSV, locating the CH4 column with the configured
    /// pattern and converting from the configured history unit to ppb.
    pub async fn load_history(&self, path: &str) -> Result<HistoricalSeries> {
        let options = CsvHistoryOptions {
            column_pattern: self.config.ch4_column_pattern.clone(),
            unit: self.config.history_unit,
            ..CsvHistoryOptions::default()
        };
        let source = CsvHistorySource::with_options(path, options)?;
        self.load_from(&source).await
    }

    /// Loads a series from any source.
    pub async fn load_from(&self, source: &dyn HistorySource) -> Result<HistoricalSeries> {
        let series = source.load().await?;
        log_data_op!(
            self.log_config,
            source = %truncate_field(&source.description(), self.log_config.max_field_length),
            points = series.len(),
            "Loaded historical series"
        );
        Ok(series)
    }

    /// Latest reading for `site` within the configured lookback window.
    pub async fn latest_measurement(
        &self,
        provider: &dyn MeasurementProvider,
        site: &Site,
        as_of: DateTime<Utc>,
    ) -> Result<Option<Measurement>> {
        let latest = provider
            .latest(site, as_of, self.config.lookback_days)
            .await?;
        if latest.is_none() {
            warn!(
                provider = provider.name(),
                site = %site.name,
                lookback_days = self.config.lookback_days,
                "No usable reading in lookback window"
            );
        }
        Ok(latest)
    }

    /// Assesses `measurement` against `series` and builds the site report.
    ///
    /// Fails with [`GuardError::DegenerateSeries`] when the series is shorter
    /// than `min_history_points` or has no spread.
    #[instrument(skip_all, fields(site = %measurement.site().name))]
    pub fn analyze(
        &self,
        measurement: Measurement,
        series: &HistoricalSeries,
        attribution: Option<FlareAttribution>,
    ) -> Result<SiteReport> {
        if series.len() < self.config.min_history_points {
            return Err(GuardError::degenerate_series(
                series.len(),
                format!(
                    "at least {} historical points are required",
                    self.config.min_history_points
                ),
            ));
        }

        let assessment = assess(&measurement, series, &self.config.thresholds)?;
        log_assessment!(
            self.log_config,
            mean = assessment.baseline.mean,
            std_dev = assessment.baseline.std_dev,
            points = assessment.baseline.count,
            "Baseline statistics"
        );

        let mut report = SiteReport::new(measurement, assessment);
        if let Some(attribution) = attribution {
            report = report.with_attribution(attribution);
        }
        Ok(report)
    }

    /// Whether `tier` is high enough to be written to the alert log.
    pub fn should_alert(&self, tier: RiskTier) -> bool {
        tier >= self.config.alert_min_tier
    }

    /// Appends `report` to `log` when its tier warrants an alert.
    ///
    /// Returns the written record, or `None` when no alert was due.
    pub fn record_alert(&self, report: &SiteReport, log: &AlertLog) -> Result<Option<AlertRecord>> {
        if !self.should_alert(report.assessment.tier) {
            perf_debug!(
                self.log_config,
                tier = %report.assessment.tier,
                min_tier = %self.config.alert_min_tier,
                "Below alert tier, nothing logged"
            );
            return Ok(None);
        }
        let record = AlertRecord::new(&report.measurement, &report.assessment, report.generated_at);
        log.append(&record)?;
        log_data_op!(
            self.log_config,
            site = %record.site,
            risk = %record.risk,
            path = %truncate_field(&log.path().display().to_string(), self.log_config.max_field_length),
            "Recorded alert"
        );
        Ok(Some(record))
    }
}
