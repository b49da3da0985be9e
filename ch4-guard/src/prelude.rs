//! Prelude for commonly used types and traits in ch4-guard.

pub use crate::acquisition::{MeasurementProvider, Observation};
pub use crate::alert_log::{AlertLog, AlertRecord};
pub use crate::attribution::FlareAttribution;
pub use crate::classifier::{assess, classify, score, ClassifierThresholds, RiskAssessment, RiskTier};
pub use crate::config::MonitorConfig;
pub use crate::error::{ErrorContext, GuardError, Result};
pub use crate::logging::LogConfig;
pub use crate::model::{HistoricalSeries, Measurement, Site};
pub use crate::monitor::SiteMonitor;
pub use crate::report::{FormatterConfig, ReportFormat, ReportFormatter, SiteReport};
pub use crate::sources::HistorySource;
pub use crate::units::ConcentrationUnit;
