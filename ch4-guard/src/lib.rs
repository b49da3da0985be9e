//! # ch4-guard - Methane site monitoring
//!
//! ch4-guard classifies satellite methane (CH4) readings over industrial sites
//! against each site's own history. A reading is scored as a z-score against
//! the mean and sample standard deviation of the historical series, then
//! mapped to a risk tier and a recommended action:
//!
//! | z-score         | tier      | action                         |
//! |-----------------|-----------|--------------------------------|
//! | z > 3           | Critical  | Immediate inspection and alert |
//! | 2 < z <= 3      | Anomalous | Field inspection required      |
//! | otherwise       | Normal    | Continuous monitoring          |
//!
//! ## Quick Start
//!
//! ```rust
//! use ch4_guard::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let monitor = SiteMonitor::new(MonitorConfig::default())?;
//! let site = monitor.site("Hassi R'mel")?.clone();
//!
//! let reading = Measurement::from_unit(site, 1.962, ConcentrationUnit::Ppm, chrono::Utc::now())?;
//! let series = HistoricalSeries::new(vec![1880.0, 1890.0, 1900.0, 1910.0])?;
//!
//! let report = monitor.analyze(reading, &series, Some(FlareAttribution::from_count(2)))?;
//! assert_eq!(report.assessment.tier, RiskTier::Critical);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`classifier`**: scoring and tier mapping, pure and synchronous
//! - **`model`** and **`units`**: sites, ppb measurements, historical series
//! - **`sources`**: historical series loaders (CSV through DataFusion, memory)
//! - **`acquisition`**: latest-reading selection and the provider seam
//! - **`attribution`**: flare-count source labels
//! - **`alert_log`**: append-only CSV log of alerts
//! - **`report`**: human, Markdown and JSON site reports
//! - **`monitor`**: [`SiteMonitor`](monitor::SiteMonitor), which wires the above together
//! - **`config`**, **`sites`**, **`logging`**, **`error`**: the supporting pieces

pub mod acquisition;
pub mod alert_log;
pub mod attribution;
pub mod classifier;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod monitor;
pub mod prelude;
pub mod report;
pub mod sites;
pub mod sources;
pub mod units;
