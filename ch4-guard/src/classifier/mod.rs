//! Anomaly classifier for methane readings.
//!
//! Given a new reading and the historical series of the same site, the
//! classifier computes a standardized score and maps it to a risk tier and a
//! recommended action.
//!
//! ## Rule
//!
//! | condition      | tier      | action                         |
//! |----------------|-----------|--------------------------------|
//! | z > 3          | Critical  | Immediate inspection and alert |
//! | 2 < z ≤ 3      | Anomalous | Field inspection required      |
//! | z ≤ 2          | Normal    | Continuous monitoring          |
//!
//! Scores use the sample standard deviation (`n - 1`). Every call is a pure
//! computation over its own arguments.
//!
//! ## Example
//!
//! ```rust
//! use ch4_guard::classifier::{classify, score, RiskTier};
//! use ch4_guard::model::HistoricalSeries;
//!
//! let series = HistoricalSeries::new(vec![90.0, 95.0, 100.0, 105.0, 110.0])?;
//! let z = score(125.0, &series)?;
//! let (tier, action) = classify(z);
//! assert_eq!(tier, RiskTier::Critical);
//! println!("z = {z:.2}: {action}");
//! # Ok::<(), ch4_guard::error::GuardError>(())
//! ```

mod assessment;
mod stats;
mod tier;

pub use assessment::{assess, assess_value, RiskAssessment};
pub use stats::{score, BaselineStats, MIN_SERIES_POINTS};
pub use tier::{classify, classify_with, ClassifierThresholds, RiskTier};
