//! Error types for the ch4-guard monitoring library.
//!
//! All fallible operations in the crate return [`GuardError`] through the
//! [`Result`] alias. The classifier itself only ever produces
//! [`GuardError::DegenerateSeries`] and [`GuardError::InvalidMeasurement`];
//! the remaining variants belong to the collaborators around it (history
//! sources, the alert log, report export and configuration).

use thiserror::Error;

/// The main error type for ch4-guard.
#[derive(Error, Debug)]
pub enum GuardError {
    /// The historical series cannot produce a standardized score: too few
    /// points, or zero variance.
    #[error("Degenerate historical series ({points} points): {reason}")]
    DegenerateSeries {
        /// Number of usable points in the series
        points: usize,
        /// Why the series was rejected
        reason: String,
    },

    /// A measurement value or site coordinate is not usable.
    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(String),

    /// Invalid thresholds, paths or other settings.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// No column in the historical dataset matched the CH4 pattern.
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Error from a history or measurement source.
    #[error("Data source error: {message}")]
    DataSource {
        /// Type of data source (e.g., "CSV", "InMemory")
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error when parsing text input (units, tiers, timestamps, config).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, GuardError>`.
///
/// # Examples
///
/// ```rust
/// use ch4_guard::error::{GuardError, Result};
///
/// fn require_points(n: usize) -> Result<()> {
///     if n < 2 {
///         return Err(GuardError::degenerate_series(n, "need at least two points"));
///     }
///     Ok(())
/// }
/// assert!(require_points(1).is_err());
/// ```
pub type Result<T> = std::result::Result<T, GuardError>;

impl GuardError {
    /// Creates a degenerate series error.
    pub fn degenerate_series(points: usize, reason: impl Into<String>) -> Self {
        Self::DegenerateSeries {
            points,
            reason: reason.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates an invalid measurement error.
    pub fn invalid_measurement(msg: impl Into<String>) -> Self {
        Self::InvalidMeasurement(msg.into())
    }

    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new data source error with a source error.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Returns true for the classifier's degenerate-series error.
    pub fn is_degenerate_series(&self) -> bool {
        matches!(self, Self::DegenerateSeries { .. })
    }
}

impl From<serde_json::Error> for GuardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for GuardError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<std::fmt::Error> for GuardError {
    fn from(err: std::fmt::Error) -> Self {
        Self::Internal(format!("Failed to format output: {err}"))
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<GuardError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| wrap(msg, e.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| wrap(&f(), e.into()))
    }
}

// Degenerate series keep their variant so callers can still match on them.
fn wrap(msg: &str, err: GuardError) -> GuardError {
    match err {
        GuardError::DegenerateSeries { points, reason } => GuardError::DegenerateSeries {
            points,
            reason: format!("{msg}: {reason}"),
        },
        GuardError::Internal(inner) => GuardError::Internal(format!("{msg}: {inner}")),
        other => GuardError::Internal(format!("{msg}: {other}")),
    }
}
