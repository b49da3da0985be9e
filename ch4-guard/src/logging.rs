//! Logging configuration for CH4 monitoring.
//!
//! [`LogConfig`] controls how chatty the monitor is about its own work
//! (history loads, alert writes, per-assessment details). [`setup`] installs
//! a `tracing` subscriber for binaries and demos.

use tracing::Level;

/// Runtime logging switches for the monitor.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for monitor components
    pub base_level: Level,
    /// Whether to log baseline statistics for every assessment
    pub log_assessment_details: bool,
    /// Whether to log history loads and alert log writes
    pub log_data_operations: bool,
    /// Maximum length for logged field values such as file paths
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_assessment_details: false,
            log_data_operations: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Everything, at debug level.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_assessment_details: true,
            log_data_operations: true,
            max_field_length: 1024,
        }
    }
}

/// Debug logging that is skipped entirely below the configured level.
#[macro_export]
macro_rules! perf_debug {
    ($config:expr, $($arg:tt)*) => {
        if $config.base_level >= tracing::Level::DEBUG {
            tracing::debug!($($arg)*);
        }
    };
}

/// Logs assessment internals when enabled.
#[macro_export]
macro_rules! log_assessment {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_assessment_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Logs history loads and alert writes when enabled.
#[macro_export]
macro_rules! log_data_op {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_data_operations {
            tracing::info!($($arg)*);
        }
    };
}

/// Truncates a string to at most `max_length` bytes, on a char boundary.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Subscriber installation for binaries and demos.
pub mod setup {
    use tracing::Level;

    /// Subscriber settings.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for dependencies
        pub level: Level,
        /// Log level for `ch4_guard` itself
        pub guard_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Write to stderr so stdout stays clean for reports
        pub use_stderr: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::WARN,
                guard_level: Level::INFO,
                json_format: false,
                use_stderr: true,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                filter.clone()
            } else {
                format!(
                    "{},ch4_guard={},ch4_watch={}",
                    self.level.as_str().to_lowercase(),
                    self.guard_level.as_str().to_lowercase(),
                    self.guard_level.as_str().to_lowercase()
                )
            }
        }
    }

    /// Installs the global subscriber. `RUST_LOG` wins over the configured
    /// filter when set.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use ch4_guard::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::default().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = match (config.json_format, config.use_stderr) {
            (true, true) => tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed(),
            (true, false) => tracing_subscriber::fmt::layer().json().boxed(),
            (false, true) => tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed(),
            (false, false) => tracing_subscriber::fmt::layer().boxed(),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::setup::LoggingConfig;
    use super::*;

    #[test]
    fn test_log_config_presets() {
        let config = LogConfig::default();
        assert_eq!(config.base_level, Level::INFO);
        assert!(!config.log_assessment_details);
        assert!(config.log_data_operations);

        let verbose = LogConfig::verbose();
        assert_eq!(verbose.base_level, Level::DEBUG);
        assert!(verbose.log_assessment_details);
        assert_eq!(verbose.max_field_length, 1024);
    }

    #[test]
    fn test_truncate_field() {
        assert_eq!(truncate_field("hello", 10), "hello");
        assert_eq!(
            truncate_field("this is a very long text", 10),
            "this is a ...(truncated)"
        );
        // 'é' is two bytes; never split it.
        assert_eq!(truncate_field("ééé", 3), "é...(truncated)");
    }

    #[test]
    fn test_env_filter() {
        let config = LoggingConfig::default().with_json_format(true);
        assert!(config.json_format);
        assert_eq!(config.env_filter(), "warn,ch4_guard=info,ch4_watch=info");
        let custom = LoggingConfig {
            env_filter: Some("ch4_guard=trace".to_string()),
            ..LoggingConfig::default()
        };
        assert_eq!(custom.env_filter(), "ch4_guard=trace");
    }
}
