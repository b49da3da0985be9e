//! ch4-watch - operator command line for ch4-guard
//!
//! Shared argument types and run logic for the `ch4-assess`, `ch4-alerts` and
//! `ch4-sites` binaries. Each binary parses its arguments, calls the matching
//! `run_*` function and prints the result; logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ch4_guard::alert_log::{AlertLog, AlertRecord};
use ch4_guard::attribution::FlareAttribution;
use ch4_guard::config::MonitorConfig;
use ch4_guard::logging::setup::{init_logging, LoggingConfig};
use ch4_guard::model::{HistoricalSeries, Measurement};
use ch4_guard::monitor::SiteMonitor;
use ch4_guard::report::{
    export_report, FormatterConfig, HumanFormatter, ReportFormat, ReportFormatter, SiteReport,
};
use ch4_guard::units::ConcentrationUnit;
use chrono::Utc;
use clap::Args;
use tracing::{info, warn};

/// Options shared by every binary.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// TOML configuration file (defaults apply when absent)
    #[arg(long, env = "CH4_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

/// Arguments of `ch4-assess`.
#[derive(Args, Debug, Clone)]
pub struct AssessArgs {
    /// Site name, as listed by `ch4-sites`
    #[arg(long)]
    pub site: String,

    /// Current reading; when omitted, the last value of the history is scored
    /// against the values before it
    #[arg(long)]
    pub value: Option<f64>,

    /// Unit of `--value`
    #[arg(long, default_value = "ppb", value_parser = parse_unit)]
    pub unit: ConcentrationUnit,

    /// Historical CSV file with a CH4 column
    #[arg(long)]
    pub history: String,

    /// Unit of the history's CH4 column (overrides the configuration)
    #[arg(long, value_parser = parse_unit)]
    pub history_unit: Option<ConcentrationUnit>,

    /// Number of active flares detected near the site
    #[arg(long)]
    pub flares: Option<u32>,

    /// Alert log path (overrides the configuration)
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Write the report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Format of the written report
    #[arg(long, default_value = "markdown", value_parser = parse_format)]
    pub format: ReportFormat,

    /// Disable colors in console output
    #[arg(long)]
    pub no_color: bool,
}

/// Arguments of `ch4-alerts`.
#[derive(Args, Debug, Clone)]
pub struct AlertsArgs {
    /// Alert log path (overrides the configuration)
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Print records as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_unit(s: &str) -> std::result::Result<ConcentrationUnit, String> {
    s.parse().map_err(|e: ch4_guard::error::GuardError| e.to_string())
}

fn parse_format(s: &str) -> std::result::Result<ReportFormat, String> {
    s.parse().map_err(|e: ch4_guard::error::GuardError| e.to_string())
}

/// Installs the log subscriber on stderr so stdout carries only command output.
pub fn init_tracing(common: &CommonArgs) -> Result<()> {
    init_logging(LoggingConfig::default().with_json_format(common.json_logs))
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}

/// Note attached to reports whose reading was taken from the history file.
pub const HISTORY_READING_NOTE: &str = "No reading was given, so the last history entry was scored \
     against the entries before it. Its observation time is unknown; the timestamp shown is the \
     assessment time.";

/// Loads the configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<MonitorConfig> {
    match path {
        Some(path) => MonitorConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(MonitorConfig::default()),
    }
}

/// Result of one `ch4-assess` run.
#[derive(Debug)]
pub struct AssessOutcome {
    pub report: SiteReport,
    pub alert: Option<AlertRecord>,
    pub exported: Option<PathBuf>,
}

/// Splits a history into the reading to score and the baseline before it.
fn split_latest(series: HistoricalSeries) -> Result<(f64, HistoricalSeries)> {
    let mut values = series.values().to_vec();
    let Some(latest) = values.pop() else {
        bail!("history is empty; pass --value to score a reading");
    };
    Ok((latest, HistoricalSeries::new(values)?))
}

/// Runs one assessment: load history, score, log the alert, export the report.
pub async fn run_assess(args: &AssessArgs, config: MonitorConfig) -> Result<AssessOutcome> {
    let config = match &args.log {
        Some(log) => config.with_alert_log_path(log),
        None => config,
    };
    let config = match args.history_unit {
        Some(unit) => config.with_history_unit(unit),
        None => config,
    };
    let monitor = SiteMonitor::new(config)?;
    let site = monitor.site(&args.site)?.clone();

    let history = monitor
        .load_history(&args.history)
        .await
        .with_context(|| format!("failed to load history from {}", args.history))?;

    let (measurement, series, from_history) = match args.value {
        Some(value) => (
            Measurement::from_unit(site, value, args.unit, Utc::now())?,
            history,
            false,
        ),
        None => {
            let (latest, baseline) = split_latest(history)?;
            warn!(value_ppb = latest, "No --value given, scoring the last history entry");
            (Measurement::new(site, latest, Utc::now())?, baseline, true)
        }
    };

    let attribution = args.flares.map(FlareAttribution::from_count);
    let mut report = monitor.analyze(measurement, &series, attribution)?;
    if from_history {
        report = report.with_note(HISTORY_READING_NOTE);
    }

    let log = monitor.alert_log();
    let alert = monitor.record_alert(&report, &log)?;
    if alert.is_some() {
        info!(path = %log.path().display(), "Alert recorded");
    }

    let exported = match &args.report {
        Some(path) => {
            export_report(path, &report, args.format.formatter().as_ref())?;
            Some(path.clone())
        }
        None => None,
    };

    Ok(AssessOutcome {
        report,
        alert,
        exported,
    })
}

/// Console rendering of an assessment.
pub fn render_console(report: &SiteReport, use_colors: bool) -> Result<String> {
    let formatter = HumanFormatter::with_config(FormatterConfig::default().with_colors(use_colors));
    Ok(formatter.format(report)?)
}

/// Reads the alert log named by `args`, falling back to the configured path.
pub fn run_alerts(args: &AlertsArgs, config: &MonitorConfig) -> Result<Vec<AlertRecord>> {
    let path = args.log.clone().unwrap_or_else(|| config.alert_log_path.clone());
    let log = AlertLog::new(path);
    log.read_all()
        .with_context(|| format!("failed to read alert log {}", log.path().display()))
}

/// One line per alert, oldest first.
pub fn render_alerts(records: &[AlertRecord]) -> String {
    if records.is_empty() {
        return "No alerts recorded.\n".to_string();
    }
    records
        .iter()
        .map(|r| {
            format!(
                "{}  {:<10} {:<20} {:>9.2} ppb  z={:>6.2}  {}\n",
                r.datetime_utc.format(ch4_guard::alert_log::TIMESTAMP_FORMAT),
                r.risk.as_str(),
                r.site,
                r.ch4_ppb,
                r.z_score,
                r.decision
            )
        })
        .collect()
}

/// Lists configured sites.
pub fn render_sites(config: &MonitorConfig) -> String {
    config
        .sites
        .iter()
        .map(|s| format!("{:<20} {:>9.4} {:>9.4}\n", s.name, s.latitude, s.longitude))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        assess: AssessArgs,
    }

    fn write_history(dir: &tempfile::TempDir) -> String {
        let path = dir.path().join("history.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "date,ch4_ppb").unwrap();
        for (i, v) in [90.0, 95.0, 100.0, 105.0, 110.0, 125.0].iter().enumerate() {
            writeln!(file, "2024-01-{:02},{v}", i + 1).unwrap();
        }
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_parse_assess_args() {
        let cli = TestCli::try_parse_from([
            "ch4-assess",
            "--site",
            "Hassi R'mel",
            "--value",
            "1.95",
            "--unit",
            "ppm",
            "--history",
            "h.csv",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.assess.unit, ConcentrationUnit::Ppm);
        assert_eq!(cli.assess.format, ReportFormat::Json);
        assert_eq!(cli.assess.value, Some(1.95));
        assert_eq!(cli.assess.history_unit, None);
    }

    #[test]
    fn test_rejects_unknown_unit() {
        let result = TestCli::try_parse_from([
            "ch4-assess",
            "--site",
            "x",
            "--history",
            "h.csv",
            "--unit",
            "furlongs",
        ]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_assess_scores_last_history_entry() {
        let dir = tempfile::tempdir().unwrap();
        let history = write_history(&dir);
        let report_path = dir.path().join("report.md");
        let cli = TestCli::try_parse_from([
            "ch4-assess",
            "--site",
            "Hassi R'mel",
            "--history",
            history.as_str(),
            "--flares",
            "2",
            "--log",
            dir.path().join("alerts.csv").to_str().unwrap(),
            "--report",
            report_path.to_str().unwrap(),
        ])
        .unwrap();

        let outcome = run_assess(&cli.assess, MonitorConfig::default()).await.unwrap();
        assert_eq!(outcome.report.measurement.value_ppb(), 125.0);
        assert_eq!(outcome.report.assessment.baseline.count, 5);
        assert!(outcome.alert.is_some());
        assert_eq!(outcome.exported, Some(report_path.clone()));
        assert_eq!(outcome.report.notes, vec![HISTORY_READING_NOTE.to_string()]);
        let written = std::fs::read_to_string(report_path).unwrap();
        assert!(written.contains("Active flares detected (2 flares)"));
        assert!(written.contains("Its observation time is unknown"));

        let alerts = run_alerts(
            &AlertsArgs {
                log: Some(dir.path().join("alerts.csv")),
                json: false,
            },
            &MonitorConfig::default(),
        )
        .unwrap();
        assert_eq!(alerts.len(), 1);
        assert!(render_alerts(&alerts).contains("Critical"));
    }

    #[tokio::test]
    async fn test_explicit_value_has_no_note() {
        let dir = tempfile::tempdir().unwrap();
        let history = write_history(&dir);
        let cli = TestCli::try_parse_from([
            "ch4-assess",
            "--site",
            "Hassi R'mel",
            "--value",
            "100",
            "--history",
            history.as_str(),
            "--log",
            dir.path().join("alerts.csv").to_str().unwrap(),
        ])
        .unwrap();
        let outcome = run_assess(&cli.assess, MonitorConfig::default()).await.unwrap();
        assert_eq!(outcome.report.assessment.baseline.count, 6);
        assert!(outcome.report.notes.is_empty());
    }

    #[tokio::test]
    async fn test_history_unit_converts_ppm_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history_ppm.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "date,CH4_ppm").unwrap();
        for (i, v) in [1.880, 1.885, 1.890, 1.895, 1.900].iter().enumerate() {
            writeln!(file, "2024-01-{:02},{v}", i + 1).unwrap();
        }
        drop(file);

        let cli = TestCli::try_parse_from([
            "ch4-assess",
            "--site",
            "Hassi R'mel",
            "--value",
            "1892",
            "--history",
            path.to_str().unwrap(),
            "--history-unit",
            "ppm",
            "--log",
            dir.path().join("alerts.csv").to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(cli.assess.history_unit, Some(ConcentrationUnit::Ppm));

        let outcome = run_assess(&cli.assess, MonitorConfig::default()).await.unwrap();
        let baseline = &outcome.report.assessment.baseline;
        assert!((baseline.mean - 1890.0).abs() < 1e-6);
        assert_eq!(outcome.report.assessment.tier, ch4_guard::classifier::RiskTier::Normal);
        assert!(outcome.alert.is_none());
    }

    #[tokio::test]
    async fn test_unknown_site() {
        let dir = tempfile::tempdir().unwrap();
        let history = write_history(&dir);
        let cli = TestCli::try_parse_from([
            "ch4-assess",
            "--site",
            "Nowhere",
            "--value",
            "1900",
            "--history",
            history.as_str(),
        ])
        .unwrap();
        let err = run_assess(&cli.assess, MonitorConfig::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unknown site 'Nowhere'"));
    }

    #[test]
    fn test_render_sites_and_empty_alerts() {
        let sites = render_sites(&MonitorConfig::default());
        assert!(sites.contains("Hassi R'mel"));
        assert_eq!(render_alerts(&[]), "No alerts recorded.\n");
        assert!(load_config(None).is_ok());
    }
}
