//! Site summary reports and their output formats.
//!
//! A [`SiteReport`] gathers everything an operator needs for one analysis:
//! the reading, the baseline, the assessment and, when available, the flare
//! attribution. Formatters turn it into a document:
//!
//! - [`HumanFormatter`]: console output, optionally colorized
//! - [`MarkdownFormatter`]: a shareable summary document
//! - [`JsonFormatter`]: structured output for other tools
//!
//! # Examples
//!
//! ```rust
//! use ch4_guard::classifier::{assess, ClassifierThresholds};
//! use ch4_guard::model::{HistoricalSeries, Measurement, Site};
//! use ch4_guard::report::{MarkdownFormatter, ReportFormatter, SiteReport};
//!
//! let site = Site::new("Hassi R'mel", 32.93, 3.30)?;
//! let reading = Measurement::new(site, 1962.0, chrono::Utc::now())?;
//! let series = HistoricalSeries::new(vec![1880.0, 1890.0, 1900.0, 1910.0])?;
//! let assessment = assess(&reading, &series, &ClassifierThresholds::default())?;
//!
//! let report = SiteReport::new(reading, assessment);
//! let markdown = MarkdownFormatter::new().format(&report)?;
//! assert!(markdown.contains("Critical"));
//! # Ok::<(), ch4_guard::error::GuardError>(())
//! ```

use std::fmt::Write;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::attribution::FlareAttribution;
use crate::classifier::{RiskAssessment, RiskTier};
use crate::error::{GuardError, Result};
use crate::model::Measurement;

/// Notice printed on every report.
pub const DISCLAIMER: &str = "Regional CH4 monitoring based on Sentinel-5P data. \
This system does not replace field inspections.";

/// Everything reported for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteReport {
    pub measurement: Measurement,
    pub assessment: RiskAssessment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<FlareAttribution>,
    pub generated_at: DateTime<Utc>,
    /// Caveats about this particular analysis, printed with the report
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    pub disclaimer: String,
}

impl SiteReport {
    pub fn new(measurement: Measurement, assessment: RiskAssessment) -> Self {
        Self {
            measurement,
            assessment,
            attribution: None,
            generated_at: Utc::now(),
            notes: Vec::new(),
            disclaimer: DISCLAIMER.to_string(),
        }
    }

    pub fn with_attribution(mut self, attribution: FlareAttribution) -> Self {
        self.attribution = Some(attribution);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }
}

/// Configuration options for formatting reports.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include mean, standard deviation and point count
    pub include_baseline: bool,
    /// Include the flare attribution section when present
    pub include_attribution: bool,
    /// Include the disclaimer
    pub include_disclaimer: bool,
    /// Whether to use colorized output (human formatter only)
    pub use_colors: bool,
    /// Whether to include timestamps in output
    pub include_timestamps: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_baseline: true,
            include_attribution: true,
            include_disclaimer: true,
            use_colors: true,
            include_timestamps: true,
        }
    }
}

impl FormatterConfig {
    /// Only the tier, score and action.
    pub fn minimal() -> Self {
        Self {
            include_baseline: false,
            include_attribution: false,
            include_disclaimer: false,
            use_colors: false,
            include_timestamps: false,
        }
    }

    /// Everything, without ANSI colors (files, CI logs).
    pub fn plain() -> Self {
        Self {
            use_colors: false,
            ..Self::default()
        }
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn with_baseline(mut self, include: bool) -> Self {
        self.include_baseline = include;
        self
    }
}

/// Turns a [`SiteReport`] into a document.
pub trait ReportFormatter {
    /// Formats with the formatter's own configuration.
    fn format(&self, report: &SiteReport) -> Result<String>;

    /// Formats with an explicit configuration.
    fn format_with_config(&self, report: &SiteReport, _config: &FormatterConfig) -> Result<String> {
        self.format(report)
    }

    /// File extension for exported documents, without the dot.
    fn extension(&self) -> &'static str;
}

/// Output formats selectable at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Human,
    Markdown,
    Json,
}

impl ReportFormat {
    /// A boxed formatter for this format. Human output is never colorized here
    /// since the result may be written to a file.
    pub fn formatter(self) -> Box<dyn ReportFormatter> {
        match self {
            Self::Human => Box::new(HumanFormatter::with_config(FormatterConfig::plain())),
            Self::Markdown => Box::new(MarkdownFormatter::new()),
            Self::Json => Box::new(JsonFormatter::new()),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "text" | "txt" => Ok(Self::Human),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(GuardError::Parse(format!("unknown report format '{other}'"))),
        }
    }
}

/// Writes `report` to `path` using `formatter`.
#[instrument(skip_all, fields(path = %path.as_ref().display(), site = %report.measurement.site().name))]
pub fn export_report(
    path: impl AsRef<Path>,
    report: &SiteReport,
    formatter: &dyn ReportFormatter,
) -> Result<()> {
    let path = path.as_ref();
    let document = formatter.format(report)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, document)?;
    info!(bytes = std::fs::metadata(path)?.len(), "Exported site report");
    Ok(())
}

/// Formats reports as JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &SiteReport) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(json)
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

/// Formats reports for terminals and logs.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }
}

fn tier_color(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::Normal => "\x1b[32m",
        RiskTier::Anomalous => "\x1b[33m",
        RiskTier::Critical => "\x1b[31m",
    }
}

fn tier_symbol(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::Normal => "✅",
        RiskTier::Anomalous => "⚠️",
        RiskTier::Critical => "🚨",
    }
}

impl ReportFormatter for HumanFormatter {
    fn format(&self, report: &SiteReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(&self, report: &SiteReport, config: &FormatterConfig) -> Result<String> {
        let mut output = String::new();
        let site = report.measurement.site();
        let assessment = &report.assessment;

        writeln!(output)?;
        if config.use_colors {
            writeln!(
                output,
                "{} {}{}\x1b[0m - {}",
                tier_symbol(assessment.tier),
                tier_color(assessment.tier),
                assessment.tier,
                site.name
            )?;
        } else {
            writeln!(
                output,
                "{} {} - {}",
                tier_symbol(assessment.tier),
                assessment.tier,
                site.name
            )?;
        }
        writeln!(output)?;
        writeln!(
            output,
            "Site: {} ({:.6}, {:.6})",
            site.name, site.latitude, site.longitude
        )?;
        writeln!(output, "CH4: {:.2} ppb", report.measurement.value_ppb())?;
        if config.include_timestamps {
            writeln!(output, "Observed: {}", report.measurement.timestamp())?;
        }
        writeln!(output, "Z-score: {:.2}", assessment.score)?;
        writeln!(output, "Action: {}", assessment.action)?;

        if config.include_baseline {
            writeln!(output)?;
            writeln!(output, "📊 Baseline:")?;
            writeln!(output, "   Mean: {:.2} ppb", assessment.baseline.mean)?;
            writeln!(output, "   Std dev: {:.2} ppb", assessment.baseline.std_dev)?;
            writeln!(output, "   Points: {}", assessment.baseline.count)?;
        }

        if config.include_attribution {
            if let Some(attribution) = &report.attribution {
                writeln!(output)?;
                writeln!(output, "🔥 Source: {attribution}")?;
            }
        }

        if !report.notes.is_empty() {
            writeln!(output)?;
            for note in &report.notes {
                writeln!(output, "Note: {note}")?;
            }
        }

        if config.include_timestamps {
            writeln!(output)?;
            writeln!(output, "Generated: {}", report.generated_at)?;
        }
        if config.include_disclaimer {
            writeln!(output)?;
            writeln!(output, "{}", report.disclaimer)?;
        }
        Ok(output)
    }

    fn extension(&self) -> &'static str {
        "txt"
    }
}

/// Formats reports as a Markdown document.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::plain(),
            heading_level: 1,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 1,
        }
    }

    /// Sets the level of the top heading (clamped to 1..=5).
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 5);
        self
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &SiteReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(&self, report: &SiteReport, config: &FormatterConfig) -> Result<String> {
        let mut output = String::new();
        let h1 = "#".repeat(self.heading_level as usize);
        let h2 = "#".repeat(self.heading_level as usize + 1);
        let site = report.measurement.site();
        let assessment = &report.assessment;

        writeln!(output, "{h1} CH4 surveillance report: {}", site.name)?;
        writeln!(output)?;
        if config.include_timestamps {
            writeln!(output, "_Generated {}_", report.generated_at)?;
            writeln!(output)?;
        }

        writeln!(output, "| Field | Value |")?;
        writeln!(output, "|-------|-------|")?;
        writeln!(output, "| Site | {} |", site.name)?;
        writeln!(output, "| Latitude | {:.6} |", site.latitude)?;
        writeln!(output, "| Longitude | {:.6} |", site.longitude)?;
        writeln!(output, "| CH4 (ppb) | {:.2} |", report.measurement.value_ppb())?;
        if config.include_timestamps {
            writeln!(output, "| Observed | {} |", report.measurement.timestamp())?;
        }
        writeln!(output, "| Z-score | {:.2} |", assessment.score)?;
        writeln!(output, "| Risk | **{}** |", assessment.tier)?;
        writeln!(output, "| Decision | {} |", assessment.action)?;

        if config.include_baseline {
            writeln!(output)?;
            writeln!(output, "{h2} Baseline")?;
            writeln!(output)?;
            writeln!(output, "- Mean: {:.2} ppb", assessment.baseline.mean)?;
            writeln!(
                output,
                "- Standard deviation: {:.2} ppb",
                assessment.baseline.std_dev
            )?;
            writeln!(output, "- Historical points: {}", assessment.baseline.count)?;
        }

        if config.include_attribution {
            if let Some(attribution) = &report.attribution {
                writeln!(output)?;
                writeln!(output, "{h2} Likely source")?;
                writeln!(output)?;
                writeln!(output, "{attribution}")?;
            }
        }

        if !report.notes.is_empty() {
            writeln!(output)?;
            writeln!(output, "{h2} Notes")?;
            writeln!(output)?;
            for note in &report.notes {
                writeln!(output, "- {note}")?;
            }
        }

        if config.include_disclaimer {
            writeln!(output)?;
            writeln!(output, "> {}", report.disclaimer)?;
        }
        Ok(output)
    }

    fn extension(&self) -> &'static str {
        "md"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{assess, ClassifierThresholds};
    use crate::model::{HistoricalSeries, Site};

    fn report(value: f64) -> SiteReport {
        let site = Site::new("Hassi R'mel", 32.93, 3.30).unwrap();
        let m = Measurement::new(site, value, Utc::now()).unwrap();
        let series = HistoricalSeries::new(vec![90.0, 95.0, 100.0, 105.0, 110.0]).unwrap();
        let assessment = assess(&m, &series, &ClassifierThresholds::default()).unwrap();
        SiteReport::new(m, assessment)
    }

    #[test]
    fn test_human_plain() {
        let text = HumanFormatter::with_config(FormatterConfig::plain())
            .format(&report(125.0))
            .unwrap();
        assert!(text.contains("🚨 Critical - Hassi R'mel"));
        assert!(text.contains("Z-score: 3.16"));
        assert!(text.contains("Immediate inspection and alert"));
        assert!(text.contains("does not replace field inspections"));
        assert!(!text.contains("\x1b["));
    }

    #[test]
    fn test_human_colors() {
        let text = HumanFormatter::new().format(&report(100.0)).unwrap();
        assert!(text.contains("\x1b[32mNormal"));
    }

    #[test]
    fn test_minimal_omits_sections() {
        let text = HumanFormatter::new()
            .format_with_config(
                &report(118.0).with_attribution(FlareAttribution::from_count(1)),
                &FormatterConfig::minimal(),
            )
            .unwrap();
        assert!(text.contains("Anomalous"));
        assert!(!text.contains("Baseline"));
        assert!(!text.contains("Source"));
    }

    #[test]
    fn test_markdown() {
        let md = MarkdownFormatter::new()
            .with_heading_level(2)
            .format(&report(125.0).with_attribution(FlareAttribution::from_count(2)))
            .unwrap();
        assert!(md.starts_with("## CH4 surveillance report: Hassi R'mel"));
        assert!(md.contains("| Risk | **Critical** |"));
        assert!(md.contains("### Likely source"));
        assert!(md.contains("Active flares detected (2 flares)"));
    }

    #[test]
    fn test_notes_are_rendered() {
        let report = report(100.0).with_note("Observation time unknown");
        let text = HumanFormatter::with_config(FormatterConfig::plain())
            .format(&report)
            .unwrap();
        assert!(text.contains("Note: Observation time unknown"));
        let md = MarkdownFormatter::new().format(&report).unwrap();
        assert!(md.contains("## Notes\n\n- Observation time unknown"));
        let json = JsonFormatter::new().format(&report).unwrap();
        assert!(json.contains("Observation time unknown"));
    }

    #[test]
    fn test_json() {
        let json = JsonFormatter::new()
            .with_pretty(false)
            .format(&report(125.0))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["assessment"]["tier"], "critical");
        assert!(value.get("attribution").is_none());
    }

    #[test]
    fn test_export_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/hassi.md");
        export_report(&path, &report(125.0), &MarkdownFormatter::new()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Critical"));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("md".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert_eq!(ReportFormat::Json.formatter().extension(), "json");
        assert!("pdf".parse::<ReportFormat>().is_err());
    }
}
