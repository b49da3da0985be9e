//! Example assessing the latest reading of each configured site.
//!
//! Observations are served by an in-memory provider standing in for a
//! satellite retrieval client. Each site gets a historical series, the newest
//! usable reading is picked inside the lookback window, and the resulting
//! report is printed in every format.
//!
//! Run with:
//! ```bash
//! cargo run --example site_assessment
//! ```

use ch4_guard::acquisition::StaticProvider;
use ch4_guard::logging::setup::{init_logging, LoggingConfig};
use ch4_guard::prelude::*;
use ch4_guard::report::{HumanFormatter, JsonFormatter, MarkdownFormatter};
use chrono::{Duration, Utc};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::default())?;
    println!("=== CH4 Site Assessment Example ===\n");

    let monitor = SiteMonitor::new(MonitorConfig::default())?.with_log_config(LogConfig::verbose());
    let now = Utc::now();

    // Sentinel-5P style readings, as mole fractions. Some scenes are cloudy.
    let provider = StaticProvider::new();
    let scenes = [
        ("Hassi R'mel", 30, Some(1.884e-6)),
        ("Hassi R'mel", 8, Some(1.947e-6)),
        ("Hassi R'mel", 2, None),
        ("Other site", 20, Some(1.889e-6)),
        ("Other site", 6, Some(1.893e-6)),
    ];
    for (site, days_ago, value) in scenes {
        provider
            .record(
                site,
                Observation::new(now - Duration::days(days_ago), value, ConcentrationUnit::MoleFraction),
            )
            .await;
    }

    let history = HistoricalSeries::new(vec![
        1872.0, 1878.5, 1881.0, 1876.2, 1884.9, 1889.3, 1880.4, 1875.8, 1883.1, 1879.6,
    ])?;
    let flares = [("Hassi R'mel", 3), ("Other site", 0)];

    let sites: Vec<Site> = monitor.config().sites.iter().cloned().collect();
    for site in &sites {
        println!("--- {} ---", site.name);
        let Some(reading) = monitor.latest_measurement(&provider, site, now).await? else {
            println!("No usable reading in the last {} days\n", monitor.config().lookback_days);
            continue;
        };

        let flare_count = flares
            .iter()
            .find(|(name, _)| *name == site.name)
            .map(|(_, n)| *n)
            .unwrap_or(0);
        let report = monitor.analyze(reading, &history, Some(FlareAttribution::from_count(flare_count)))?;

        println!("{}", report.assessment.explanation());
        print!("{}", HumanFormatter::new().format(&report)?);
        println!("\nMarkdown:\n{}", MarkdownFormatter::new().with_heading_level(2).format(&report)?);
        println!("JSON:\n{}\n", JsonFormatter::new().format(&report)?);
    }

    Ok(())
}
