//! Example writing and reading the HSE alert log.
//!
//! Several readings are assessed against one baseline. Anomalous and critical
//! ones are appended to a CSV log in a temporary directory, which is then read
//! back.
//!
//! Run with:
//! ```bash
//! cargo run --example alert_log
//! ```

use ch4_guard::prelude::*;
use chrono::Utc;
use tempfile::TempDir;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    println!("=== CH4 Alert Log Example ===\n");

    let dir = TempDir::new()?;
    let config = MonitorConfig::default().with_alert_log_path(dir.path().join("alerts_hse.csv"));
    let monitor = SiteMonitor::new(config)?;
    let log = monitor.alert_log();
    let site = monitor.site("Hassi R'mel")?.clone();

    let baseline = HistoricalSeries::new(vec![1880.0, 1885.0, 1890.0, 1895.0, 1900.0])?;
    for value in [1892.0, 1908.0, 1915.0, 1931.0] {
        let reading = Measurement::new(site.clone(), value, Utc::now())?;
        let report = monitor.analyze(reading, &baseline, None)?;
        let logged = monitor.record_alert(&report, &log)?;
        println!(
            "{value:.1} ppb -> z={:.2} {} {}",
            report.assessment.score,
            report.assessment.tier,
            if logged.is_some() { "(logged)" } else { "" }
        );
    }

    println!("\nContents of {}:", log.path().display());
    print!("{}", std::fs::read_to_string(log.path())?);

    let records = log.read_all()?;
    println!("\n{} alerts read back", records.len());
    Ok(())
}
