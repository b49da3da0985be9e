//! Assess one CH4 reading for a site.
//!
//! Scores the reading against the site's historical CSV, prints the
//! assessment, appends an alert row when the tier warrants it and optionally
//! writes a report document.

use anyhow::Result;
use ch4_watch::*;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "ch4-assess", author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    assess: AssessArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.common)?;

    let config = load_config(cli.common.config.as_deref())?;
    let outcome = run_assess(&cli.assess, config).await?;

    print!("{}", render_console(&outcome.report, !cli.assess.no_color)?);
    if let Some(alert) = &outcome.alert {
        println!("\n📝 Alert logged: {} ({})", alert.risk, alert.decision);
    }
    if let Some(path) = &outcome.exported {
        println!("📄 Report written to {}", path.display());
    }
    Ok(())
}
