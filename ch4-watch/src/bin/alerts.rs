//! Print the HSE alert log.

use anyhow::Result;
use ch4_watch::*;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "ch4-alerts", author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    alerts: AlertsArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.common)?;

    let config = load_config(cli.common.config.as_deref())?;
    let records = run_alerts(&cli.alerts, &config)?;

    if cli.alerts.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print!("{}", render_alerts(&records));
    }
    Ok(())
}
