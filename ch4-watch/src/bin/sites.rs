//! List the monitored sites.

use anyhow::Result;
use ch4_watch::*;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "ch4-sites", author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.common)?;

    let config = load_config(cli.common.config.as_deref())?;
    print!("{}", render_sites(&config));
    Ok(())
}
