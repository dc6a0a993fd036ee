//! `kks-dashboard`: command line front end for the KidsKulturSpass admin dashboard.
//!
//! ```bash
//! kks-dashboard login --email admin@example.org --password '...'
//! kks-dashboard show unassigned-events --search potsdam
//! kks-dashboard export emails --out ./exports
//! ```

mod cli;
mod commands;
mod config;
mod logging;
mod render;
mod runner;
mod session;

use anyhow::Context;
use clap::Parser;
use dashboard_logging::dash_error;

use crate::cli::Cli;
use crate::config::AppConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log, cli.verbose);

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;

    let result = commands::run(&runtime, &config, cli.command);
    if let Err(err) = &result {
        dash_error!("{:#}", err);
    }
    result
}
