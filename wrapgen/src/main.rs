mod commands;
mod model;

use clap::Parser;
use eyre::Result;
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "WRAPGEN_LOG";

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    Cli::parse().run()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
