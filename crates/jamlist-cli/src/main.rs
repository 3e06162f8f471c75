//! jamlist CLI entrypoint

mod cli;
mod logging;

use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::Parser;
use jamlist_core::JamConfig;

use crate::cli::Cli;
use crate::logging::LoggingConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => JamConfig::load_from(path),
        None => JamConfig::load(),
    }
    .context("Failed to load configuration")?;

    // Keep the guard alive until exit so file logs are flushed
    let log_directory = cli
        .log_dir
        .clone()
        .or_else(|| config.log_directory.clone());
    let _guard = logging::init(
        &LoggingConfig::from_verbosity(cli.verbose)
            .with_log_directory(log_directory)
            .with_console_ansi(std::io::stderr().is_terminal()),
    )?;

    cli.execute(&config)
}
