//! # eyesync CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Job configuration loading and validation
//! - Synchronization and overweighting runs
//! - Event inventory for anchor selection

mod cli;
mod commands;
mod error;
mod job;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_events, run_overweight, run_sync, run_validate};

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on CLI options
    init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "eyesync starting");

    // Execute command
    let result = match &cli.command {
        Commands::Sync(args) => run_sync(args),
        Commands::Overweight(args) => run_overweight(args),
        Commands::Events(args) => run_events(args),
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    observability::init_with_config(observability::ObservabilityConfig {
        log_format: cli.log_format.into(),
        default_log_level: default_log_level.to_string(),
    })
}
