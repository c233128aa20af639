//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// eyesync - EEG / eye-tracking synchronization toolkit
#[derive(Parser, Debug)]
#[command(
    name = "eyesync",
    author,
    version,
    about = "Synchronize eye-tracking data with EEG recordings",
    long_about = "Aligns an eye-tracking stream to a continuous EEG recording using shared\n\
                  marker events, merges the resampled gaze channels and eye-movement events,\n\
                  and optionally overweights event windows for decomposition."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "EYESYNC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "EYESYNC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synchronize an eye-tracking bundle into a recording
    Sync(SyncArgs),

    /// Append overweighted event windows to a recording
    Overweight(OverweightArgs),

    /// List event types and their counts in both streams
    Events(EventsArgs),

    /// Validate a job configuration file without running it
    Validate(ValidateArgs),
}

/// Output overrides shared by the processing commands
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Override the output directory from the configuration
    #[arg(short, long, env = "EYESYNC_OUTPUT_DIR")]
    pub output: Option<PathBuf>,

    /// Pretty-print JSON artifacts
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for the `sync` command
#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    /// Path to job configuration file (TOML or JSON)
    #[arg(short, long, default_value = "eyesync.toml", env = "EYESYNC_CONFIG")]
    pub config: PathBuf,

    /// Primary recording (JSON interchange)
    #[arg(short, long)]
    pub recording: PathBuf,

    /// Eye-tracking bundle (JSON interchange)
    #[arg(short, long)]
    pub bundle: PathBuf,

    /// Also run the configuration's [overweight] section on the merged recording
    #[arg(long)]
    pub overweight: bool,

    /// Load and check all inputs, then exit without synchronizing
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the `overweight` command
#[derive(Args, Debug, Clone)]
pub struct OverweightArgs {
    /// Path to job configuration file (TOML or JSON)
    #[arg(short, long, default_value = "eyesync.toml", env = "EYESYNC_CONFIG")]
    pub config: PathBuf,

    /// Recording to augment (JSON interchange)
    #[arg(short, long)]
    pub recording: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the `events` command
#[derive(Args, Debug, Clone)]
pub struct EventsArgs {
    /// Primary recording (JSON interchange)
    #[arg(short, long)]
    pub recording: PathBuf,

    /// Eye-tracking bundle (JSON interchange)
    #[arg(short, long)]
    pub bundle: PathBuf,

    /// Only list event types present in both streams
    #[arg(long)]
    pub shared: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "eyesync.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
