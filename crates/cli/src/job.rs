//! Helpers shared by the processing commands.

use std::path::Path;

use anyhow::{Context, Result};
use contracts::{EyetrackBundle, JobConfig, Recording};
use dispatcher::{Dispatcher, DispatcherBuilder, JobReport};
use tracing::info;

use crate::cli::OutputArgs;
use crate::error::CliError;

/// Load and validate a job configuration, applying CLI output overrides
pub fn load_config(path: &Path, output: &OutputArgs) -> Result<JobConfig> {
    if !path.exists() {
        return Err(CliError::not_found(path).into());
    }
    let mut config = config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    if let Some(ref dir) = output.output {
        info!(dir = %dir.display(), "Overriding output directory from CLI");
        config.output.dir = dir.clone();
    }
    if output.pretty {
        config.output.pretty = true;
    }
    Ok(config)
}

pub fn load_recording(path: &Path) -> Result<Recording> {
    if !path.exists() {
        return Err(CliError::not_found(path).into());
    }
    ingestion::load_recording(path)
        .with_context(|| format!("Failed to load recording from {}", path.display()))
}

pub fn load_bundle(path: &Path) -> Result<EyetrackBundle> {
    if !path.exists() {
        return Err(CliError::not_found(path).into());
    }
    ingestion::load_bundle(path)
        .with_context(|| format!("Failed to load eye-tracking bundle from {}", path.display()))
}

pub fn build_dispatcher(config: &JobConfig) -> Result<Dispatcher> {
    Ok(DispatcherBuilder::from_config(&config.output)
        .context("Failed to create output sinks")?
        .build())
}

/// Dispatch a report and fail if any sink failed
pub fn deliver(dispatcher: &mut Dispatcher, report: &JobReport<'_>) -> Result<()> {
    let outcome = dispatcher.dispatch(report);
    if !outcome.is_complete() {
        let message = outcome
            .failed
            .iter()
            .map(|(sink, e)| format!("{sink}: {e}"))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(CliError::delivery(message).into());
    }
    Ok(())
}
