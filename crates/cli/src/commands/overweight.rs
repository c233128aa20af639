//! `overweight` command implementation.

use anyhow::{Context, Result};
use augment::{OverweightOutcome, Overweighter};
use dispatcher::{JobKind, JobReport};
use tracing::info;

use crate::cli::OverweightArgs;
use crate::error::CliError;
use crate::job;

/// Execute the `overweight` command
pub fn run_overweight(args: &OverweightArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");
    let config = job::load_config(&args.config, &args.output)?;
    let params = config
        .overweight
        .clone()
        .ok_or_else(|| CliError::missing_section("overweight", &args.config))?;

    let recording = job::load_recording(&args.recording)?;
    let outcome = Overweighter::new(params)
        .apply(&recording)
        .context("Overweighting failed")?;

    let summary = overweight_summary(&outcome);
    let mut dispatcher = job::build_dispatcher(&config)?;
    job::deliver(
        &mut dispatcher,
        &JobReport {
            kind: JobKind::Overweight,
            recording: &outcome.recording,
            quality: None,
            summary: &summary,
        },
    )?;
    print!("{summary}");
    Ok(())
}

/// Audit text for an overweighting pass
pub fn overweight_summary(outcome: &OverweightOutcome) -> String {
    let recording = &outcome.recording;
    format!(
        "recording:            {}\n\
         windows extracted:    {} ({} skipped at the data edges)\n\
         window width:         {} samples\n\
         samples appended:     {}\n\
         total samples:        {}\n",
        recording.name,
        outcome.windows,
        outcome.skipped,
        outcome.window_width,
        outcome.appended,
        recording.samples(),
    )
}
