//! `sync` command implementation.

use anyhow::{Context, Result};
use augment::Overweighter;
use dispatcher::{JobKind, JobReport};
use sync_engine::EyeSyncEngine;
use tracing::{info, warn};

use crate::cli::SyncArgs;
use crate::commands::overweight::overweight_summary;
use crate::error::CliError;
use crate::job;

/// Execute the `sync` command
pub fn run_sync(args: &SyncArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");
    let config = job::load_config(&args.config, &args.output)?;
    let params = config
        .sync
        .clone()
        .ok_or_else(|| CliError::missing_section("sync", &args.config))?;
    let overweight = if args.overweight {
        let params = config
            .overweight
            .clone()
            .ok_or_else(|| CliError::missing_section("overweight", &args.config))?;
        Some(params)
    } else {
        None
    };

    let recording = job::load_recording(&args.recording)?;
    let bundle = job::load_bundle(&args.bundle)?;

    if args.dry_run {
        info!("Dry run mode - inputs are valid, exiting");
        println!(
            "anchors {} -> {}, columns {:?} -> {:?}",
            params.start_event, params.end_event, params.import_columns, params.new_labels
        );
        return Ok(());
    }

    let outcome = EyeSyncEngine::new(params)
        .synchronize(&recording, &bundle)
        .context("Synchronization failed")?;

    if outcome.quality.ambiguous_count > 0 {
        warn!(
            ambiguous = outcome.quality.ambiguous_count,
            "Some event matches were ambiguous, consider a smaller search radius"
        );
    }

    let mut dispatcher = job::build_dispatcher(&config)?;
    let summary = outcome.summary.to_string();
    job::deliver(
        &mut dispatcher,
        &JobReport {
            kind: JobKind::Sync,
            recording: &outcome.recording,
            quality: Some(&outcome.quality),
            summary: &summary,
        },
    )?;
    print!("{summary}");

    if let Some(params) = overweight {
        let augmented = Overweighter::new(params)
            .apply(&outcome.recording)
            .context("Overweighting failed")?;
        let summary = overweight_summary(&augmented);
        job::deliver(
            &mut dispatcher,
            &JobReport {
                kind: JobKind::Overweight,
                recording: &augmented.recording,
                quality: None,
                summary: &summary,
            },
        )?;
        print!("{summary}");
    }

    info!(dir = %config.output.dir.display(), "Results written");
    Ok(())
}
