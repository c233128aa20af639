//! `validate` command: parse a job file and report what it would run.

use std::path::Path;

use anyhow::{Context, Result};
use contracts::JobConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

#[derive(Debug, Serialize)]
struct JobCheck {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<JobOutline>,
}

impl JobCheck {
    fn failed(path: &Path, error: String) -> Self {
        Self {
            valid: false,
            config_path: path.display().to_string(),
            error: Some(error),
            warnings: Vec::new(),
            summary: None,
        }
    }

    fn passed(path: &Path, config: &JobConfig) -> Self {
        Self {
            valid: true,
            config_path: path.display().to_string(),
            error: None,
            warnings: job_warnings(config),
            summary: Some(JobOutline::of(config)),
        }
    }
}

/// One line per configured job section
#[derive(Debug, Serialize)]
struct JobOutline {
    version: String,
    sync: Option<String>,
    overweight: Option<String>,
    output_dir: String,
}

impl JobOutline {
    fn of(config: &JobConfig) -> Self {
        let sync = config.sync.as_ref().map(|s| {
            let mode = if s.do_regression { "regression" } else { "two-point" };
            format!(
                "anchors {} -> {}, {} column(s), {mode}",
                s.start_event,
                s.end_event,
                s.import_columns.len()
            )
        });
        let overweight = config.overweight.as_ref().map(|o| {
            let [before, after] = o.time_window;
            format!(
                "'{}' window [{before}, {after}] s, proportion {}",
                o.event_type, o.proportion
            )
        });
        Self {
            version: format!("{:?}", config.version),
            sync,
            overweight,
            output_dir: config.output.dir.display().to_string(),
        }
    }
}

pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "checking job file");

    let check = check_job(&args.config);
    if args.json {
        let rendered =
            serde_json::to_string_pretty(&check).context("rendering job check as JSON")?;
        println!("{rendered}");
    } else {
        render(&check);
    }

    anyhow::ensure!(check.valid, "job file {} is invalid", check.config_path);
    Ok(())
}

fn check_job(path: &Path) -> JobCheck {
    if !path.is_file() {
        return JobCheck::failed(path, format!("no such job file: {}", path.display()));
    }
    match config_loader::ConfigLoader::load_from_path(path) {
        Ok(config) => JobCheck::passed(path, &config),
        Err(e) => JobCheck::failed(path, e.to_string()),
    }
}

/// Settings that load fine but probably do not do what was meant
fn job_warnings(config: &JobConfig) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(sync) = &config.sync {
        if sync.filter_eyetrack {
            out.push("sync.filter_eyetrack is set but no anti-alias filter is applied".to_string());
        }
        if sync.start_event == sync.end_event {
            out.push(format!(
                "start and end anchor are both {}; the code must occur at least twice",
                sync.start_event
            ));
        }
        if !sync.do_regression && sync.search_radius != contracts::DEFAULT_SEARCH_RADIUS {
            out.push("sync.search_radius is ignored without do_regression".to_string());
        }
    }

    if config.overweight.as_ref().is_some_and(|o| o.proportion == 0.0) {
        out.push("overweight.proportion is 0, the recording is only flattened".to_string());
    }

    out
}

fn render(check: &JobCheck) {
    if !check.valid {
        println!("✗ {} is invalid", check.config_path);
        if let Some(error) = &check.error {
            println!("    {error}");
        }
        return;
    }

    println!("✓ {} is valid", check.config_path);
    if let Some(outline) = &check.summary {
        println!("    version   {}", outline.version);
        if let Some(sync) = &outline.sync {
            println!("    sync      {sync}");
        }
        if let Some(overweight) = &outline.overweight {
            println!("    overweight {overweight}");
        }
        println!("    output    {}", outline.output_dir);
    }
    for warning in &check.warnings {
        println!("  ⚠ {warning}");
    }
}
