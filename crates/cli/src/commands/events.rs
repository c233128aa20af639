//! `events` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use sync_engine::EventInventory;
use tracing::info;

use crate::cli::EventsArgs;
use crate::job;

/// One row of the event listing
#[derive(Serialize)]
struct EventRow {
    code: i64,
    primary: usize,
    secondary: usize,
    shared: bool,
    /// Same number of occurrences in both streams
    balanced: bool,
}

/// Execute the `events` command
pub fn run_events(args: &EventsArgs) -> Result<()> {
    let recording = job::load_recording(&args.recording)?;
    let bundle = job::load_bundle(&args.bundle)?;

    let primary = ingestion::extract_events("primary", &recording.events)
        .context("Failed to read primary events")?;
    let secondary = ingestion::extract_events("secondary", &bundle.events)
        .context("Failed to read secondary events")?;
    let inventory = EventInventory::build(&primary, &secondary);

    let rows: Vec<EventRow> = inventory
        .counts
        .iter()
        .filter(|(_, count)| !args.shared || count.is_shared())
        .map(|(code, count)| EventRow {
            code: code.0,
            primary: count.primary,
            secondary: count.secondary,
            shared: count.is_shared(),
            balanced: count.is_shared() && count.is_balanced(),
        })
        .collect();
    info!(
        types = inventory.counts.len(),
        shared = inventory.shared().count(),
        "Event inventory built"
    );

    if args.json {
        let json = serde_json::to_string_pretty(&rows).context("Failed to serialize events")?;
        println!("{json}");
    } else {
        print_rows(&rows);
    }
    Ok(())
}

fn print_rows(rows: &[EventRow]) {
    println!("{:>10}  {:>8}  {:>9}  shared", "code", "primary", "secondary");
    for row in rows {
        println!(
            "{:>10}  {:>8}  {:>9}  {}",
            row.code,
            row.primary,
            row.secondary,
            if row.shared { "yes" } else { "-" }
        );
    }
    let balanced: Vec<_> = rows
        .iter()
        .filter(|r| r.balanced)
        .map(|r| r.code.to_string())
        .collect();
    if !balanced.is_empty() {
        println!("\nCandidate anchors (same count in both streams): {}", balanced.join(", "));
    }
}
