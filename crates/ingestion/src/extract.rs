//! Event extraction
//!
//! Resolves mixed numeric / free-text event types into canonical codes once,
//! so matching downstream only ever compares `EventCode`s.

use contracts::{CanonicalEvent, Event, EventCode, EventType, SyncError};
use tracing::{debug, instrument, warn};

/// First maximal run of ASCII digits in `label`, parsed as a code.
///
/// `"S 12"` → 12, `"stim103_on"` → 103, `"fixation"` → None.
/// Runs that overflow `i64` yield None.
pub fn leading_code(label: &str) -> Option<i64> {
    let start = label.find(|c: char| c.is_ascii_digit())?;
    let run = &label[start..];
    let end = run
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(run.len());
    run[..end].parse().ok()
}

/// Canonicalize an event list.
///
/// * Empty list → [`SyncError::NoEvents`]
/// * All numeric → passed through unchanged
/// * Otherwise labels are reduced to their leading code; labels without one
///   are left out of the canonical list (the source list is not touched)
///
/// Event order is preserved.
#[instrument(
    name = "extract_events",
    level = "debug",
    skip(events),
    fields(stream = stream, total = events.len())
)]
pub fn extract_events(stream: &str, events: &[Event]) -> Result<Vec<CanonicalEvent>, SyncError> {
    if events.is_empty() {
        return Err(SyncError::NoEvents {
            stream: stream.to_string(),
        });
    }

    let canonical: Vec<CanonicalEvent> = events
        .iter()
        .filter_map(|event| {
            let code = match &event.kind {
                EventType::Code(code) => Some(*code),
                EventType::Label(label) => {
                    let code = leading_code(label);
                    if code.is_none() && label.chars().any(|c| c.is_ascii_digit()) {
                        warn!(stream, label = %label, "event code does not fit in i64, skipped");
                    }
                    code
                }
            }?;
            Some(CanonicalEvent {
                code: EventCode(code),
                sample: event.latency,
            })
        })
        .collect();

    let skipped = events.len() - canonical.len();
    if skipped > 0 {
        debug!(stream, skipped, "events without numeric code left out of synchronization");
        metrics::counter!("eyesync_events_skipped_total", "stream" => stream.to_string())
            .increment(skipped as u64);
    }

    Ok(canonical)
}
