//! Merging resampled channels and eye-movement events into the primary recording.

use std::collections::BTreeMap;

use contracts::{
    AffineMapping, ChannelInfo, Event, EventType, EyetrackBundle, Recording, SyncError, SyncRange,
    EYE_CHANNEL_KIND,
};
use ndarray::{s, Array2};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::labels::sanitize_label;
use crate::resample::ResampledBlock;

/// What a merge added to the recording
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Sanitized labels of the appended channels
    pub channels_added: Vec<String>,
    pub eye_events_added: usize,
    /// Eye events whose onset fell outside the synchronized range
    pub eye_events_skipped: usize,
    /// Movement rows whose value count did not match the table header
    pub eye_events_malformed: usize,
    pub messages_added: usize,
}

/// Inputs controlling a merge
#[derive(Debug, Clone, Copy)]
pub struct MergeOptions<'a> {
    pub labels: &'a [String],
    pub import_eye_events: bool,
    pub import_other_messages: bool,
}

/// Build a new recording holding the original channels plus the resampled block.
///
/// The new channels are zero outside `block.range`. The input recording is
/// left untouched.
#[instrument(level = "debug", name = "merge", skip_all, fields(channels = options.labels.len()))]
pub fn merge(
    recording: &Recording,
    block: &ResampledBlock,
    bundle: &EyetrackBundle,
    mapping: &AffineMapping,
    options: MergeOptions<'_>,
) -> Result<(Recording, MergeStats), SyncError> {
    let added = block.data.ncols();
    if options.labels.len() != added {
        return Err(SyncError::LabelCountMismatch {
            labels: options.labels.len(),
            columns: added,
        });
    }
    let range = block.range;
    let samples = recording.samples();
    if range.last >= samples {
        return Err(SyncError::inconsistent(format!(
            "synchronized range ends at sample {} beyond {} samples",
            range.last, samples
        )));
    }

    let existing = recording.nbchan();
    let mut data = Array2::zeros((existing + added, samples));
    data.slice_mut(s![..existing, ..]).assign(&recording.data);
    data.slice_mut(s![existing.., range.first..=range.last])
        .assign(&block.data.t());

    let mut merged = recording.clone();
    merged.data = data;

    let mut stats = MergeStats::default();
    for label in options.labels {
        let label = sanitize_label(label);
        merged.channels.push(ChannelInfo {
            label: label.clone(),
            reference: String::new(),
            kind: EYE_CHANNEL_KIND.to_string(),
        });
        stats.channels_added.push(label);
    }

    if options.import_eye_events {
        let mapped = map_eye_events(bundle, mapping, range);
        stats.eye_events_added = mapped.events.len();
        stats.eye_events_skipped = mapped.outside_range;
        stats.eye_events_malformed = mapped.malformed;
        merged.events.extend(mapped.events);
    }

    if options.import_other_messages {
        stats.messages_added = bundle.other_messages.len();
        merged
            .other_messages
            .extend(bundle.other_messages.iter().cloned());
    }

    merged.check_consistency()?;

    debug!(
        eye_events = stats.eye_events_added,
        skipped = stats.eye_events_skipped,
        malformed = stats.eye_events_malformed,
        messages = stats.messages_added,
        "recording merged"
    );
    Ok((merged, stats))
}

struct MappedEyeEvents {
    events: Vec<Event>,
    outside_range: usize,
    malformed: usize,
}

/// Convert movement tables into primary-timeline events.
///
/// Rows whose mapped onset falls outside `range`, or whose values do not line
/// up with the table's `colheader`, are counted and dropped. Mapped ends are
/// clipped to the range.
fn map_eye_events(
    bundle: &EyetrackBundle,
    mapping: &AffineMapping,
    range: SyncRange,
) -> MappedEyeEvents {
    let mut mapped = MappedEyeEvents {
        events: Vec::new(),
        outside_range: 0,
        malformed: 0,
    };

    for table in &bundle.movements {
        for (index, row) in table.rows.iter().enumerate() {
            if row.values.len() != table.colheader.len() {
                warn!(
                    kind = table.kind.singular(),
                    row = index,
                    values = row.values.len(),
                    columns = table.colheader.len(),
                    "eye movement row does not match its header, skipped"
                );
                mapped.malformed += 1;
                continue;
            }
            let onset = mapping.apply(row.start as f64).round();
            if !onset.is_finite() || onset < range.first as f64 || onset > range.last as f64 {
                mapped.outside_range += 1;
                continue;
            }
            let latency = onset as usize;
            let end = mapping
                .apply(row.end as f64)
                .round()
                .clamp(latency as f64, range.last as f64) as usize;

            let fields: BTreeMap<String, f64> = table
                .colheader
                .iter()
                .cloned()
                .zip(row.values.iter().copied())
                .collect();

            mapped.events.push(Event {
                kind: EventType::Label(format!("{}_{}", row.eye.code(), table.kind.singular())),
                latency,
                duration: Some(end - latency + 1),
                fields,
            });
        }
    }

    mapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Eye, EyeMovementRow, EyeMovementTable, MovementKind};

    fn recording() -> Recording {
        let mut rec = Recording::continuous(
            500.0,
            Array2::from_elem((1, 20), 1.0),
            vec![ChannelInfo::new("Fz")],
        );
        rec.events = vec![Event::new(103, 2), Event::new(203, 15)];
        rec
    }

    fn bundle() -> EyetrackBundle {
        EyetrackBundle {
            srate: 500.0,
            samples: Array2::zeros((20, 1)),
            colheader: vec!["TIME".into()],
            events: Vec::new(),
            movements: vec![EyeMovementTable {
                kind: MovementKind::Fixation,
                colheader: vec!["duration".into(), "pos_x".into()],
                rows: vec![
                    EyeMovementRow {
                        eye: Eye::Left,
                        start: 4,
                        end: 8,
                        values: vec![5.0, 312.5],
                    },
                    EyeMovementRow {
                        eye: Eye::Right,
                        start: 0,
                        end: 3,
                        values: vec![4.0, 100.0],
                    },
                ],
            }],
            other_messages: vec!["TRIALID 1".into()],
        }
    }

    fn block(range: SyncRange, value: f64) -> ResampledBlock {
        ResampledBlock {
            range,
            data: Array2::from_elem((range.len(), 1), value),
        }
    }

    fn options(labels: &[String]) -> MergeOptions<'_> {
        MergeOptions {
            labels,
            import_eye_events: true,
            import_other_messages: true,
        }
    }

    #[test]
    fn test_merge_appends_channel_zero_outside_range() {
        let rec = recording();
        let labels = vec!["gaze_x [px]".to_string()];
        let range = SyncRange { first: 2, last: 15 };
        let (merged, stats) = merge(
            &rec,
            &block(range, 5.0),
            &bundle(),
            &AffineMapping::IDENTITY,
            options(&labels),
        )
        .unwrap();

        assert_eq!(merged.nbchan(), 2);
        assert_eq!(merged.channels[1].label, "gaze-x (px)");
        assert_eq!(merged.channels[1].kind, EYE_CHANNEL_KIND);
        assert_eq!(stats.channels_added, vec!["gaze-x (px)".to_string()]);
        for (sample, value) in merged.data.row(1).iter().enumerate() {
            let expected = if range.contains(sample) { 5.0 } else { 0.0 };
            assert_eq!(*value, expected, "sample {sample}");
        }
        assert!(merged.data.row(0).iter().all(|&v| v == 1.0));
        // input untouched
        assert_eq!(rec.nbchan(), 1);
        assert_eq!(rec.events.len(), 2);
    }

    #[test]
    fn test_merge_maps_eye_events() {
        let labels = vec!["x".to_string()];
        let (merged, stats) = merge(
            &recording(),
            &block(SyncRange { first: 2, last: 15 }, 0.0),
            &bundle(),
            &AffineMapping::IDENTITY,
            options(&labels),
        )
        .unwrap();

        assert_eq!(stats.eye_events_added, 1);
        assert_eq!(stats.eye_events_skipped, 1);
        let fixation = merged
            .events
            .iter()
            .find(|e| e.kind == EventType::Label("L_fixation".into()))
            .unwrap();
        assert_eq!(fixation.latency, 4);
        assert_eq!(fixation.duration, Some(5));
        assert_eq!(fixation.fields["pos_x"], 312.5);
        assert_eq!(merged.other_messages, vec!["TRIALID 1".to_string()]);

        let latencies: Vec<_> = merged.events.iter().map(|e| e.latency).collect();
        let mut sorted = latencies.clone();
        sorted.sort_unstable();
        assert_eq!(latencies, sorted);
    }

    #[test]
    fn test_merge_skips_rows_not_matching_header() {
        let mut eyes = bundle();
        eyes.movements[0].rows[0].values.push(7.0);
        let labels = vec!["x".to_string()];
        let (merged, stats) = merge(
            &recording(),
            &block(SyncRange { first: 2, last: 15 }, 0.0),
            &eyes,
            &AffineMapping::IDENTITY,
            options(&labels),
        )
        .unwrap();

        assert_eq!(stats.eye_events_malformed, 1);
        assert_eq!(stats.eye_events_added, 0);
        assert_eq!(stats.eye_events_skipped, 1);
        assert_eq!(merged.events.len(), 2);
    }

    #[test]
    fn test_merge_without_optional_imports() {
        let labels = vec!["x".to_string()];
        let (merged, stats) = merge(
            &recording(),
            &block(SyncRange { first: 2, last: 15 }, 0.0),
            &bundle(),
            &AffineMapping::IDENTITY,
            MergeOptions {
                labels: &labels,
                import_eye_events: false,
                import_other_messages: false,
            },
        )
        .unwrap();
        assert_eq!(merged.events.len(), 2);
        assert!(merged.other_messages.is_empty());
        assert_eq!(stats.messages_added, 0);
    }

    #[test]
    fn test_merge_label_mismatch() {
        let labels = vec!["x".to_string(), "y".to_string()];
        let err = merge(
            &recording(),
            &block(SyncRange { first: 2, last: 15 }, 0.0),
            &bundle(),
            &AffineMapping::IDENTITY,
            options(&labels),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SyncError::LabelCountMismatch {
                labels: 2,
                columns: 1
            }
        ));
    }
}
