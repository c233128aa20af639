//! Synchronization pipeline: validate → extract → match → align → resample → merge.

use std::fmt;

use contracts::{
    AffineMapping, AlignmentMode, EyetrackBundle, Recording, SyncError, SyncParams,
    SyncQualityReport, SyncRange,
};
use ingestion::extract_events;
use observability::record_quality_metrics;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::aligner::Aligner;
use crate::matcher::shared_codes;
use crate::merge::{merge, MergeOptions, MergeStats};
use crate::quality::estimate_quality;
use crate::resample::resample;

/// Human-readable audit record of one synchronization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncSummary {
    pub recording: String,
    pub mode: AlignmentMode,
    pub mapping: AffineMapping,
    pub range: SyncRange,
    /// Secondary samples of the start and end anchors
    pub secondary_anchors: (usize, usize),
    pub shared_event_types: usize,
    pub matched_pairs: usize,
    pub ambiguous_pairs: usize,
    pub mean_abs_residual: f64,
    pub max_abs_residual: f64,
    /// Nominal rate of the secondary stream (Hz)
    pub secondary_srate: f64,
    /// Secondary rate implied by the fitted slope (Hz)
    pub estimated_secondary_srate: f64,
    pub merge: MergeStats,
    /// Anti-alias filtering was requested but is not performed
    pub filter_skipped: bool,
    /// Quality table should be handed to an external plotter
    pub plot_requested: bool,
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            AlignmentMode::TwoPoint => "two-point",
            AlignmentMode::Regression => "regression",
        };
        writeln!(f, "recording:            {}", self.recording)?;
        writeln!(f, "alignment mode:       {mode}")?;
        writeln!(
            f,
            "mapping:              primary = {:.9} * secondary + {:.6}",
            self.mapping.slope, self.mapping.intercept
        )?;
        writeln!(
            f,
            "synchronized range:   samples {}..={} ({} samples)",
            self.range.first,
            self.range.last,
            self.range.len()
        )?;
        writeln!(
            f,
            "secondary anchors:    samples {} and {}",
            self.secondary_anchors.0, self.secondary_anchors.1
        )?;
        writeln!(f, "shared event types:   {}", self.shared_event_types)?;
        writeln!(
            f,
            "matched pairs:        {} ({} ambiguous)",
            self.matched_pairs, self.ambiguous_pairs
        )?;
        writeln!(
            f,
            "residual (samples):   mean |r| = {:.4}, max |r| = {:.4}",
            self.mean_abs_residual, self.max_abs_residual
        )?;
        writeln!(
            f,
            "secondary rate (Hz):  nominal {:.3}, estimated {:.3}",
            self.secondary_srate, self.estimated_secondary_srate
        )?;
        writeln!(
            f,
            "channels added:       {}",
            self.merge.channels_added.join(", ")
        )?;
        writeln!(
            f,
            "eye events:           {} added, {} outside range, {} malformed",
            self.merge.eye_events_added, self.merge.eye_events_skipped, self.merge.eye_events_malformed
        )?;
        writeln!(f, "messages carried:     {}", self.merge.messages_added)?;
        if self.filter_skipped {
            writeln!(f, "note: anti-alias filtering requested but not performed")?;
        }
        if self.plot_requested {
            writeln!(f, "note: sync-quality table exported for plotting")?;
        }
        Ok(())
    }
}

/// Result of a successful synchronization
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// Primary recording with appended channels, events and quality report
    pub recording: Recording,
    pub quality: SyncQualityReport,
    pub mapping: AffineMapping,
    pub range: SyncRange,
    pub summary: SyncSummary,
}

/// Eye-tracking synchronization engine
#[derive(Debug, Clone)]
pub struct EyeSyncEngine {
    params: SyncParams,
}

impl EyeSyncEngine {
    pub fn new(params: SyncParams) -> Self {
        Self { params }
    }

    /// Align `bundle` to `recording` and return the merged recording.
    ///
    /// Every precondition is checked before anything is built; on error no
    /// partial result exists. `recording` is never mutated.
    #[instrument(
        name = "eye_sync",
        skip_all,
        fields(
            recording = %recording.name,
            start = self.params.start_event,
            end = self.params.end_event,
        )
    )]
    pub fn synchronize(
        &self,
        recording: &Recording,
        bundle: &EyetrackBundle,
    ) -> Result<SyncOutcome, SyncError> {
        self.check_preconditions(recording, bundle)?;
        let params = &self.params;

        let primary = extract_events("primary", &recording.events)?;
        let secondary = extract_events("secondary", &bundle.events)?;
        let shared = shared_codes(&primary, &secondary)?;

        let alignment = Aligner::new(params).align(&primary, &secondary, &shared)?;
        if params.filter_eyetrack {
            warn!("anti-alias filtering of secondary data requested but not performed");
        }

        let block = resample(
            bundle.samples.view(),
            &params.import_columns,
            &alignment.mapping,
            alignment.range,
        )?;
        let quality = estimate_quality(&alignment.pairs, &alignment.mapping, alignment.mode);

        let (mut merged, merge_stats) = merge(
            recording,
            &block,
            bundle,
            &alignment.mapping,
            MergeOptions {
                labels: &params.new_labels,
                import_eye_events: params.import_eye_events,
                import_other_messages: params.import_other_messages,
            },
        )?;
        merged.sync_quality = Some(quality.clone());
        record_quality_metrics(&quality);

        let summary = SyncSummary {
            recording: recording.name.clone(),
            mode: alignment.mode,
            mapping: alignment.mapping,
            range: alignment.range,
            secondary_anchors: alignment.secondary_span,
            shared_event_types: shared.len(),
            matched_pairs: alignment.pairs.len(),
            ambiguous_pairs: alignment.ambiguous_count(),
            mean_abs_residual: quality.mean_abs_residual,
            max_abs_residual: quality.max_abs_residual,
            secondary_srate: bundle.srate,
            estimated_secondary_srate: recording.srate / alignment.mapping.slope,
            merge: merge_stats,
            filter_skipped: params.filter_eyetrack,
            plot_requested: params.plot_fig,
        };

        info!(
            mode = ?summary.mode,
            slope = summary.mapping.slope,
            intercept = summary.mapping.intercept,
            pairs = summary.matched_pairs,
            mean_abs_residual = summary.mean_abs_residual,
            "synchronization complete"
        );

        Ok(SyncOutcome {
            recording: merged,
            mapping: alignment.mapping,
            range: alignment.range,
            quality,
            summary,
        })
    }

    fn check_preconditions(
        &self,
        recording: &Recording,
        bundle: &EyetrackBundle,
    ) -> Result<(), SyncError> {
        if recording.is_epoched() {
            return Err(SyncError::EpochedPrimary {
                trials: recording.trials,
            });
        }
        if recording.samples() == 0 {
            return Err(SyncError::EmptyRecording {
                stream: "primary".into(),
            });
        }
        if bundle.is_empty() {
            return Err(SyncError::EmptyRecording {
                stream: "secondary".into(),
            });
        }
        if !(recording.srate.is_finite() && recording.srate > 0.0) {
            return Err(SyncError::inconsistent(format!(
                "primary sampling rate must be > 0, got {}",
                recording.srate
            )));
        }

        let params = &self.params;
        if params.import_columns.is_empty() {
            return Err(SyncError::invalid_parameter(
                "import_columns",
                "select at least one column",
            ));
        }
        if let Some(&column) = params
            .import_columns
            .iter()
            .find(|&&c| c >= bundle.columns())
        {
            return Err(SyncError::ColumnOutOfRange {
                column,
                available: bundle.columns(),
            });
        }
        if params.new_labels.len() != params.import_columns.len() {
            return Err(SyncError::LabelCountMismatch {
                labels: params.new_labels.len(),
                columns: params.import_columns.len(),
            });
        }
        if params.search_radius == 0 {
            return Err(SyncError::invalid_parameter(
                "search_radius",
                "must be >= 1",
            ));
        }
        Ok(())
    }
}
