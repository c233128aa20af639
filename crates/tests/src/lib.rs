//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - configuration → engine → dispatcher flow on synthetic sessions
//! - interchange files written by the file sink load back unchanged
//! - synchronization followed by overweighting

#[cfg(test)]
mod contract_tests {
    use contracts::{AffineMapping, Recording};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
        assert_eq!(AffineMapping::IDENTITY.apply(3.0), 3.0);
    }

    #[test]
    fn test_recording_json_shape() {
        let recording: Recording = serde_json::from_str(
            r#"{
                "srate": 250.0,
                "pnts": 3,
                "data": {"v": 1, "dim": [1, 3], "data": [0.0, 1.0, 2.0]},
                "channels": [{"label": "Fz"}],
                "events": [{"type": "S 12", "latency": 1}]
            }"#,
        )
        .unwrap();
        assert_eq!(recording.trials, 1);
        assert_eq!(recording.nbchan(), 1);
        assert!(recording.sync_quality.is_none());
    }

    #[test]
    fn test_recording_floats_survive_json() {
        let values = [250.02565005465198, 9749.948711826113, 0.1 + 0.2, 1.0 / 3.0];
        let recording = Recording::continuous(
            499.97,
            ndarray::Array2::from_shape_vec((1, 4), values.to_vec()).unwrap(),
            vec![contracts::ChannelInfo::new("Fz")],
        );
        let text = serde_json::to_string(&recording).unwrap();
        let back: Recording = serde_json::from_str(&text).unwrap();
        assert_eq!(back, recording);
    }
}

#[cfg(test)]
mod e2e_tests {
    use approx::assert_abs_diff_eq;
    use augment::Overweighter;
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{EventType, EYE_CHANNEL_KIND};
    use dispatcher::{DispatcherBuilder, JobKind, JobReport, QUALITY_FILE, SUMMARY_FILE};
    use ingestion::{
        SyntheticSession, SyntheticSessionConfig, CONSTANT_COLUMN, CONSTANT_VALUE, RAMP_COLUMN,
    };
    use sync_engine::EyeSyncEngine;
    use tempfile::tempdir;

    const JOB: &str = r#"
[sync]
start_event = 10
end_event = 30
import_columns = [1, 2]
new_labels = ["R_GAZE_X [px]", "R_PUPIL"]
import_eye_events = true

[overweight]
event_type = "R_fixation"
time_window = [0.0, 0.2]
proportion = 0.25
remove_window_mean = true
"#;

    /// End-to-end test: synthetic session -> config -> engine -> file sink -> reload
    ///
    /// 1. SyntheticSession generates a recording and an eye-tracking bundle
    /// 2. EyeSyncEngine merges gaze channels and fixation events
    /// 3. Dispatcher writes the merged recording, quality table and summary
    /// 4. The written recording loads back through the interchange loader
    #[test]
    fn test_e2e_synthetic_pipeline() {
        let dir = tempdir().unwrap();
        let mut config = ConfigLoader::load_from_str(JOB, ConfigFormat::Toml).unwrap();
        config.output.dir = dir.path().to_path_buf();
        config.output.log_summary = true;

        let session = SyntheticSession::new(SyntheticSessionConfig {
            drift: 1e-4,
            label_events: true,
            ..Default::default()
        });
        let (recording, bundle) = session.generate();

        let sync_params = config.sync.clone().unwrap();
        let outcome = EyeSyncEngine::new(sync_params)
            .synchronize(&recording, &bundle)
            .unwrap();

        let truth = session.true_mapping();
        assert_abs_diff_eq!(outcome.mapping.slope, truth.slope, epsilon = 1e-4);
        assert!(outcome.quality.max_abs_residual < 1.0);

        let merged = &outcome.recording;
        let base = recording.nbchan();
        assert_eq!(merged.nbchan(), base + 2);
        assert_eq!(merged.channels[base].label, "R-GAZE-X (px)");
        assert_eq!(merged.channels[base + 1].kind, EYE_CHANNEL_KIND);

        // ramp column holds the secondary sample index
        let gaze = merged.data.row(base);
        for p in [outcome.range.first, 5_000, outcome.range.last] {
            assert_abs_diff_eq!(gaze[p], session.secondary_position(p as f64), epsilon = 1.0);
        }
        let pupil = merged.data.row(base + 1);
        assert_eq!(pupil[outcome.range.first - 1], 0.0);
        assert_eq!(pupil[outcome.range.last + 1], 0.0);
        assert_abs_diff_eq!(pupil[outcome.range.first], CONSTANT_VALUE);

        let fixations = merged
            .events
            .iter()
            .filter(|e| e.kind == EventType::Label("R_fixation".into()))
            .count();
        assert_eq!(fixations, outcome.summary.merge.eye_events_added);
        assert!(fixations > 0);

        let mut dispatcher = DispatcherBuilder::from_config(&config.output)
            .unwrap()
            .build();
        let summary = outcome.summary.to_string();
        let delivered = dispatcher
            .dispatch(&JobReport {
                kind: JobKind::Sync,
                recording: merged,
                quality: Some(&outcome.quality),
                summary: &summary,
            })
            .into_result()
            .unwrap();
        assert_eq!(delivered.len(), 2);

        let written = dir.path().join("synthetic_sync.json");
        let reloaded = ingestion::load_recording(&written).unwrap();
        assert_eq!(reloaded.nbchan(), merged.nbchan());
        assert_eq!(reloaded.data, merged.data);
        assert_eq!(reloaded.events.len(), merged.events.len());
        assert_eq!(reloaded.sync_quality.as_ref(), Some(&outcome.quality));
        assert!(dir.path().join(QUALITY_FILE).exists());
        let text = std::fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap();
        assert!(text.contains("regression"));
    }

    #[test]
    fn test_sync_then_overweight() {
        let config = ConfigLoader::load_from_str(JOB, ConfigFormat::Toml).unwrap();
        let session = SyntheticSession::new(SyntheticSessionConfig::default());
        let (recording, bundle) = session.generate();

        let synced = EyeSyncEngine::new(config.sync.clone().unwrap())
            .synchronize(&recording, &bundle)
            .unwrap();
        let samples = synced.recording.samples();

        let augmented = Overweighter::new(config.overweight.clone().unwrap())
            .apply(&synced.recording)
            .unwrap();
        let expected = (0.25 * samples as f64).round() as usize;
        assert_eq!(augmented.appended, expected);
        assert_eq!(augmented.recording.samples(), samples + expected);
        assert_eq!(augmented.recording.events, synced.recording.events);
        assert_eq!(augmented.window_width, 100);
        assert!(augmented.windows > 0);
    }

    #[test]
    fn test_two_point_and_regression_agree_without_jitter() {
        let session = SyntheticSession::new(SyntheticSessionConfig::default());
        let (recording, bundle) = session.generate();
        let mut params = contracts::SyncParams::new(10, 30, vec![RAMP_COLUMN], vec!["x".into()]);

        params.do_regression = false;
        let two_point = EyeSyncEngine::new(params.clone())
            .synchronize(&recording, &bundle)
            .unwrap();
        params.do_regression = true;
        params.import_columns = vec![CONSTANT_COLUMN];
        let regression = EyeSyncEngine::new(params)
            .synchronize(&recording, &bundle)
            .unwrap();

        assert_eq!(two_point.range, regression.range);
        assert_abs_diff_eq!(two_point.mapping.slope, regression.mapping.slope, epsilon = 1e-9);
        assert_abs_diff_eq!(
            two_point.mapping.intercept,
            regression.mapping.intercept,
            epsilon = 1e-6
        );
        assert_eq!(two_point.quality.rows.len(), 2);
    }
}
