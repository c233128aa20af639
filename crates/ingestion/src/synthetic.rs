//! Synthetic session source
//!
//! Generates a primary recording and an eye-tracking bundle that share marker
//! events under a known clock relation. Used for tests and demos without real data.

use contracts::{
    AffineMapping, ChannelInfo, Event, EventType, Eye, EyeMovementRow, EyeMovementTable,
    EyetrackBundle, MovementKind, Recording,
};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Column holding the secondary sample index as gaze-x ramp
pub const RAMP_COLUMN: usize = 1;
/// Column holding a constant value
pub const CONSTANT_COLUMN: usize = 2;
/// Value stored in [`CONSTANT_COLUMN`]
pub const CONSTANT_VALUE: f64 = 5.0;

/// Synthetic session configuration
#[derive(Debug, Clone)]
pub struct SyntheticSessionConfig {
    /// Primary sampling rate (Hz)
    pub primary_srate: f64,

    /// Secondary sampling rate (Hz)
    pub secondary_srate: f64,

    /// Primary sample count
    pub primary_samples: usize,

    /// Primary channel count
    pub channels: usize,

    /// Secondary sample index at primary sample 0
    pub secondary_offset: f64,

    /// Relative clock drift of the secondary stream
    pub drift: f64,

    /// Marker codes, cycled through
    pub event_codes: Vec<i64>,

    /// Primary samples between markers
    pub event_interval: usize,

    /// Max absolute timing jitter on secondary markers (secondary samples)
    pub jitter: f64,

    /// RNG seed for jitter
    pub seed: u64,

    /// Write primary markers as `"S <code>"` labels
    pub label_events: bool,
}

impl Default for SyntheticSessionConfig {
    fn default() -> Self {
        Self {
            primary_srate: 500.0,
            secondary_srate: 1000.0,
            primary_samples: 10_000,
            channels: 2,
            secondary_offset: 40.0,
            drift: 0.0,
            event_codes: vec![10, 20, 30],
            event_interval: 250,
            jitter: 0.0,
            seed: 7,
            label_events: false,
        }
    }
}

/// Synthetic session generator
#[derive(Debug, Clone)]
pub struct SyntheticSession {
    config: SyntheticSessionConfig,
}

impl SyntheticSession {
    pub fn new(config: SyntheticSessionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SyntheticSessionConfig {
        &self.config
    }

    /// Secondary samples per primary sample, drift included
    fn ratio(&self) -> f64 {
        self.config.secondary_srate / self.config.primary_srate * (1.0 + self.config.drift)
    }

    /// Exact secondary position of a primary sample
    pub fn secondary_position(&self, primary: f64) -> f64 {
        self.config.secondary_offset + primary * self.ratio()
    }

    /// Ground-truth secondary → primary mapping
    pub fn true_mapping(&self) -> AffineMapping {
        let ratio = self.ratio();
        AffineMapping {
            slope: 1.0 / ratio,
            intercept: -self.config.secondary_offset / ratio,
        }
    }

    /// Primary marker positions, first one at one interval in
    pub fn primary_event_samples(&self) -> Vec<usize> {
        let interval = self.config.event_interval.max(1);
        (1..)
            .map(|k| k * interval)
            .take_while(|&s| s < self.config.primary_samples)
            .collect()
    }

    /// Generate the primary recording and the secondary bundle
    pub fn generate(&self) -> (Recording, EyetrackBundle) {
        let cfg = &self.config;
        let mut rng = StdRng::seed_from_u64(cfg.seed);

        let data = Array2::from_shape_fn((cfg.channels, cfg.primary_samples), |(c, t)| {
            (t as f64 * 0.01 * (c + 1) as f64).sin()
        });
        let channels = (0..cfg.channels)
            .map(|c| ChannelInfo::new(format!("E{}", c + 1)))
            .collect();
        let mut recording = Recording::continuous(cfg.primary_srate, data, channels);
        recording.name = "synthetic".to_string();

        let last_secondary = self.secondary_position(cfg.primary_samples as f64 - 1.0);
        let rows = last_secondary.ceil().max(0.0) as usize + 50;
        let samples = Array2::from_shape_fn((rows, 3), |(r, c)| match c {
            0 => r as f64 / cfg.secondary_srate * 1000.0,
            RAMP_COLUMN => r as f64,
            _ => CONSTANT_VALUE,
        });

        let mut secondary_events = Vec::new();
        let mut fixations = Vec::new();
        for (k, primary) in self.primary_event_samples().into_iter().enumerate() {
            let code = cfg.event_codes[k % cfg.event_codes.len().max(1)];
            recording.events.push(Event {
                kind: if cfg.label_events {
                    EventType::Label(format!("S {code}"))
                } else {
                    EventType::Code(code)
                },
                latency: primary,
                duration: None,
                fields: Default::default(),
            });

            let jitter = if cfg.jitter > 0.0 {
                rng.random_range(-cfg.jitter..=cfg.jitter)
            } else {
                0.0
            };
            let position = (self.secondary_position(primary as f64) + jitter).round();
            let secondary = position.clamp(0.0, (rows - 1) as f64) as usize;
            secondary_events.push(Event::new(code, secondary));

            let start = secondary + 20;
            let end = (start + 200).min(rows - 1);
            if start < end {
                fixations.push(EyeMovementRow {
                    eye: Eye::Right,
                    start,
                    end,
                    values: vec![(end - start + 1) as f64, start as f64],
                });
            }
        }

        debug!(
            primary_events = recording.events.len(),
            secondary_rows = rows,
            "synthetic session generated"
        );

        let bundle = EyetrackBundle {
            srate: cfg.secondary_srate,
            samples,
            colheader: vec!["TIME".into(), "R_GAZE_X".into(), "R_PUPIL".into()],
            events: secondary_events,
            movements: vec![EyeMovementTable {
                kind: MovementKind::Fixation,
                colheader: vec!["duration".into(), "pos_x".into()],
                rows: fixations,
            }],
            other_messages: vec!["MSG 0 !MODE RECORD CR 1000 2 1 R".into()],
        };

        (recording, bundle)
    }
}
