//! Overweighter implementation.

use contracts::{OverweightParams, Recording, SyncError};
use ndarray::{s, Array2, Axis};
use observability::record_overweight_metrics;
use tracing::{debug, info, instrument};

/// Result of an overweighting pass
#[derive(Debug, Clone)]
pub struct OverweightOutcome {
    /// Flattened recording with the tiled block appended
    pub recording: Recording,
    /// Complete windows extracted
    pub windows: usize,
    /// Occurrences whose window left the data
    pub skipped: usize,
    /// Samples per window
    pub window_width: usize,
    /// Samples appended
    pub appended: usize,
}

/// Event-window overweighter
#[derive(Debug, Clone)]
pub struct Overweighter {
    params: OverweightParams,
}

impl Overweighter {
    pub fn new(params: OverweightParams) -> Self {
        Self { params }
    }

    /// Window bounds in samples relative to the event onset, half-open.
    pub fn window_offsets(&self, srate: f64) -> Result<(i64, i64), SyncError> {
        let [before, after] = self.params.time_window;
        if !(before.is_finite() && after.is_finite()) {
            return Err(SyncError::invalid_parameter(
                "time_window",
                "bounds must be finite",
            ));
        }
        let start = (before * srate).round() as i64;
        let end = (after * srate).round() as i64;
        if end - start <= 0 {
            return Err(SyncError::invalid_parameter(
                "time_window",
                format!(
                    "window [{before}, {after}] s spans {} samples at {srate} Hz",
                    end - start
                ),
            ));
        }
        Ok((start, end))
    }

    /// Append tiled event windows to a copy of `recording`.
    ///
    /// Epoched input is flattened first. With `proportion == 0` the flattened
    /// copy is returned as is.
    #[instrument(
        name = "overweight",
        skip_all,
        fields(
            recording = %recording.name,
            event_type = %self.params.event_type,
            proportion = self.params.proportion,
        )
    )]
    pub fn apply(&self, recording: &Recording) -> Result<OverweightOutcome, SyncError> {
        let proportion = self.params.proportion;
        if !(proportion.is_finite() && proportion >= 0.0) {
            return Err(SyncError::invalid_parameter(
                "proportion",
                format!("must be a finite value >= 0, got {proportion}"),
            ));
        }

        let mut flat = recording.clone().flatten();
        flat.validate()?;
        let (start, end) = self.window_offsets(flat.srate)?;
        let width = (end - start) as usize;

        let samples = flat.samples();
        let target = (proportion * samples as f64).round() as usize;
        if target == 0 {
            debug!("nothing to append");
            return Ok(OverweightOutcome {
                recording: flat,
                windows: 0,
                skipped: 0,
                window_width: width,
                appended: 0,
            });
        }

        let onsets: Vec<usize> = flat
            .events
            .iter()
            .filter(|e| e.kind.to_string() == self.params.event_type)
            .map(|e| e.latency)
            .collect();
        let starts: Vec<usize> = onsets
            .iter()
            .filter_map(|&onset| {
                let begin = onset as i64 + start;
                (begin >= 0 && begin + width as i64 <= samples as i64).then_some(begin as usize)
            })
            .collect();
        let skipped = onsets.len() - starts.len();

        let extracted = starts.len() * width;
        if extracted == 0 {
            return Err(SyncError::EmptyOverweightWindow {
                event_type: self.params.event_type.clone(),
                occurrences: onsets.len(),
            });
        }

        let channels = flat.nbchan();
        let mut block = Array2::zeros((channels, extracted));
        for (k, &begin) in starts.iter().enumerate() {
            let mut window = block.slice_mut(s![.., k * width..(k + 1) * width]);
            window.assign(&flat.data.slice(s![.., begin..begin + width]));
            if self.params.remove_window_mean {
                if let Some(means) = window.mean_axis(Axis(1)) {
                    window -= &means.insert_axis(Axis(1));
                }
            }
        }

        let mut data = Array2::zeros((channels, samples + target));
        data.slice_mut(s![.., ..samples]).assign(&flat.data);
        for (offset, mut column) in data
            .slice_mut(s![.., samples..])
            .axis_iter_mut(Axis(1))
            .enumerate()
        {
            column.assign(&block.column(offset % extracted));
        }

        flat.data = data;
        flat.pnts = samples + target;

        record_overweight_metrics(&self.params.event_type, starts.len(), target);
        info!(
            windows = starts.len(),
            skipped,
            width,
            appended = target,
            "event windows appended"
        );

        Ok(OverweightOutcome {
            recording: flat,
            windows: starts.len(),
            skipped,
            window_width: width,
            appended: target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use contracts::{ChannelInfo, Event};

    /// 2 channels, 1000 samples at 100 Hz, channel 0 = sample index
    fn recording() -> Recording {
        let data = Array2::from_shape_fn((2, 1000), |(c, t)| if c == 0 { t as f64 } else { 1.0 });
        let mut rec = Recording::continuous(
            100.0,
            data,
            vec![ChannelInfo::new("E1"), ChannelInfo::new("E2")],
        );
        rec.events = vec![
            Event::new("R_fixation", 100),
            Event::new(12, 300),
            Event::new("R_fixation", 500),
            Event::new("R_fixation", 995),
        ];
        rec
    }

    fn params(proportion: f64) -> OverweightParams {
        OverweightParams {
            event_type: "R_fixation".into(),
            time_window: [-0.1, 0.2],
            proportion,
            remove_window_mean: false,
        }
    }

    #[test]
    fn test_zero_proportion_is_identity() {
        let rec = recording();
        let outcome = Overweighter::new(params(0.0)).apply(&rec).unwrap();
        assert_eq!(outcome.recording.data, rec.data);
        assert_eq!(outcome.recording.pnts, 1000);
        assert_eq!(outcome.appended, 0);
    }

    #[test]
    fn test_zero_proportion_keeps_event_order() {
        let mut rec = recording();
        rec.events.reverse();
        let outcome = Overweighter::new(params(0.0)).apply(&rec).unwrap();
        assert_eq!(outcome.recording, rec);
    }

    #[test]
    fn test_appends_requested_proportion() {
        let rec = recording();
        let outcome = Overweighter::new(params(0.5)).apply(&rec).unwrap();

        assert_eq!(outcome.window_width, 30);
        assert_eq!(outcome.windows, 2);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.appended, 500);
        assert_eq!(outcome.recording.samples(), 1500);
        assert_eq!(outcome.recording.pnts, 1500);
        assert_eq!(outcome.recording.events, rec.events);

        // windows start at 90 and 490, tiled in event order
        let tail = outcome.recording.data.slice(s![0, 1000..]).to_vec();
        assert_eq!(tail[0], 90.0);
        assert_eq!(tail[29], 119.0);
        assert_eq!(tail[30], 490.0);
        assert_eq!(tail[60], 90.0);
        assert!(outcome.recording.data.slice(s![1, 1000..]).iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_truncates_when_windows_exceed_target() {
        let rec = recording();
        // target = round(0.04 * 1000) = 40 < 2 * 30
        let outcome = Overweighter::new(params(0.04)).apply(&rec).unwrap();
        let tail = outcome.recording.data.slice(s![0, 1000..]).to_vec();
        let expected: Vec<f64> = (90..120).chain(490..500).map(|v| v as f64).collect();
        assert_eq!(tail, expected);
    }

    #[test]
    fn test_remove_window_mean() {
        let rec = recording();
        let mut p = params(0.06);
        p.remove_window_mean = true;
        let outcome = Overweighter::new(p).apply(&rec).unwrap();
        let tail = outcome.recording.data.slice(s![.., 1000..]).to_owned();
        for window in [tail.slice(s![.., 0..30]), tail.slice(s![.., 30..60])] {
            for row in window.rows() {
                assert_abs_diff_eq!(row.sum(), 0.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_no_matching_windows_errors() {
        let mut p = params(0.5);
        p.event_type = "L_blink".into();
        let err = Overweighter::new(p).apply(&recording()).unwrap_err();
        assert!(matches!(
            err,
            SyncError::EmptyOverweightWindow { occurrences: 0, .. }
        ));
    }

    #[test]
    fn test_non_positive_window_errors() {
        let mut p = params(0.5);
        p.time_window = [0.2, 0.2];
        assert!(matches!(
            Overweighter::new(p).apply(&recording()),
            Err(SyncError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_numeric_event_type() {
        let mut p = params(0.1);
        p.event_type = "12".into();
        let outcome = Overweighter::new(p).apply(&recording()).unwrap();
        assert_eq!(outcome.windows, 1);
        assert_eq!(outcome.recording.data[[0, 1000]], 290.0);
    }

    #[test]
    fn test_epoched_input_is_flattened() {
        let mut rec = recording();
        rec.pnts = 500;
        rec.trials = 2;
        let outcome = Overweighter::new(params(0.0)).apply(&rec).unwrap();
        assert_eq!(outcome.recording.trials, 1);
        assert_eq!(outcome.recording.pnts, 1000);
    }
}
