//! Sample-index alignment between the primary recording and the secondary stream.
//!
//! The start/end anchors give an exact two-point mapping. In regression mode
//! that mapping only serves as a coarse projection to pair up every shared
//! event within `search_radius`, and the final mapping is a least-squares fit
//! over all pairs.

use std::collections::{BTreeMap, BTreeSet};

use contracts::{
    AffineMapping, AlignmentMode, CanonicalEvent, EventCode, EventPair, SyncError, SyncParams,
    SyncRange,
};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, instrument, warn};

/// Rank tolerance for the least-squares design matrix
const RANK_EPS: f64 = 1e-9;

/// Result of the alignment stage
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub mode: AlignmentMode,
    pub mapping: AffineMapping,
    /// Primary samples covered by secondary data
    pub range: SyncRange,
    /// Secondary samples of the start and end anchors
    pub secondary_span: (usize, usize),
    /// Pairs the mapping was derived from
    pub pairs: Vec<EventPair>,
}

impl Alignment {
    pub fn ambiguous_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.ambiguous).count()
    }
}

/// Estimates the secondary → primary mapping
#[derive(Debug, Clone, Copy)]
pub struct Aligner {
    start: EventCode,
    end: EventCode,
    regression: bool,
    search_radius: usize,
}

impl Aligner {
    pub fn new(params: &SyncParams) -> Self {
        Self {
            start: EventCode(params.start_event),
            end: EventCode(params.end_event),
            regression: params.do_regression,
            search_radius: params.search_radius,
        }
    }

    /// Align two canonical event lists.
    ///
    /// `shared` must be the intersection of both code sets.
    #[instrument(
        level = "debug",
        name = "aligner_align",
        skip_all,
        fields(start = %self.start, end = %self.end, regression = self.regression)
    )]
    pub fn align(
        &self,
        primary: &[CanonicalEvent],
        secondary: &[CanonicalEvent],
        shared: &BTreeSet<EventCode>,
    ) -> Result<Alignment, SyncError> {
        for anchor in [self.start, self.end] {
            if !shared.contains(&anchor) {
                return Err(SyncError::AnchorNotShared { code: anchor.0 });
            }
        }

        let range = anchor_span("primary", primary, self.start, self.end)?;
        let secondary_range = anchor_span("secondary", secondary, self.start, self.end)?;

        let coarse = AffineMapping::from_anchors(
            (secondary_range.first as f64, range.first as f64),
            (secondary_range.last as f64, range.last as f64),
        )
        .ok_or(SyncError::DegenerateAnchors {
            stream: "secondary".into(),
            first: secondary_range.first,
            last: secondary_range.last,
        })?;

        debug!(
            slope = coarse.slope,
            intercept = coarse.intercept,
            first = range.first,
            last = range.last,
            "two-point mapping"
        );

        let (mode, mapping, pairs) = if self.regression {
            let pairs = match_events(primary, secondary, shared, &coarse, self.search_radius);
            let mapping = fit_least_squares(&pairs).ok_or(SyncError::InsufficientMatches {
                found: pairs.len(),
            })?;
            warn_on_ambiguity(primary, shared, &pairs, self.search_radius);
            (AlignmentMode::Regression, mapping, pairs)
        } else {
            let pairs = vec![
                EventPair {
                    code: self.start,
                    primary: range.first,
                    secondary: secondary_range.first,
                    ambiguous: false,
                },
                EventPair {
                    code: self.end,
                    primary: range.last,
                    secondary: secondary_range.last,
                    ambiguous: false,
                },
            ];
            (AlignmentMode::TwoPoint, coarse, pairs)
        };

        Ok(Alignment {
            mode,
            mapping,
            range,
            secondary_span: (secondary_range.first, secondary_range.last),
            pairs,
        })
    }
}

/// Earliest `start` and latest `end` occurrence in one stream.
fn anchor_span(
    stream: &str,
    events: &[CanonicalEvent],
    start: EventCode,
    end: EventCode,
) -> Result<SyncRange, SyncError> {
    let first = events
        .iter()
        .filter(|e| e.code == start)
        .map(|e| e.sample)
        .min();
    let last = events
        .iter()
        .filter(|e| e.code == end)
        .map(|e| e.sample)
        .max();

    match (first, last) {
        (Some(first), Some(last)) if first < last => Ok(SyncRange { first, last }),
        (Some(first), Some(last)) => Err(SyncError::DegenerateAnchors {
            stream: stream.into(),
            first,
            last,
        }),
        // shared codes occur in both streams
        _ => Err(SyncError::AnchorNotShared {
            code: if first.is_none() { start.0 } else { end.0 },
        }),
    }
}

/// Pair every shared primary event with its nearest same-code secondary event.
///
/// Candidates are secondary events whose coarse projection lies within
/// `radius` primary samples. The nearest wins; on a distance tie the earlier
/// secondary occurrence wins. A secondary event may serve several primary
/// events.
pub fn match_events(
    primary: &[CanonicalEvent],
    secondary: &[CanonicalEvent],
    shared: &BTreeSet<EventCode>,
    coarse: &AffineMapping,
    radius: usize,
) -> Vec<EventPair> {
    let mut by_code: BTreeMap<EventCode, Vec<usize>> = BTreeMap::new();
    for event in secondary.iter().filter(|e| shared.contains(&e.code)) {
        by_code.entry(event.code).or_default().push(event.sample);
    }
    // positive slope keeps projected order equal to sample order
    for samples in by_code.values_mut() {
        samples.sort_unstable();
    }

    let radius = radius as f64;
    let mut pairs = Vec::new();
    let mut unmatched = 0usize;

    for event in primary {
        let Some(candidates) = by_code.get(&event.code) else {
            continue;
        };
        let target = event.sample as f64;
        let lower = candidates.partition_point(|&s| coarse.apply(s as f64) < target - radius);

        let mut best: Option<(usize, f64)> = None;
        let mut in_range = 0usize;
        for &sample in candidates[lower..]
            .iter()
            .take_while(|&&s| coarse.apply(s as f64) <= target + radius)
        {
            in_range += 1;
            let distance = (coarse.apply(sample as f64) - target).abs();
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((sample, distance));
            }
        }

        match best {
            Some((sample, _)) => pairs.push(EventPair {
                code: event.code,
                primary: event.sample,
                secondary: sample,
                ambiguous: in_range > 1,
            }),
            None => unmatched += 1,
        }
    }

    debug!(matched = pairs.len(), unmatched, "shared events paired");
    pairs
}

/// Least-squares `primary = slope * secondary + intercept`.
///
/// Returns `None` with fewer than two pairs or when every pair sits at the
/// same secondary sample.
pub fn fit_least_squares(pairs: &[EventPair]) -> Option<AffineMapping> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len();
    let x_mean = pairs.iter().map(|p| p.secondary as f64).sum::<f64>() / n as f64;

    // centered design keeps the normal equations well conditioned for long recordings
    let design = DMatrix::from_fn(n, 2, |row, col| match col {
        0 => pairs[row].secondary as f64 - x_mean,
        _ => 1.0,
    });
    let target = DVector::from_iterator(n, pairs.iter().map(|p| p.primary as f64));

    let svd = design.svd(true, true);
    if svd.rank(RANK_EPS) < 2 {
        return None;
    }
    let coef = svd.solve(&target, RANK_EPS).ok()?;
    let slope = coef[0];
    let intercept = coef[1] - slope * x_mean;

    (slope.is_finite() && intercept.is_finite()).then_some(AffineMapping { slope, intercept })
}

/// Warn when same-code primary events sit closer than the search window.
fn warn_on_ambiguity(
    primary: &[CanonicalEvent],
    shared: &BTreeSet<EventCode>,
    pairs: &[EventPair],
    radius: usize,
) {
    let ambiguous = pairs.iter().filter(|p| p.ambiguous).count();
    let window = 2 * radius + 1;

    let mut last_seen: BTreeMap<EventCode, usize> = BTreeMap::new();
    let mut sorted: Vec<_> = primary
        .iter()
        .filter(|e| shared.contains(&e.code))
        .collect();
    sorted.sort_by_key(|e| e.sample);
    let mut crowded = 0usize;
    for event in sorted {
        if let Some(previous) = last_seen.insert(event.code, event.sample) {
            if event.sample - previous < window {
                crowded += 1;
            }
        }
    }

    if ambiguous > 0 || crowded > 0 {
        warn!(
            ambiguous,
            crowded,
            search_radius = radius,
            "same-type events closer than the search window, matching may be ambiguous"
        );
    }
}
