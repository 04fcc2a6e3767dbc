//! Time bucketing
//!
//! Partitions a time-ordered sample list into fixed-width windows anchored to the
//! first sample's timestamp and aggregates each window. Only windows that contain
//! at least one sample are produced.

use crate::error::InferenceError;
use crate::types::Sample;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Placeholder app name when the dominant app is blank
pub const UNKNOWN_APP: &str = "unknown";

/// Aggregates for one non-empty window, borrowing its member samples
#[derive(Debug, Clone)]
pub struct BucketWindow<'a> {
    /// Window index relative to the first sample
    pub index: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Member samples, in input order
    pub samples: &'a [Sample],
    pub total_keystrokes: u64,
    pub total_clicks: u64,
    pub total_mouse_distance: f64,
    /// Max per-sample idle, each value capped at the bucket width
    pub max_idle: f64,
    pub dominant_app: String,
    pub dominant_title: String,
}

impl BucketWindow<'_> {
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn total_interaction(&self) -> u64 {
        self.total_keystrokes + self.total_clicks
    }
}

/// Check that samples are ascending by timestamp
///
/// Returns the index of the first sample that is earlier than its predecessor.
pub fn ensure_sorted(samples: &[Sample]) -> Result<(), InferenceError> {
    match samples
        .windows(2)
        .position(|pair| pair[1].timestamp < pair[0].timestamp)
    {
        Some(pos) => Err(InferenceError::UnsortedSamples { index: pos + 1 }),
        None => Ok(()),
    }
}

/// Group samples into windows of `width_sec` seconds
///
/// Window index is `floor((t - t0) / width)`; a window starts at `t0 + index * width`.
/// Fails fast on a zero width or unsorted input.
pub fn group_windows(samples: &[Sample], width_sec: u32) -> Result<Vec<BucketWindow<'_>>, InferenceError> {
    if width_sec == 0 {
        return Err(InferenceError::InvalidBucketWidth(width_sec));
    }
    ensure_sorted(samples)?;

    let Some(first) = samples.first() else {
        return Ok(Vec::new());
    };
    let first_ts = first.timestamp;
    let width_ms = i64::from(width_sec) * 1000;

    // Sorted input keeps every window's members contiguous.
    let mut windows = Vec::new();
    let mut run_start = 0;
    let mut run_index = 0;

    for (pos, sample) in samples.iter().enumerate() {
        let index = (sample.timestamp - first_ts).num_milliseconds().div_euclid(width_ms);
        if index != run_index {
            windows.push(build_window(
                run_index,
                first_ts,
                width_sec,
                &samples[run_start..pos],
            ));
            run_start = pos;
            run_index = index;
        }
    }
    windows.push(build_window(run_index, first_ts, width_sec, &samples[run_start..]));

    Ok(windows)
}

fn build_window<'a>(
    index: i64,
    first_ts: DateTime<Utc>,
    width_sec: u32,
    samples: &'a [Sample],
) -> BucketWindow<'a> {
    let width = i64::from(width_sec);
    let start = first_ts + Duration::seconds(index * width);
    let end = start + Duration::seconds(width);

    let total_keystrokes = samples.iter().map(|s| u64::from(s.keystroke_count)).sum();
    let total_clicks = samples.iter().map(|s| u64::from(s.mouse_clicks)).sum();
    let total_mouse_distance = samples.iter().map(|s| s.mouse_distance).sum();

    // A sample reported after sleep/hibernate can carry an inflated idle value;
    // no sample may claim more idle time than its bucket.
    let cap = f64::from(width_sec);
    let max_idle = samples
        .iter()
        .map(|s| s.idle_seconds.min(cap))
        .fold(0.0, f64::max);

    let (dominant_app, dominant_title) = dominant_pair(samples);

    BucketWindow {
        index,
        start,
        end,
        samples,
        total_keystrokes,
        total_clicks,
        total_mouse_distance,
        max_idle,
        dominant_app,
        dominant_title,
    }
}

/// Most frequent exact (app, title) pair
///
/// Ties go to the pair that appears first, which on sorted input is the pair
/// with the earliest timestamp. A blank app name becomes [`UNKNOWN_APP`].
pub fn dominant_pair(samples: &[Sample]) -> (String, String) {
    // pair -> (count, first position)
    let mut counts: HashMap<(&str, &str), (usize, usize)> = HashMap::new();
    for (pos, sample) in samples.iter().enumerate() {
        let entry = counts
            .entry((sample.app_name.as_str(), sample.window_title.as_str()))
            .or_insert((0, pos));
        entry.0 += 1;
    }

    let best = counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        });

    match best {
        Some(((app, title), _)) => {
            let app = if app.trim().is_empty() { UNKNOWN_APP } else { app };
            (app.to_string(), title.to_string())
        }
        None => (UNKNOWN_APP.to_string(), String::new()),
    }
}
