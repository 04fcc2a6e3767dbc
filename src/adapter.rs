//! Sample adapter
//!
//! Parses agent samples from JSON and prepares them for inference: validation,
//! optional title dropping, user filtering and ordering.

use crate::error::InferenceError;
use crate::types::Sample;
use tracing::warn;

/// Parse a JSON array of samples
pub fn parse_array(json: &str) -> Result<Vec<Sample>, InferenceError> {
    serde_json::from_str(json)
        .map_err(|e| InferenceError::ParseError(format!("Failed to parse sample array: {}", e)))
}

/// Parse NDJSON (one sample per line, blank lines ignored)
pub fn parse_ndjson(ndjson: &str) -> Result<Vec<Sample>, InferenceError> {
    let mut samples = Vec::new();
    for (line_num, line) in ndjson.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<Sample>(trimmed) {
            Ok(sample) => samples.push(sample),
            Err(e) => {
                return Err(InferenceError::ParseError(format!(
                    "Failed to parse line {}: {}",
                    line_num + 1,
                    e
                )));
            }
        }
    }
    Ok(samples)
}

/// A problem found in one sample
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SampleIssue {
    pub index: usize,
    pub message: String,
}

impl From<SampleIssue> for InferenceError {
    fn from(issue: SampleIssue) -> Self {
        InferenceError::InvalidSample {
            index: issue.index,
            message: issue.message,
        }
    }
}

/// Check the numeric fields a count type cannot already guard
pub fn validate_sample(index: usize, sample: &Sample) -> Result<(), SampleIssue> {
    for (field, value) in [
        ("mouse_distance", sample.mouse_distance),
        ("idle_seconds", sample.idle_seconds),
    ] {
        if !value.is_finite() {
            return Err(SampleIssue {
                index,
                message: format!("{} must be a finite number, got {}", field, value),
            });
        }
        if value < 0.0 {
            return Err(SampleIssue {
                index,
                message: format!("{} must be >= 0, got {}", field, value),
            });
        }
    }
    Ok(())
}

/// Every invalid sample, in input order
pub fn validate_samples(samples: &[Sample]) -> Vec<SampleIssue> {
    samples
        .iter()
        .enumerate()
        .filter_map(|(i, s)| validate_sample(i, s).err())
        .collect()
}

/// Fail on the first invalid sample
pub fn ensure_valid(samples: &[Sample]) -> Result<(), InferenceError> {
    match validate_samples(samples).into_iter().next() {
        Some(issue) => Err(issue.into()),
        None => Ok(()),
    }
}

/// Blank every window title (data minimisation)
pub fn drop_titles(samples: &mut [Sample]) {
    let mut dropped = 0usize;
    for sample in samples.iter_mut() {
        if !sample.window_title.is_empty() {
            sample.window_title.clear();
            dropped += 1;
        }
    }
    if dropped > 0 {
        warn!(dropped, "window titles discarded before inference");
    }
}

/// Keep only the samples for one user
pub fn filter_user(samples: Vec<Sample>, user_id: &str) -> Vec<Sample> {
    samples.into_iter().filter(|s| s.user_id == user_id).collect()
}

/// Stable re-sort by timestamp, for callers that cannot guarantee ordering
pub fn sort_samples(samples: &mut [Sample]) {
    let already_sorted = samples
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp);
    if !already_sorted {
        warn!(count = samples.len(), "samples arrived out of order; re-sorting");
        samples.sort_by_key(|s| s.timestamp);
    }
}

/// Distinct user ids, sorted
pub fn user_ids(samples: &[Sample]) -> Vec<String> {
    let mut ids: Vec<String> = samples.iter().map(|s| s.user_id.clone()).collect();
    ids.sort();
    ids.dedup();
    ids
}
