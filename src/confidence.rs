//! Confidence scoring
//!
//! Blends four evidence terms, each clamped to [0, 1] before weighting:
//!
//! ```text
//! confidence = 0.35 * density + 0.20 * presence + 0.25 * coverage + 0.20 * idle_penalty
//! ```
//!
//! The weighted sum is clamped to [0, 1]; a distracted bucket is then scaled by
//! 0.8, so its ceiling is 0.8.

use crate::bucketizer::BucketWindow;
use crate::config::InferenceConfig;

const WEIGHT_DENSITY: f64 = 0.35;
const WEIGHT_PRESENCE: f64 = 0.20;
const WEIGHT_COVERAGE: f64 = 0.25;
const WEIGHT_IDLE: f64 = 0.20;

/// Multiplier applied when focus is split with a visible distraction
pub const DISTRACTION_PENALTY: f64 = 0.8;

/// Raw inputs to the scorer, decoupled from the window type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInputs {
    pub total_interaction: u64,
    pub total_mouse_distance: f64,
    pub max_idle: f64,
    pub sample_count: usize,
    pub distracted: bool,
}

impl ConfidenceInputs {
    pub fn from_window(window: &BucketWindow<'_>, distracted: bool) -> Self {
        Self {
            total_interaction: window.total_interaction(),
            total_mouse_distance: window.total_mouse_distance,
            max_idle: window.max_idle,
            sample_count: window.sample_count(),
            distracted,
        }
    }
}

/// Confidence in [0, 1]; zero for an empty bucket
pub fn score(inputs: &ConfidenceInputs, config: &InferenceConfig) -> f64 {
    if inputs.sample_count == 0 {
        return 0.0;
    }

    let interaction_threshold = config.interaction_threshold.max(1) as f64;
    let movement_threshold = config.mouse_movement_threshold.max(1.0);
    let width = f64::from(config.bucket_width_sec.max(1));

    let density = unit(inputs.total_interaction as f64 / interaction_threshold);
    let presence = unit(inputs.total_mouse_distance / movement_threshold);
    let coverage = unit(inputs.sample_count as f64 / width);
    let idle_penalty = 1.0 - unit(inputs.max_idle / width);

    let raw = WEIGHT_DENSITY * density
        + WEIGHT_PRESENCE * presence
        + WEIGHT_COVERAGE * coverage
        + WEIGHT_IDLE * idle_penalty;
    let clamped = unit(raw);

    if inputs.distracted {
        clamped * DISTRACTION_PENALTY
    } else {
        clamped
    }
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
