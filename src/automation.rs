//! Anti-automation detection
//!
//! Auto-clickers and key repeaters clear interaction thresholds with input that
//! is too regular to be human: real typing pauses (zero samples) and varies from
//! sample to sample. A bucket is flagged only when both signals are suspicious,
//! so short focused bursts of genuine typing are not punished.

use crate::config::InferenceConfig;
use crate::types::Sample;
use std::collections::HashSet;

/// Buckets with fewer samples than this are never flagged
pub const MIN_SAMPLES_FOR_DETECTION: usize = 10;

/// Per-bucket statistics behind the automation verdict
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionPattern {
    /// Share of samples with zero keystrokes and clicks
    pub zero_ratio: f64,
    /// Number of distinct per-sample interaction counts
    pub distinct_values: usize,
}

impl InteractionPattern {
    /// Measure a sample list; `None` when there are no samples
    pub fn measure(samples: &[Sample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut distinct = HashSet::new();
        let mut zeros = 0usize;
        for sample in samples {
            let value = sample.interaction();
            if value == 0 {
                zeros += 1;
            }
            distinct.insert(value);
        }

        Some(Self {
            zero_ratio: zeros as f64 / samples.len() as f64,
            distinct_values: distinct.len(),
        })
    }
}

/// True when the samples look machine-generated
pub fn is_suspicious(samples: &[Sample], config: &InferenceConfig) -> bool {
    if samples.len() < MIN_SAMPLES_FOR_DETECTION {
        return false;
    }

    let Some(pattern) = InteractionPattern::measure(samples) else {
        return false;
    };

    let low_zeros = pattern.zero_ratio < config.min_zero_sample_ratio;
    let low_variety = pattern.distinct_values < config.min_distinct_values;

    low_zeros && low_variety
}
