//! Presence and distraction checks

use crate::bucketizer::BucketWindow;
use crate::config::InferenceConfig;
use crate::types::Sample;

/// Share of samples flagged with a visible distraction (0 for no samples)
pub fn distraction_ratio(samples: &[Sample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let flagged = samples.iter().filter(|s| s.distraction_visible).count();
    flagged as f64 / samples.len() as f64
}

/// True when enough samples show a disallowed app on another screen or pane
pub fn is_distracted(samples: &[Sample], config: &InferenceConfig) -> bool {
    !samples.is_empty() && distraction_ratio(samples) >= config.distraction_min_ratio
}

/// True when the user is at the desk reading or reviewing
///
/// Requires enough total mouse travel, idle below the away threshold, and travel
/// spread over enough individual samples. The last check rejects an isolated
/// nudge of the mouse while the user is otherwise away.
pub fn is_actively_present(window: &BucketWindow<'_>, config: &InferenceConfig) -> bool {
    let has_movement = window.total_mouse_distance >= config.mouse_movement_threshold;
    let not_away = window.max_idle < config.idle_away_threshold;
    if !(has_movement && not_away) {
        return false;
    }

    let samples_with_movement = window
        .samples
        .iter()
        .filter(|s| s.mouse_distance > 0.0)
        .count();
    samples_with_movement >= config.mouse_movement_min_samples
}
