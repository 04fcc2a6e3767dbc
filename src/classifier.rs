//! Bucket state classification
//!
//! An ordered cascade, first match wins:
//!
//! 1. dominant app/title matches a non-productive pattern → `non_productive`
//! 2. dominant app/title matches a meeting pattern → `productive`
//! 3. interaction clears a threshold → `productive`, unless the input looks
//!    automated, in which case `non_productive`
//! 4. no visible distraction and sustained physical presence → `productive`
//! 5. otherwise → `non_productive`
//!
//! A visible distraction does not override rule 3; it only lowers confidence.

use crate::automation;
use crate::bucketizer::BucketWindow;
use crate::config::InferenceConfig;
use crate::presence;
use crate::types::ClassificationRule;

/// First pattern contained in the `"app title"` string, ignoring case on both sides
pub fn match_pattern<'p>(app: &str, title: &str, patterns: &'p [String]) -> Option<&'p str> {
    let combined = format!("{} {}", app, title).to_lowercase();
    patterns
        .iter()
        .find(|p| combined.contains(&p.to_lowercase()))
        .map(String::as_str)
}

/// True when any interaction threshold is met
pub fn meets_interaction_threshold(keystrokes: u64, clicks: u64, config: &InferenceConfig) -> bool {
    keystrokes + clicks >= config.interaction_threshold
        || keystrokes >= config.keystroke_threshold
        || clicks >= config.click_threshold
}

/// Run the cascade for one window
///
/// `distracted` is the window's distraction flag, computed once by the caller
/// and shared with the confidence scorer.
pub fn classify(
    window: &BucketWindow<'_>,
    distracted: bool,
    config: &InferenceConfig,
) -> ClassificationRule {
    let app = window.dominant_app.as_str();
    let title = window.dominant_title.as_str();

    if match_pattern(app, title, &config.non_productive_apps).is_some() {
        return ClassificationRule::NonProductiveApp;
    }

    if match_pattern(app, title, &config.meeting_apps).is_some() {
        return ClassificationRule::MeetingApp;
    }

    if meets_interaction_threshold(window.total_keystrokes, window.total_clicks, config) {
        return if automation::is_suspicious(window.samples, config) {
            ClassificationRule::AutomationSuspected
        } else {
            ClassificationRule::Interaction
        };
    }

    if !distracted && presence::is_actively_present(window, config) {
        return ClassificationRule::Presence;
    }

    ClassificationRule::NoActivity
}
