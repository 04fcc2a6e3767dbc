//! Inference configuration
//!
//! All numeric thresholds are tuned relative to `bucket_width_sec`. Changing the
//! width without rescaling the thresholds changes classifier behavior; keeping
//! them consistent is the caller's job.
//!
//! Resolution used by the CLI: built-in defaults → JSON file → `WORKTRACE_*`
//! environment variables. The inference core itself only ever sees a resolved
//! [`InferenceConfig`].

use crate::error::InferenceError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "WORKTRACE_";

/// Largest accepted day-boundary offset (14 hours, in minutes)
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

const DEFAULT_MEETING_APPS: &[&str] = &[
    "zoom",
    "microsoft teams",
    "google meet",
    "webex",
    "facetime",
    "slack huddle",
    "discord call",
    "skype",
    "around",
    "tuple",
    "gather",
];

const DEFAULT_NON_PRODUCTIVE_APPS: &[&str] = &[
    "youtube",
    "netflix",
    "reddit",
    "twitter",
    "x.com",
    "instagram",
    "facebook",
    "tiktok",
    "twitch",
    "discord",
    "spotify",
    "steam",
    "epic games",
];

const DEFAULT_BROWSER_APPS: &[&str] = &[
    "safari",
    "google chrome",
    "chrome",
    "firefox",
    "microsoft edge",
    "msedge",
    "brave browser",
    "brave",
    "arc",
    "chromium",
    "opera",
];

/// Thresholds and app lists driving the classifier (defaults tuned for 10 s buckets)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Bucket width in seconds
    pub bucket_width_sec: u32,

    /// Combined keystrokes + clicks needed for the interaction rule
    pub interaction_threshold: u64,
    /// Keystrokes alone needed for the interaction rule
    pub keystroke_threshold: u64,
    /// Clicks alone needed for the interaction rule
    pub click_threshold: u64,

    /// Mouse travel (pixels) per bucket that suggests someone is at the desk
    pub mouse_movement_threshold: f64,
    /// Idle seconds beyond which the user is considered away
    pub idle_away_threshold: f64,
    /// Samples with nonzero mouse travel needed for presence to count as sustained
    pub mouse_movement_min_samples: usize,

    /// Below this share of zero-interaction samples, input looks machine-driven
    pub min_zero_sample_ratio: f64,
    /// Below this many distinct per-sample counts, input looks machine-driven
    pub min_distinct_values: usize,

    /// Share of distraction-flagged samples that blocks the presence rule
    pub distraction_min_ratio: f64,

    /// Always productive (matched against lower-cased "app title")
    pub meeting_apps: Vec<String>,
    /// Always non-productive
    pub non_productive_apps: Vec<String>,
    /// Apps whose titles are split into per-site breakdown rows
    pub browser_apps: Vec<String>,

    /// Offset from UTC used to find local day boundaries for daily summaries
    pub utc_offset_minutes: i32,
    /// Blank window titles before inference
    pub drop_titles: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            bucket_width_sec: 10,
            interaction_threshold: 2,
            keystroke_threshold: 1,
            click_threshold: 1,
            mouse_movement_threshold: 8.0,
            idle_away_threshold: 30.0,
            mouse_movement_min_samples: 3,
            min_zero_sample_ratio: 0.25,
            min_distinct_values: 2,
            distraction_min_ratio: 0.3,
            meeting_apps: to_owned_list(DEFAULT_MEETING_APPS),
            non_productive_apps: to_owned_list(DEFAULT_NON_PRODUCTIVE_APPS),
            browser_apps: to_owned_list(DEFAULT_BROWSER_APPS),
            utc_offset_minutes: 0,
            drop_titles: false,
        }
    }
}

impl InferenceConfig {
    /// Parse a (possibly partial) JSON config; unspecified fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        let config: InferenceConfig = serde_json::from_str(json)?;
        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn from_file(path: &Path) -> Result<Self, InferenceError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            InferenceError::ParseError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, InferenceError> {
        serde_json::to_string_pretty(self).map_err(|e| InferenceError::EncodingError(e.to_string()))
    }

    /// Trim and lower-case the pattern lists, dropping empty entries
    pub fn normalized(mut self) -> Self {
        self.meeting_apps = normalize_patterns(&self.meeting_apps);
        self.non_productive_apps = normalize_patterns(&self.non_productive_apps);
        self.browser_apps = normalize_patterns(&self.browser_apps);
        self
    }

    /// Apply `WORKTRACE_*` environment overrides on top of this config
    pub fn with_env_overrides(self) -> Result<Self, InferenceError> {
        self.with_overrides(|key| std::env::var(format!("{}{}", ENV_PREFIX, key)).ok())
    }

    /// Apply overrides from an arbitrary key lookup (keys are upper-case field names)
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, InferenceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("BUCKET_WIDTH_SEC") {
            self.bucket_width_sec = parse_value("bucket_width_sec", &v)?;
        }
        if let Some(v) = lookup("INTERACTION_THRESHOLD") {
            self.interaction_threshold = parse_value("interaction_threshold", &v)?;
        }
        if let Some(v) = lookup("KEYSTROKE_THRESHOLD") {
            self.keystroke_threshold = parse_value("keystroke_threshold", &v)?;
        }
        if let Some(v) = lookup("CLICK_THRESHOLD") {
            self.click_threshold = parse_value("click_threshold", &v)?;
        }
        if let Some(v) = lookup("MOUSE_MOVEMENT_THRESHOLD") {
            self.mouse_movement_threshold = parse_value("mouse_movement_threshold", &v)?;
        }
        if let Some(v) = lookup("IDLE_AWAY_THRESHOLD") {
            self.idle_away_threshold = parse_value("idle_away_threshold", &v)?;
        }
        if let Some(v) = lookup("MOUSE_MOVEMENT_MIN_SAMPLES") {
            self.mouse_movement_min_samples = parse_value("mouse_movement_min_samples", &v)?;
        }
        if let Some(v) = lookup("MIN_ZERO_SAMPLE_RATIO") {
            self.min_zero_sample_ratio = parse_value("min_zero_sample_ratio", &v)?;
        }
        if let Some(v) = lookup("MIN_DISTINCT_VALUES") {
            self.min_distinct_values = parse_value("min_distinct_values", &v)?;
        }
        if let Some(v) = lookup("DISTRACTION_MIN_RATIO") {
            self.distraction_min_ratio = parse_value("distraction_min_ratio", &v)?;
        }
        if let Some(v) = lookup("MEETING_APPS") {
            self.meeting_apps = split_list(&v);
        }
        if let Some(v) = lookup("NON_PRODUCTIVE_APPS") {
            self.non_productive_apps = split_list(&v);
        }
        if let Some(v) = lookup("BROWSER_APPS") {
            self.browser_apps = split_list(&v);
        }
        if let Some(v) = lookup("UTC_OFFSET_MINUTES") {
            self.utc_offset_minutes = parse_value("utc_offset_minutes", &v)?;
        }
        if let Some(v) = lookup("DROP_TITLES") {
            self.drop_titles = matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes");
        }

        let config = self.normalized();
        config.validate()?;
        Ok(config)
    }

    /// Check semantic constraints
    pub fn validate(&self) -> Result<(), InferenceError> {
        if self.bucket_width_sec == 0 {
            return Err(InferenceError::InvalidBucketWidth(self.bucket_width_sec));
        }

        check_non_negative("mouse_movement_threshold", self.mouse_movement_threshold)?;
        check_non_negative("idle_away_threshold", self.idle_away_threshold)?;
        check_ratio("min_zero_sample_ratio", self.min_zero_sample_ratio)?;
        check_ratio("distraction_min_ratio", self.distraction_min_ratio)?;

        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(InferenceError::InvalidConfig {
                field: "utc_offset_minutes".to_string(),
                message: format!(
                    "must be within ±{} minutes, got {}",
                    MAX_UTC_OFFSET_MINUTES, self.utc_offset_minutes
                ),
            });
        }

        Ok(())
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn normalize_patterns(patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(|s| s.to_string()).collect()
}

fn parse_value<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, InferenceError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| InferenceError::InvalidConfig {
            field: field.to_string(),
            message: format!("cannot parse {:?}: {}", value, e),
        })
}

fn check_non_negative(field: &str, value: f64) -> Result<(), InferenceError> {
    if !value.is_finite() || value < 0.0 {
        return Err(InferenceError::InvalidConfig {
            field: field.to_string(),
            message: format!("must be a finite non-negative number, got {}", value),
        });
    }
    Ok(())
}

fn check_ratio(field: &str, value: f64) -> Result<(), InferenceError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(InferenceError::InvalidConfig {
            field: field.to_string(),
            message: format!("must be within [0, 1], got {}", value),
        });
    }
    Ok(())
}
