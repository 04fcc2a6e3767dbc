//! Core data types
//!
//! This module defines the samples that enter the inference pipeline, the
//! buckets it produces, and the summaries derived from those buckets.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Productivity state assigned to a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductivityState {
    Productive,
    NonProductive,
}

impl ProductivityState {
    /// Every state, in reporting order
    pub const ALL: [ProductivityState; 2] =
        [ProductivityState::Productive, ProductivityState::NonProductive];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductivityState::Productive => "productive",
            ProductivityState::NonProductive => "non_productive",
        }
    }
}

impl fmt::Display for ProductivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Which step of the classification cascade decided a bucket's state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationRule {
    /// Dominant app/title matched the always-non-productive list
    NonProductiveApp,
    /// Dominant app/title matched the meeting list
    MeetingApp,
    /// Interaction cleared a threshold
    Interaction,
    /// Interaction cleared a threshold but looked machine-generated
    AutomationSuspected,
    /// Sustained mouse presence with no visible distraction
    Presence,
    /// Nothing qualified
    NoActivity,
}

impl ClassificationRule {
    /// State implied by the rule
    pub fn state(&self) -> ProductivityState {
        match self {
            ClassificationRule::MeetingApp
            | ClassificationRule::Interaction
            | ClassificationRule::Presence => ProductivityState::Productive,
            ClassificationRule::NonProductiveApp
            | ClassificationRule::AutomationSuspected
            | ClassificationRule::NoActivity => ProductivityState::NonProductive,
        }
    }
}

fn default_user_id() -> String {
    "default".to_string()
}

fn default_app_name() -> String {
    "unknown".to_string()
}

/// One activity sample reported by the desktop agent (roughly one per second)
///
/// Absent fields fall back to neutral values so a sparse payload still parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Sample timestamp
    pub timestamp: DateTime<Utc>,
    /// Employee identifier
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// Application in focus
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Window or tab title
    #[serde(default)]
    pub window_title: String,
    /// Keystrokes during the interval (count only)
    #[serde(default)]
    pub keystroke_count: u32,
    /// Mouse clicks during the interval
    #[serde(default)]
    pub mouse_clicks: u32,
    /// Approximate mouse travel in pixels during the interval
    #[serde(default)]
    pub mouse_distance: f64,
    /// OS idle time at sampling, in seconds
    #[serde(default)]
    pub idle_seconds: f64,
    /// A disallowed app is visible on another monitor, split view or PiP
    #[serde(default)]
    pub distraction_visible: bool,
}

impl Sample {
    /// Keystrokes plus clicks for this sample
    pub fn interaction(&self) -> u32 {
        self.keystroke_count.saturating_add(self.mouse_clicks)
    }
}

/// A fixed-width time window with aggregated telemetry and one classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Window start (inclusive)
    pub start: DateTime<Utc>,
    /// Window end (exclusive), always `start + bucket width`
    pub end: DateTime<Utc>,
    /// Assigned state
    pub state: ProductivityState,
    /// Cascade step that produced `state`
    pub rule: ClassificationRule,
    /// Evidence strength in [0, 1]
    pub confidence: f64,
    pub total_keystrokes: u64,
    pub total_clicks: u64,
    pub total_mouse_distance: f64,
    /// Largest per-sample idle value, each capped at the bucket width
    pub max_idle: f64,
    pub dominant_app: String,
    pub dominant_title: String,
    /// Number of samples that fell in the window
    pub sample_count: usize,
    /// Whether enough samples flagged a visible distraction
    pub distracted: bool,
}

impl Bucket {
    /// Window length in whole seconds
    pub fn duration_sec(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    /// Keystrokes plus clicks across the window
    pub fn total_interaction(&self) -> u64 {
        self.total_keystrokes + self.total_clicks
    }
}

/// Seconds spent in each state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSeconds {
    pub productive: i64,
    pub non_productive: i64,
}

impl StateSeconds {
    pub fn get(&self, state: ProductivityState) -> i64 {
        match state {
            ProductivityState::Productive => self.productive,
            ProductivityState::NonProductive => self.non_productive,
        }
    }

    pub fn add(&mut self, state: ProductivityState, seconds: i64) {
        match state {
            ProductivityState::Productive => self.productive += seconds,
            ProductivityState::NonProductive => self.non_productive += seconds,
        }
    }

    /// Sum over all states
    pub fn total(&self) -> i64 {
        ProductivityState::ALL.iter().map(|s| self.get(*s)).sum()
    }
}

/// Totals-by-state over a bucket list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(flatten)]
    pub states: StateSeconds,
    pub total_seconds: i64,
    pub total_buckets: usize,
}

impl Summary {
    /// Share of tracked time in `state`, as a percentage rounded to one decimal
    pub fn percent(&self, state: ProductivityState) -> f64 {
        if self.total_seconds == 0 {
            return 0.0;
        }
        let pct = self.states.get(state) as f64 / self.total_seconds as f64 * 100.0;
        (pct * 10.0).round() / 10.0
    }
}

/// One row of the per-application breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppBreakdownEntry {
    /// App name, or `"app — site"` for browsers
    pub app_name: String,
    /// `productive` when productive time exceeds half the total
    pub category: ProductivityState,
    pub total_seconds: i64,
    pub states: StateSeconds,
}

/// Summary for one local calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub summary: Summary,
}

/// Time attributed to a non-productive app or site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonProductiveApp {
    pub app_name: String,
    pub seconds: i64,
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Report provenance information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProvenance {
    /// Distinct user ids seen in the input, sorted
    pub user_ids: Vec<String>,
    pub range_start_utc: Option<String>,
    pub range_end_utc: Option<String>,
    pub computed_at_utc: String,
    pub bucket_width_sec: u32,
}

/// Bucket as it appears in an encoded report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportBucket {
    pub start: String,
    pub end: String,
    pub state: ProductivityState,
    pub rule: ClassificationRule,
    pub confidence: f64,
    pub total_keystrokes: u64,
    pub total_clicks: u64,
    pub total_mouse_distance: f64,
    pub max_idle: f64,
    pub dominant_app: String,
    pub dominant_title: String,
    pub event_count: usize,
}

/// Complete productivity report payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductivityReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub summary: Summary,
    pub apps: Vec<AppBreakdownEntry>,
    pub buckets: Vec<ReportBucket>,
}
