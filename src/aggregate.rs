//! Bucket aggregation
//!
//! Reducers over an already-classified bucket list: totals by state, and a
//! per-application breakdown that splits browser time by website.

use crate::config::InferenceConfig;
use crate::types::{
    AppBreakdownEntry, Bucket, NonProductiveApp, ProductivityState, StateSeconds, Summary,
};
use std::collections::HashMap;

/// Title separators tried in order when extracting a site name
const TITLE_DELIMITERS: [&str; 4] = [" - ", " — ", " | ", " · "];

/// Longest site label kept from a title
const MAX_SITE_LABEL_CHARS: usize = 40;

/// Label used when a browser title is blank
pub const OTHER_SITE: &str = "Other";

/// Separator between browser and site in breakdown keys
pub const SITE_SEPARATOR: &str = " — ";

/// Sum bucket durations per state
pub fn summarize(buckets: &[Bucket]) -> Summary {
    let mut states = StateSeconds::default();
    for bucket in buckets {
        states.add(bucket.state, bucket.duration_sec());
    }

    Summary {
        states,
        total_seconds: states.total(),
        total_buckets: buckets.len(),
    }
}

/// True when the app name contains a configured browser pattern (case-insensitive)
pub fn is_browser(app_name: &str, config: &InferenceConfig) -> bool {
    let name = app_name.to_lowercase();
    config.browser_apps.iter().any(|b| name.contains(&b.to_lowercase()))
}

/// Human-readable site name from a browser window title
///
/// First match wins: a non-productive pattern (capitalized), a meeting pattern
/// (title-cased), the segment after the last title delimiter, then the title
/// itself. Labels are cut to 40 characters.
pub fn extract_site_label(window_title: &str, config: &InferenceConfig) -> String {
    if window_title.trim().is_empty() {
        return OTHER_SITE.to_string();
    }

    let title_lower = window_title.to_lowercase();

    if let Some(pattern) = config
        .non_productive_apps
        .iter()
        .find(|p| title_lower.contains(&p.to_lowercase()))
    {
        return capitalize(pattern);
    }

    if let Some(pattern) = config
        .meeting_apps
        .iter()
        .find(|p| title_lower.contains(&p.to_lowercase()))
    {
        return title_case(pattern);
    }

    for delimiter in TITLE_DELIMITERS {
        if let Some((_, tail)) = window_title.rsplit_once(delimiter) {
            let segment = tail.trim();
            if !segment.is_empty() {
                return truncate_chars(segment, MAX_SITE_LABEL_CHARS);
            }
        }
    }

    truncate_chars(window_title, MAX_SITE_LABEL_CHARS)
}

/// Breakdown key for a bucket: the app, or `"app — site"` for browsers
pub fn breakdown_key(bucket: &Bucket, config: &InferenceConfig) -> String {
    if is_browser(&bucket.dominant_app, config) {
        let site = extract_site_label(&bucket.dominant_title, config);
        format!("{}{}{}", bucket.dominant_app, SITE_SEPARATOR, site)
    } else {
        bucket.dominant_app.clone()
    }
}

/// Time per app (and per site for browsers), longest first
///
/// Entries with equal totals keep the order in which their key first appeared.
pub fn app_breakdown(buckets: &[Bucket], config: &InferenceConfig) -> Vec<AppBreakdownEntry> {
    let mut order: Vec<(String, StateSeconds)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for bucket in buckets {
        let key = breakdown_key(bucket, config);
        let pos = match positions.get(&key) {
            Some(&pos) => pos,
            None => {
                order.push((key.clone(), StateSeconds::default()));
                positions.insert(key, order.len() - 1);
                order.len() - 1
            }
        };
        order[pos].1.add(bucket.state, bucket.duration_sec());
    }

    let mut entries: Vec<AppBreakdownEntry> = order
        .into_iter()
        .map(|(app_name, states)| {
            let total_seconds = states.total();
            let category = if states.productive * 2 > total_seconds {
                ProductivityState::Productive
            } else {
                ProductivityState::NonProductive
            };
            AppBreakdownEntry {
                app_name,
                category,
                total_seconds,
                states,
            }
        })
        .collect();

    // Stable sort keeps first-seen order among ties
    entries.sort_by(|a, b| b.total_seconds.cmp(&a.total_seconds));
    entries
}

/// Breakdown rows that carry non-productive time, most time first
pub fn non_productive_apps(breakdown: &[AppBreakdownEntry]) -> Vec<NonProductiveApp> {
    let mut apps: Vec<NonProductiveApp> = breakdown
        .iter()
        .filter(|e| e.states.non_productive > 0)
        .map(|e| NonProductiveApp {
            app_name: e.app_name.clone(),
            seconds: e.states.non_productive,
        })
        .collect();
    apps.sort_by(|a, b| b.seconds.cmp(&a.seconds));
    apps
}

/// Upper-case the first character, lower-case the rest
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Upper-case every letter that follows a non-letter, lower-case the others
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
