use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use worktrace_flux::adapter;
use worktrace_flux::types::{ClassificationRule, ProductivityState, Sample};
use worktrace_flux::{
    app_breakdown, bucketize, samples_to_report, summarize, InferenceConfig, InferenceError,
    InferencePipeline,
};

/// NDJSON for `count` one-second samples starting at 09:00:00 + `offset`
fn ndjson(offset: i64, count: i64, fields: Value) -> String {
    let t0 = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let mut line = fields.clone();
            line["timestamp"] = json!((t0 + Duration::seconds(offset + i)).to_rfc3339());
            line.to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse(input: &str) -> Vec<Sample> {
    adapter::parse_ndjson(input).unwrap()
}

#[test]
fn test_non_productive_app_beats_heavy_typing() {
    let samples = parse(&ndjson(
        0,
        10,
        json!({"app_name": "Steam", "window_title": "Store", "keystroke_count": 6, "mouse_clicks": 3}),
    ));
    let buckets = bucketize(&samples, &InferenceConfig::default()).unwrap();

    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].rule, ClassificationRule::NonProductiveApp);
    assert_eq!(buckets[0].state, ProductivityState::NonProductive);
}

#[test]
fn test_idle_meeting_is_productive() {
    let samples = parse(&ndjson(
        0,
        10,
        json!({"app_name": "zoom.us", "window_title": "Zoom Meeting", "idle_seconds": 9.0}),
    ));
    let buckets = bucketize(&samples, &InferenceConfig::default()).unwrap();

    assert_eq!(buckets[0].rule, ClassificationRule::MeetingApp);
    assert_eq!(buckets[0].state, ProductivityState::Productive);
}

#[test]
fn test_metronomic_typing_is_flagged() {
    let config = InferenceConfig {
        bucket_width_sec: 20,
        ..InferenceConfig::default()
    };
    let samples = parse(&ndjson(
        0,
        20,
        json!({"app_name": "Code", "window_title": "main.rs", "keystroke_count": 1}),
    ));
    let buckets = bucketize(&samples, &config).unwrap();

    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].sample_count, 20);
    assert_eq!(buckets[0].total_keystrokes, 20);
    assert_eq!(buckets[0].rule, ClassificationRule::AutomationSuspected);
    assert_eq!(buckets[0].state, ProductivityState::NonProductive);
}

#[test]
fn test_visible_distraction_blocks_presence() {
    let reading = json!({"app_name": "Preview", "window_title": "report.pdf", "mouse_distance": 5.0});
    let mut distracted = reading.clone();
    distracted["distraction_visible"] = json!(true);

    // 4 of 10 samples show a distraction: ratio 0.4 >= 0.3
    let input = [ndjson(0, 6, reading.clone()), ndjson(6, 4, distracted)].join("\n");
    let buckets = bucketize(&parse(&input), &InferenceConfig::default()).unwrap();
    assert!(buckets[0].distracted);
    assert_eq!(buckets[0].rule, ClassificationRule::NoActivity);
    assert!(buckets[0].confidence <= 0.8);

    // Same movement without the distraction counts as presence
    let buckets = bucketize(&parse(&ndjson(0, 10, reading)), &InferenceConfig::default()).unwrap();
    assert_eq!(buckets[0].rule, ClassificationRule::Presence);
    assert_eq!(buckets[0].state, ProductivityState::Productive);
}

#[test]
fn test_sparse_buckets_skip_gaps() {
    let code = json!({"app_name": "Code", "window_title": "main.rs", "keystroke_count": 2});
    let input = [ndjson(0, 5, code.clone()), ndjson(95, 3, code)].join("\n");
    let buckets = bucketize(&parse(&input), &InferenceConfig::default()).unwrap();

    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[1].start - buckets[0].start, Duration::seconds(90));
    assert_eq!(buckets[1].sample_count, 3);
}

#[test]
fn test_browser_breakdown_labels() {
    let input = [
        ndjson(0, 10, json!({"app_name": "Chrome", "window_title": "Funny Cat Video - YouTube"})),
        ndjson(10, 10, json!({"app_name": "Chrome", "window_title": "Inbox (3) - Gmail", "mouse_distance": 5.0})),
        ndjson(20, 10, json!({"app_name": "Chrome", "window_title": "Cats compilation - YouTube"})),
    ]
    .join("\n");
    let config = InferenceConfig::default();
    let buckets = bucketize(&parse(&input), &config).unwrap();
    let breakdown = app_breakdown(&buckets, &config);

    let keys: Vec<&str> = breakdown.iter().map(|e| e.app_name.as_str()).collect();
    assert_eq!(keys, vec!["Chrome — Youtube", "Chrome — Gmail"]);
    assert_eq!(breakdown[0].total_seconds, 20);
    assert_eq!(breakdown[0].category, ProductivityState::NonProductive);
    assert_eq!(breakdown[1].category, ProductivityState::Productive);
}

#[test]
fn test_summary_totals() {
    let input = [
        ndjson(0, 5, json!({"app_name": "Code", "keystroke_count": 3})),
        ndjson(5, 5, json!({"app_name": "Code"})),
        ndjson(10, 10, json!({"app_name": "Netflix"})),
        ndjson(20, 5, json!({"app_name": "Code", "keystroke_count": 1})),
        ndjson(25, 5, json!({"app_name": "Code"})),
    ]
    .join("\n");
    let summary = summarize(&bucketize(&parse(&input), &InferenceConfig::default()).unwrap());

    assert_eq!(summary.states.productive, 20);
    assert_eq!(summary.states.non_productive, 10);
    assert_eq!(summary.total_seconds, 30);
    assert_eq!(summary.total_buckets, 3);
    assert_eq!(summary.percent(ProductivityState::Productive), 66.7);
}

#[test]
fn test_preconditions_fail_fast() {
    let mut samples = parse(&ndjson(0, 5, json!({"app_name": "Code"})));
    samples.swap(1, 3);
    assert!(matches!(
        bucketize(&samples, &InferenceConfig::default()),
        Err(InferenceError::UnsortedSamples { index: 2 })
    ));

    let config = InferenceConfig {
        bucket_width_sec: 0,
        ..InferenceConfig::default()
    };
    assert!(matches!(
        bucketize(&[], &config),
        Err(InferenceError::InvalidBucketWidth(0))
    ));
}

#[test]
fn test_report_from_json_array() {
    let typing = json!({"user_id": "alice", "app_name": "Code", "window_title": "lib.rs", "keystroke_count": 2});
    let mut pause = typing.clone();
    pause["keystroke_count"] = json!(0);
    let samples = parse(&[ndjson(0, 5, typing), ndjson(5, 5, pause)].join("\n"));
    let json = serde_json::to_string(&samples).unwrap();
    let report: Value =
        serde_json::from_str(&samples_to_report(&json, &InferenceConfig::default()).unwrap()).unwrap();

    assert_eq!(report["report_version"], "1.0.0");
    assert_eq!(report["provenance"]["user_ids"], json!(["alice"]));
    assert_eq!(report["provenance"]["range_start_utc"], "2024-03-04T09:00:00+00:00");
    assert_eq!(report["summary"]["productive"], 10);
    assert_eq!(report["buckets"][0]["state"], "productive");
    assert_eq!(report["buckets"][0]["rule"], "interaction");
    assert_eq!(report["buckets"][0]["event_count"], 10);
    assert_eq!(report["apps"][0]["app_name"], "Code");
}

#[test]
fn test_pipeline_from_config_json() {
    let config = InferenceConfig::from_json(
        r#"{"bucket_width_sec": 5, "non_productive_apps": ["Hacker News"], "drop_titles": false}"#,
    )
    .unwrap();
    let pipeline = InferencePipeline::new(config).unwrap();

    let samples = pipeline
        .prepare(parse(&ndjson(
            0,
            10,
            json!({"app_name": "Firefox", "window_title": "Hacker News", "keystroke_count": 2}),
        )))
        .unwrap();
    let breakdown = pipeline.app_breakdown(&samples).unwrap();

    assert_eq!(breakdown.len(), 1);
    assert_eq!(breakdown[0].app_name, "Firefox — Hacker news");
    assert_eq!(breakdown[0].states.non_productive, 10);
}

#[test]
fn test_mixed_case_patterns_match_without_normalizing() {
    let config = InferenceConfig {
        non_productive_apps: vec!["YouTube".to_string()],
        browser_apps: vec!["Chrome".to_string()],
        ..InferenceConfig::default()
    };
    let typing = json!({"app_name": "Google Chrome", "window_title": "Funny - YouTube", "keystroke_count": 3});
    let mut pause = typing.clone();
    pause["keystroke_count"] = json!(0);
    let samples = parse(&[ndjson(0, 5, typing), ndjson(5, 5, pause)].join("\n"));

    let buckets = bucketize(&samples, &config).unwrap();
    assert_eq!(buckets[0].rule, ClassificationRule::NonProductiveApp);
    assert_eq!(buckets[0].state, ProductivityState::NonProductive);

    let breakdown = app_breakdown(&buckets, &config);
    assert_eq!(breakdown[0].app_name, "Google Chrome — Youtube");
}
