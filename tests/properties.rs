use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use worktrace_flux::types::Sample;
use worktrace_flux::{app_breakdown, bucketize, summarize, InferenceConfig};

const APPS: [(&str, &str); 5] = [
    ("Code", "main.rs"),
    ("Google Chrome", "Pull requests - GitHub"),
    ("Google Chrome", "Shorts - YouTube"),
    ("zoom.us", "Zoom Meeting"),
    ("Terminal", ""),
];

prop_compose! {
    fn arb_sample()(
        gap in 0i64..40,
        keys in 0u32..6,
        clicks in 0u32..3,
        distance in 0.0f64..60.0,
        idle in 0.0f64..120.0,
        distracted in any::<bool>(),
        app in 0usize..APPS.len(),
    ) -> (i64, Sample) {
        let (app_name, title) = APPS[app];
        let sample = Sample {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
            user_id: "prop".to_string(),
            app_name: app_name.to_string(),
            window_title: title.to_string(),
            keystroke_count: keys,
            mouse_clicks: clicks,
            mouse_distance: distance,
            idle_seconds: idle,
            distraction_visible: distracted,
        };
        (gap, sample)
    }
}

/// Time-ordered samples: each one is `gap` seconds after its predecessor
fn arb_samples() -> impl Strategy<Value = Vec<Sample>> {
    prop::collection::vec(arb_sample(), 1..200).prop_map(|raw| {
        let mut elapsed = 0;
        raw.into_iter()
            .map(|(gap, mut sample)| {
                elapsed += gap;
                sample.timestamp = sample.timestamp + Duration::seconds(elapsed);
                sample
            })
            .collect()
    })
}

fn config_with_width(width: u32) -> InferenceConfig {
    InferenceConfig {
        bucket_width_sec: width,
        ..InferenceConfig::default()
    }
}

proptest! {
    #[test]
    fn buckets_are_disjoint_and_exact_width(samples in arb_samples(), width in 1u32..=60) {
        let buckets = bucketize(&samples, &config_with_width(width)).unwrap();
        let first = samples[0].timestamp;

        prop_assert!(!buckets.is_empty());
        prop_assert_eq!(buckets[0].start, first);
        for bucket in &buckets {
            prop_assert_eq!(bucket.duration_sec(), i64::from(width));
            prop_assert!(bucket.sample_count >= 1);
            prop_assert_eq!((bucket.start - first).num_seconds() % i64::from(width), 0);
        }
        for pair in buckets.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }

        let covered: usize = buckets.iter().map(|b| b.sample_count).sum();
        prop_assert_eq!(covered, samples.len());
    }

    #[test]
    fn confidence_stays_in_unit_range(samples in arb_samples(), width in 1u32..=60) {
        for bucket in bucketize(&samples, &config_with_width(width)).unwrap() {
            prop_assert!((0.0..=1.0).contains(&bucket.confidence));
            if bucket.distracted {
                prop_assert!(bucket.confidence <= 0.8);
            }
            prop_assert!(bucket.max_idle <= f64::from(width));
        }
    }

    #[test]
    fn summary_states_add_up(samples in arb_samples(), width in 1u32..=60) {
        let config = config_with_width(width);
        let buckets = bucketize(&samples, &config).unwrap();
        let summary = summarize(&buckets);

        prop_assert_eq!(
            summary.states.productive + summary.states.non_productive,
            summary.total_seconds
        );
        prop_assert_eq!(summary.total_seconds, buckets.len() as i64 * i64::from(width));

        let breakdown_total: i64 = app_breakdown(&buckets, &config)
            .iter()
            .map(|e| e.total_seconds)
            .sum();
        prop_assert_eq!(breakdown_total, summary.total_seconds);
    }

    #[test]
    fn bucketize_is_idempotent(samples in arb_samples(), width in 1u32..=60) {
        let config = config_with_width(width);
        let first = bucketize(&samples, &config).unwrap();
        let second = bucketize(&samples, &config).unwrap();
        prop_assert_eq!(first, second);
    }
}
