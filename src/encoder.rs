//! Report encoder
//!
//! Encodes buckets and their aggregates into a `ProductivityReport` payload.

use crate::aggregate;
use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::types::{
    Bucket, ProductivityReport, ReportBucket, ReportProducer, ReportProvenance,
};
use crate::{PRODUCER_NAME, WORKTRACE_VERSION};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Productivity report encoder
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Build a report from classified buckets
    pub fn encode(
        &self,
        buckets: &[Bucket],
        user_ids: Vec<String>,
        config: &InferenceConfig,
    ) -> ProductivityReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: WORKTRACE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = ReportProvenance {
            user_ids,
            range_start_utc: buckets.first().map(|b| b.start.to_rfc3339()),
            range_end_utc: buckets.last().map(|b| b.end.to_rfc3339()),
            computed_at_utc: Utc::now().to_rfc3339(),
            bucket_width_sec: config.bucket_width_sec,
        };

        ProductivityReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            provenance,
            summary: aggregate::summarize(buckets),
            apps: aggregate::app_breakdown(buckets, config),
            buckets: buckets.iter().map(encode_bucket).collect(),
        }
    }

    /// Encode to a JSON string
    pub fn encode_to_json(
        &self,
        buckets: &[Bucket],
        user_ids: Vec<String>,
        config: &InferenceConfig,
    ) -> Result<String, InferenceError> {
        let report = self.encode(buckets, user_ids, config);
        serde_json::to_string(&report).map_err(|e| InferenceError::EncodingError(e.to_string()))
    }
}

/// Bucket in report form: RFC 3339 instants, confidence to 3 decimals,
/// distance and idle to 1 decimal
pub fn encode_bucket(bucket: &Bucket) -> ReportBucket {
    ReportBucket {
        start: bucket.start.to_rfc3339(),
        end: bucket.end.to_rfc3339(),
        state: bucket.state,
        rule: bucket.rule,
        confidence: round_to(bucket.confidence, 3),
        total_keystrokes: bucket.total_keystrokes,
        total_clicks: bucket.total_clicks,
        total_mouse_distance: round_to(bucket.total_mouse_distance, 1),
        max_idle: round_to(bucket.max_idle, 1),
        dominant_app: bucket.dominant_app.clone(),
        dominant_title: bucket.dominant_title.clone(),
        event_count: bucket.sample_count,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassificationRule, ProductivityState};
    use chrono::{Duration, TimeZone};

    fn bucket() -> Bucket {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        Bucket {
            start,
            end: start + Duration::seconds(10),
            state: ProductivityState::Productive,
            rule: ClassificationRule::Presence,
            confidence: 0.123456,
            total_keystrokes: 0,
            total_clicks: 0,
            total_mouse_distance: 42.06,
            max_idle: 1.94,
            dominant_app: "Preview".to_string(),
            dominant_title: "notes.pdf".to_string(),
            sample_count: 9,
            distracted: false,
        }
    }

    #[test]
    fn test_bucket_rounding() {
        let encoded = encode_bucket(&bucket());
        assert_eq!(encoded.confidence, 0.123);
        assert_eq!(encoded.total_mouse_distance, 42.1);
        assert_eq!(encoded.max_idle, 1.9);
        assert_eq!(encoded.event_count, 9);
        assert_eq!(encoded.start, "2024-01-15T09:00:00+00:00");
    }

    #[test]
    fn test_report_json_shape() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let json = encoder
            .encode_to_json(&[bucket()], vec!["alice".to_string()], &InferenceConfig::default())
            .unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["report_version"], "1.0.0");
        assert_eq!(payload["producer"]["name"], "worktrace-flux");
        assert_eq!(payload["producer"]["instance_id"], "test-instance");
        assert_eq!(payload["provenance"]["user_ids"][0], "alice");
        assert_eq!(payload["provenance"]["bucket_width_sec"], 10);
        assert_eq!(payload["summary"]["productive"], 10);
        assert_eq!(payload["summary"]["total_buckets"], 1);
        assert_eq!(payload["apps"][0]["app_name"], "Preview");
        assert_eq!(payload["buckets"][0]["rule"], "presence");
    }

    #[test]
    fn test_empty_report_has_no_range() {
        let report = ReportEncoder::new().encode(&[], Vec::new(), &InferenceConfig::default());
        assert!(report.provenance.range_start_utc.is_none());
        assert_eq!(report.summary.total_seconds, 0);
        assert!(report.buckets.is_empty());
    }
}
