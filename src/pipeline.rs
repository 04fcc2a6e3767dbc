//! Pipeline orchestration
//!
//! Public entry points for productivity inference:
//! samples → windows → classification + confidence → buckets → summaries.
//!
//! Every function here is pure: it reads its arguments and the configuration
//! and allocates only its output, so calls can run concurrently.

use crate::adapter;
use crate::aggregate;
use crate::bucketizer::{self, BucketWindow};
use crate::classifier;
use crate::confidence::{self, ConfidenceInputs};
use crate::config::InferenceConfig;
use crate::encoder::ReportEncoder;
use crate::error::InferenceError;
use crate::presence;
use crate::types::{AppBreakdownEntry, Bucket, DailySummary, Sample, Summary};
use chrono::{FixedOffset, NaiveDate};
use tracing::{debug, trace};

/// Slice time-ordered samples into classified buckets
///
/// # Errors
/// `InvalidBucketWidth` for a zero width, `UnsortedSamples` when timestamps go
/// backwards. Empty input yields an empty list.
pub fn bucketize(samples: &[Sample], config: &InferenceConfig) -> Result<Vec<Bucket>, InferenceError> {
    let windows = bucketizer::group_windows(samples, config.bucket_width_sec)?;
    let buckets: Vec<Bucket> = windows.iter().map(|w| build_bucket(w, config)).collect();

    debug!(
        samples = samples.len(),
        buckets = buckets.len(),
        width_sec = config.bucket_width_sec,
        "bucketized samples"
    );
    Ok(buckets)
}

fn build_bucket(window: &BucketWindow<'_>, config: &InferenceConfig) -> Bucket {
    // Computed once: it gates the presence rule and scales confidence
    let distracted = presence::is_distracted(window.samples, config);
    let rule = classifier::classify(window, distracted, config);
    let confidence = confidence::score(&ConfidenceInputs::from_window(window, distracted), config);

    trace!(
        start = %window.start,
        app = %window.dominant_app,
        ?rule,
        confidence,
        "classified bucket"
    );

    Bucket {
        start: window.start,
        end: window.end,
        state: rule.state(),
        rule,
        confidence,
        total_keystrokes: window.total_keystrokes,
        total_clicks: window.total_clicks,
        total_mouse_distance: window.total_mouse_distance,
        max_idle: window.max_idle,
        dominant_app: window.dominant_app.clone(),
        dominant_title: window.dominant_title.clone(),
        sample_count: window.sample_count(),
        distracted,
    }
}

/// Totals by state over a bucket list
pub fn summarize(buckets: &[Bucket]) -> Summary {
    aggregate::summarize(buckets)
}

/// Per-application (and per-site for browsers) breakdown
pub fn app_breakdown(buckets: &[Bucket], config: &InferenceConfig) -> Vec<AppBreakdownEntry> {
    aggregate::app_breakdown(buckets, config)
}

/// Summary per local calendar day that has samples, ascending by date
///
/// Day boundaries use `config.utc_offset_minutes`. Each day is bucketized on its
/// own, so bucket windows are anchored to that day's first sample.
pub fn daily_summaries(
    samples: &[Sample],
    config: &InferenceConfig,
) -> Result<Vec<DailySummary>, InferenceError> {
    bucketizer::ensure_sorted(samples)?;
    let offset = day_offset(config)?;

    let mut days = Vec::new();
    let mut run_start = 0;
    for pos in 1..=samples.len() {
        let boundary = pos == samples.len()
            || local_date(&samples[pos], &offset) != local_date(&samples[run_start], &offset);
        if boundary {
            let day = &samples[run_start..pos];
            let buckets = bucketize(day, config)?;
            days.push(DailySummary {
                date: local_date(&day[0], &offset),
                summary: aggregate::summarize(&buckets),
            });
            run_start = pos;
        }
    }

    Ok(days)
}

/// Dense series over `from..=to`: days without samples get an empty summary
pub fn fill_days(days: &[DailySummary], from: NaiveDate, to: NaiveDate) -> Vec<DailySummary> {
    let mut series = Vec::new();
    let mut date = from;
    while date <= to {
        let summary = days
            .iter()
            .find(|d| d.date == date)
            .map(|d| d.summary)
            .unwrap_or_default();
        series.push(DailySummary { date, summary });
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    series
}

fn day_offset(config: &InferenceConfig) -> Result<FixedOffset, InferenceError> {
    FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
        InferenceError::InvalidConfig {
            field: "utc_offset_minutes".to_string(),
            message: format!("{} is not a valid UTC offset", config.utc_offset_minutes),
        }
    })
}

fn local_date(sample: &Sample, offset: &FixedOffset) -> NaiveDate {
    sample.timestamp.with_timezone(offset).date_naive()
}

/// Convert a JSON sample array into a report JSON string (stateless, one-shot)
///
/// Samples are validated, titles dropped when configured, and the input must
/// already be in timestamp order.
pub fn samples_to_report(samples_json: &str, config: &InferenceConfig) -> Result<String, InferenceError> {
    let pipeline = InferencePipeline::new(config.clone())?;
    let samples = adapter::parse_array(samples_json)?;
    pipeline.report_json(samples)
}

/// Inference pipeline bound to one validated configuration
pub struct InferencePipeline {
    config: InferenceConfig,
    encoder: ReportEncoder,
}

impl InferencePipeline {
    /// Validate the configuration and build a pipeline
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        let config = config.normalized();
        config.validate()?;
        Ok(Self {
            config,
            encoder: ReportEncoder::new(),
        })
    }

    /// Use a fixed encoder (e.g. with a known instance ID)
    pub fn with_encoder(mut self, encoder: ReportEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Validate and minimise samples per the configuration
    pub fn prepare(&self, mut samples: Vec<Sample>) -> Result<Vec<Sample>, InferenceError> {
        adapter::ensure_valid(&samples)?;
        if self.config.drop_titles {
            adapter::drop_titles(&mut samples);
        }
        Ok(samples)
    }

    /// Classified buckets for prepared samples
    pub fn bucketize(&self, samples: &[Sample]) -> Result<Vec<Bucket>, InferenceError> {
        bucketize(samples, &self.config)
    }

    pub fn summarize(&self, samples: &[Sample]) -> Result<Summary, InferenceError> {
        Ok(summarize(&self.bucketize(samples)?))
    }

    pub fn app_breakdown(&self, samples: &[Sample]) -> Result<Vec<AppBreakdownEntry>, InferenceError> {
        Ok(app_breakdown(&self.bucketize(samples)?, &self.config))
    }

    pub fn daily(&self, samples: &[Sample]) -> Result<Vec<DailySummary>, InferenceError> {
        daily_summaries(samples, &self.config)
    }

    /// Prepare, bucketize and encode a full report
    pub fn report_json(&self, samples: Vec<Sample>) -> Result<String, InferenceError> {
        let samples = self.prepare(samples)?;
        let buckets = self.bucketize(&samples)?;
        self.encoder
            .encode_to_json(&buckets, adapter::user_ids(&samples), &self.config)
    }
}
