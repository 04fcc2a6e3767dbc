//! Worktrace Flux - productivity inference over desktop activity samples
//!
//! Flux turns per-second agent samples (focused app, keystrokes, clicks, mouse
//! travel, idle time) into fixed-width buckets labelled `productive` or
//! `non_productive` with a confidence score, through a deterministic pipeline:
//! adaptation → bucketing → classification + confidence → aggregation → encoding.
//!
//! ## Modules
//!
//! - **Inference**: [`bucketize`] groups and classifies samples
//! - **Aggregation**: [`summarize`], [`app_breakdown`] and [`daily_summaries`]
//! - **Reports**: [`InferencePipeline`] and [`samples_to_report`] produce JSON payloads

pub mod adapter;
pub mod aggregate;
pub mod automation;
pub mod bucketizer;
pub mod classifier;
pub mod confidence;
pub mod config;
pub mod encoder;
pub mod error;
pub mod pipeline;
pub mod presence;
pub mod types;

pub use config::InferenceConfig;
pub use error::InferenceError;
pub use pipeline::{
    app_breakdown, bucketize, daily_summaries, samples_to_report, summarize, InferencePipeline,
};
pub use types::{
    AppBreakdownEntry, Bucket, ClassificationRule, DailySummary, ProductivityState, Sample,
    Summary,
};

/// Crate version embedded in all reports
pub const WORKTRACE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "worktrace-flux";
