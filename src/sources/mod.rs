//! Metric sources: one implementation per metric family.

pub mod cloudwatch;
pub mod system;

pub use cloudwatch::CloudWatchCpuSource;
pub use system::{SystemDriveSource, SystemRamSource};

use std::time::Duration;
use thiserror::Error;

/// A metric query failure. Absorbed by the collection cycle; never retried.
#[derive(Debug, Error)]
pub enum MetricError {
    #[error("metrics query failed: {0}")]
    Query(String),

    #[error("metrics query returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("no datapoints returned for the requested window")]
    NoData,

    #[error("metric query timed out after {0:?}")]
    Timeout(Duration),

    #[error("local system query failed: {0}")]
    System(String),
}
