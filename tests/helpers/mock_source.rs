//! Scriptable metric sources for integration tests.

use async_trait::async_trait;
use hostwatch::core::{MetricSnapshot, MetricSource, SourceKind, TimeWindow};
use hostwatch::sources::MetricError;
use std::time::Duration;

/// A metric source that succeeds, fails, or hangs, as scripted.
pub struct MockSource {
    kind: SourceKind,
    snapshot: Option<MetricSnapshot>,
    delay: Option<Duration>,
}

impl MockSource {
    pub fn succeeding(snapshot: MetricSnapshot) -> Self {
        Self {
            kind: snapshot.kind(),
            snapshot: Some(snapshot),
            delay: None,
        }
    }

    pub fn failing(kind: SourceKind) -> Self {
        Self {
            kind,
            snapshot: None,
            delay: None,
        }
    }

    /// Sleeps far longer than any test timeout before responding.
    pub fn hanging(kind: SourceKind) -> Self {
        Self {
            kind,
            snapshot: None,
            delay: Some(Duration::from_secs(86_400)),
        }
    }
}

#[async_trait]
impl MetricSource for MockSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn sample(&self, _window: &TimeWindow) -> Result<MetricSnapshot, MetricError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.snapshot {
            Some(snapshot) => Ok(snapshot),
            None => Err(MetricError::Query(format!("{} source failed", self.kind))),
        }
    }
}
