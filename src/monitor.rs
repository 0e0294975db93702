//! The collection cycle: one collect → compose → deliver pass.
//!
//! A cycle either delivers a full report or the fixed failure notice; a
//! partial report is never sent. Every error is absorbed here so neither the
//! scheduler nor the process is ever taken down by a failing collaborator.

use crate::config::CollectionConfig;
use crate::core::{MetricSnapshot, MetricSource, Notifier, TimeWindow};
use crate::formatting::compose_report;
use crate::sources::MetricError;
use chrono::Utc;
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Sent in place of a report when any metric query fails during a cycle.
pub const FAILURE_NOTICE: &str = "Sending monitor details failed.";

pub struct MonitorCycle {
    sources: Vec<Arc<dyn MetricSource>>,
    notifier: Arc<dyn Notifier>,
    lookback: chrono::Duration,
    source_timeout: Duration,
}

impl MonitorCycle {
    pub fn new(
        sources: Vec<Arc<dyn MetricSource>>,
        notifier: Arc<dyn Notifier>,
        collection: &CollectionConfig,
    ) -> Self {
        Self {
            sources,
            notifier,
            lookback: chrono::Duration::minutes(collection.lookback_minutes as i64),
            source_timeout: Duration::from_secs(collection.source_timeout_seconds),
        }
    }

    /// Runs one full cycle. Infallible from the caller's perspective: a
    /// collection failure becomes the failure notice, a delivery failure is
    /// logged and dropped.
    pub async fn run_cycle(&self) {
        let window = TimeWindow::lookback(Utc::now(), self.lookback);
        metrics::counter!("cycles_started_total").increment(1);

        match self.collect(&window).await {
            Ok(snapshots) => {
                info!(sections = snapshots.len(), "metric collection succeeded");
                let report = compose_report(&window, &snapshots);
                self.deliver(&report).await;
            }
            Err(e) => {
                warn!(error = %e, "metric collection failed, sending failure notice");
                metrics::counter!("cycles_failed_total").increment(1);
                self.deliver(FAILURE_NOTICE).await;
            }
        }
    }

    /// Queries all configured sources concurrently. First error wins:
    /// results of the remaining in-flight queries are dropped. Snapshots
    /// come back in source order, regardless of completion order.
    async fn collect(&self, window: &TimeWindow) -> Result<Vec<MetricSnapshot>, MetricError> {
        let timeout = self.source_timeout;
        try_join_all(self.sources.iter().map(|source| async move {
            match tokio::time::timeout(timeout, source.sample(window)).await {
                Ok(result) => result,
                Err(_) => Err(MetricError::Timeout(timeout)),
            }
        }))
        .await
    }

    async fn deliver(&self, message: &str) {
        if let Err(e) = self.notifier.send(message).await {
            metrics::counter!("deliveries_failed_total").increment(1);
            error!(
                notifier = self.notifier.name(),
                error = %e,
                "failed to deliver report"
            );
        }
    }
}
