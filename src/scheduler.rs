//! Fires the collection cycle at startup and at the top of every hour.

use crate::monitor::MonitorCycle;
use chrono::{DateTime, Duration as ChronoDuration, DurationRound, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info};

pub struct Scheduler {
    cycle: Arc<MonitorCycle>,
}

impl Scheduler {
    pub fn new(cycle: Arc<MonitorCycle>) -> Self {
        Self { cycle }
    }

    /// Runs the first cycle immediately, then one at each hour boundary
    /// until the shutdown signal arrives.
    ///
    /// Cycles are spawned as detached tasks: a slow or hung cycle never
    /// delays the next tick, and overlapping cycles are independent.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        info!("Scheduler started, running startup cycle.");
        self.spawn_cycle();

        loop {
            let delay = until_next_hour(Utc::now());
            debug!(seconds = delay.as_secs(), "sleeping until next top of hour");

            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => {
                    info!("Scheduler received shutdown signal.");
                    break;
                }
                _ = sleep(delay) => self.spawn_cycle(),
            }
        }
    }

    fn spawn_cycle(&self) {
        let cycle = Arc::clone(&self.cycle);
        tokio::spawn(async move { cycle.run_cycle().await });
    }
}

/// Duration until the next minute-zero hour boundary strictly after `now`.
pub fn until_next_hour(now: DateTime<Utc>) -> Duration {
    let next = (now + ChronoDuration::hours(1))
        .duration_trunc(ChronoDuration::hours(1))
        .expect("hour truncation is valid for any realistic timestamp");
    (next - now).to_std().unwrap_or_default()
}
