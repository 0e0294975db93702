//! The main application logic, decoupled from the entry point.

use crate::config::Config;
use crate::core::{MetricSource, Notifier, SourceKind};
use crate::monitor::MonitorCycle;
use crate::notification::DiscordClient;
use crate::scheduler::Scheduler;
use crate::sources::{CloudWatchCpuSource, SystemDriveSource, SystemRamSource};
use crate::task_manager::TaskManager;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// A handle to the running application.
pub struct App {
    task_manager: TaskManager,
    cycle: Arc<MonitorCycle>,
}

impl App {
    /// Creates a new `AppBuilder` to construct an `App`.
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder::new(config)
    }

    /// Runs a single collection cycle, bypassing the scheduler.
    pub async fn run_once(&self) {
        self.cycle.run_cycle().await;
    }

    /// Waits for the shutdown signal and then gracefully drains all tasks.
    pub async fn run(self) -> Result<()> {
        let mut shutdown_rx = self.task_manager.shutdown_rx();
        shutdown_rx.changed().await.ok();
        info!("Shutdown signal received. Waiting for tasks to complete...");

        self.task_manager.shutdown().await;
        Ok(())
    }
}

/// Builder for the main application.
///
/// Separates constructing the application's components from running them,
/// and provides override hooks so tests can substitute collaborators.
pub struct AppBuilder {
    config: Config,
    sources_override: Option<Vec<Arc<dyn MetricSource>>>,
    notifier_override: Option<Arc<dyn Notifier>>,
    schedule: bool,
}

impl AppBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sources_override: None,
            notifier_override: None,
            schedule: true,
        }
    }

    /// Overrides the metric sources for testing.
    pub fn sources_override(mut self, sources: Vec<Arc<dyn MetricSource>>) -> Self {
        self.sources_override = Some(sources);
        self
    }

    /// Overrides the notifier for testing.
    pub fn notifier_override(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier_override = Some(notifier);
        self
    }

    /// Disables the scheduler task; pair with [`App::run_once`].
    pub fn with_scheduler(mut self, schedule: bool) -> Self {
        self.schedule = schedule;
        self
    }

    /// Builds all application components, returning a runnable `App`.
    pub fn build(self, shutdown_rx: watch::Receiver<bool>) -> App {
        let config = self.config;
        let task_manager = TaskManager::new(shutdown_rx);

        let notifier: Arc<dyn Notifier> = match self.notifier_override {
            Some(notifier) => notifier,
            None => Arc::new(DiscordClient::new(
                config.discord.base_url.as_deref().unwrap_or_default(),
                config.discord.chat_id.as_deref().unwrap_or_default(),
            )),
        };

        let sources = match self.sources_override {
            Some(sources) => sources,
            None => build_sources(&config),
        };

        let cycle = Arc::new(MonitorCycle::new(sources, notifier, &config.collection));

        if self.schedule {
            let scheduler = Scheduler::new(Arc::clone(&cycle));
            let scheduler_shutdown = task_manager.shutdown_rx();
            task_manager.spawn("Scheduler", scheduler.run(scheduler_shutdown));
        }

        App {
            task_manager,
            cycle,
        }
    }
}

/// Instantiates the production sources in configured order.
fn build_sources(config: &Config) -> Vec<Arc<dyn MetricSource>> {
    config
        .collection
        .sources
        .iter()
        .map(|kind| match kind {
            SourceKind::Cpu => Arc::new(CloudWatchCpuSource::new(
                &config.metrics_api,
                config.target.instance_id.clone().unwrap_or_default(),
                config.collection.period_seconds,
            )) as Arc<dyn MetricSource>,
            SourceKind::Drive => Arc::new(SystemDriveSource) as Arc<dyn MetricSource>,
            SourceKind::Ram => Arc::new(SystemRamSource) as Arc<dyn MetricSource>,
        })
        .collect()
}
