//! Configuration management for hostwatch
//!
//! This module defines the main `Config` struct and its sub-structs,
//! responsible for holding all application settings. It uses the `figment`
//! crate to layer defaults, an optional `hostwatch.toml` file, environment
//! variables, and command-line arguments. The result is validated once at
//! startup and shared read-only for the life of the process.

use crate::cli::Cli;
use crate::core::SourceKind;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Region queried when no other region configuration is supplied.
pub const DEFAULT_REGION: &str = "us-east-2";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration extraction failed: {0}")]
    Extraction(#[from] figment::Error),

    #[error("missing required configuration value: {0}")]
    Missing(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Where reports are delivered.
    pub discord: DiscordConfig,
    /// Which instance the remote CPU metrics belong to.
    pub target: TargetConfig,
    /// The remote metric statistics API.
    pub metrics_api: MetricsApiConfig,
    /// Windowing and source selection for each collection cycle.
    pub collection: CollectionConfig,
}

/// Destination webhook. The chat id is appended verbatim to the base URL.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DiscordConfig {
    pub base_url: Option<String>,
    pub chat_id: Option<String>,
}

/// Identity of the monitored instance.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TargetConfig {
    pub instance_id: Option<String>,
}

/// Location of the metric statistics API.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MetricsApiConfig {
    pub region: String,
    /// Overrides the regional endpoint. Mainly for tests and proxies.
    pub endpoint: Option<String>,
}

impl MetricsApiConfig {
    pub fn url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://monitoring.{}.amazonaws.com/", self.region),
        }
    }
}

/// Per-cycle collection settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CollectionConfig {
    /// How far behind "now" the windowed queries reach, in minutes.
    pub lookback_minutes: u64,
    /// Aggregation period of the statistics query, in seconds.
    pub period_seconds: u64,
    /// Upper bound on any single source query.
    pub source_timeout_seconds: u64,
    /// Enabled sources; the report sections follow this order.
    pub sources: Vec<SourceKind>,
}

impl Config {
    /// Loads the application configuration by layering sources: defaults,
    /// TOML file, environment, and CLI arguments.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        figment = match &cli.config {
            Some(path) => figment.merge(Toml::file_exact(path)),
            None => figment.merge(Toml::file("hostwatch.toml")),
        };

        let config: Config = figment
            .merge(Env::prefixed("HOSTWATCH_").split("__"))
            // The original deployment surface: bare, well-known variable names.
            .merge(raw_env("DISCORD_BASE_URL", "discord.base_url"))
            .merge(raw_env("DISCORD_CHAT_ID", "discord.chat_id"))
            .merge(raw_env("INSTANCE_ID", "target.instance_id"))
            .merge(raw_env("AWS_REGION", "metrics_api.region"))
            .merge(cli.clone())
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the pipeline cannot run with. Called once at
    /// startup; nothing is re-checked mid-cycle.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.discord.base_url.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::Missing("DISCORD_BASE_URL"));
        }
        if self.discord.chat_id.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::Missing("DISCORD_CHAT_ID"));
        }
        if self.collection.sources.contains(&SourceKind::Cpu)
            && self.target.instance_id.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::Missing("INSTANCE_ID"));
        }
        if self.collection.sources.is_empty() {
            return Err(ConfigError::Invalid(
                "collection.sources must not be empty".to_string(),
            ));
        }
        if self.collection.lookback_minutes == 0 {
            return Err(ConfigError::Invalid(
                "collection.lookback_minutes must be positive".to_string(),
            ));
        }
        if self.collection.period_seconds == 0 {
            return Err(ConfigError::Invalid(
                "collection.period_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Maps one raw environment variable onto a nested configuration key.
fn raw_env(var: &'static str, key: &'static str) -> Env {
    Env::raw()
        .filter(move |name| name.as_str().eq_ignore_ascii_case(var))
        .map(move |_| key.into())
}

// Defaults mirror the original deployment: hourly cadence over a 60-minute
// window, one statistics period spanning the whole window, all sources on.
impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            discord: DiscordConfig {
                base_url: None,
                chat_id: None,
            },
            target: TargetConfig { instance_id: None },
            metrics_api: MetricsApiConfig {
                region: DEFAULT_REGION.to_string(),
                endpoint: None,
            },
            collection: CollectionConfig {
                lookback_minutes: 60,
                period_seconds: 3600,
                source_timeout_seconds: 30,
                sources: vec![SourceKind::Cpu, SourceKind::Drive, SourceKind::Ram],
            },
        }
    }
}
