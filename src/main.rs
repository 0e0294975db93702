//! hostwatch - scheduled host resource reporting to a chat webhook.

use anyhow::Result;
use clap::Parser;
use hostwatch::{app::App, cli::Cli, config::Config};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment,
    // and CLI args. Exit if configuration fails, as it's a critical step.
    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    // Initialize logging; RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("hostwatch starting up...");

    // Log the loaded configuration settings for visibility
    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!(
        "Instance: {}",
        config.target.instance_id.as_deref().unwrap_or("(not set)")
    );
    info!("Region: {}", config.metrics_api.region);
    info!("Metrics Endpoint: {}", config.metrics_api.url());
    info!("Lookback: {} minutes", config.collection.lookback_minutes);
    info!(
        "Statistics Period: {} seconds",
        config.collection.period_seconds
    );
    info!(
        "Source Timeout: {} seconds",
        config.collection.source_timeout_seconds
    );
    info!(
        "Enabled Sources: {}",
        config
            .collection
            .sources
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    info!(
        "Discord Base URL: {}",
        config.discord.base_url.as_deref().unwrap_or_default()
    );
    info!("-------------------------------------------------------");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let app = App::builder(config)
        .with_scheduler(!cli.once)
        .build(shutdown_rx);

    if cli.once {
        app.run_once().await;
        return Ok(());
    }

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Shutting down gracefully...");
    shutdown_tx.send(true).ok();

    app.run().await?;

    info!("All tasks shut down. Exiting.");
    Ok(())
}
