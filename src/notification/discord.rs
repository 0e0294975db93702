//! A client for delivering reports to a Discord webhook.

use crate::core::Notifier;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info, instrument};

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts report text to a Discord webhook.
///
/// One attempt per call, no retry and no queue: a report that cannot be
/// delivered is lost. The caller logs the failure and moves on.
pub struct DiscordClient {
    client: reqwest::Client,
    webhook_url: String,
    timeout: Duration,
}

impl DiscordClient {
    /// Creates a new `DiscordClient`. `base_url` and `chat_id` are
    /// concatenated verbatim, matching the webhook contract
    /// `{baseUrl}{chatId}`.
    pub fn new(base_url: &str, chat_id: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: format!("{base_url}{chat_id}"),
            timeout: SEND_TIMEOUT,
        }
    }
}

#[async_trait]
impl Notifier for DiscordClient {
    fn name(&self) -> &str {
        "discord"
    }

    /// Posts `message` to the configured webhook.
    #[instrument(skip(self, message), fields(len = message.len()))]
    async fn send(&self, message: &str) -> anyhow::Result<()> {
        let response = match self
            .client
            .post(&self.webhook_url)
            .timeout(self.timeout)
            .json(&json!({ "content": message }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "HTTP request to Discord failed");
                return Err(e.into());
            }
        };

        let status = response.status();
        if status.is_success() {
            info!("Report delivered to Discord.");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            error!(
                status = %status,
                body = %body,
                "Discord webhook rejected the report"
            );
            anyhow::bail!("Discord webhook returned status {}: {}", status, body)
        }
    }
}
