use anyhow::{Context, Result};
use async_trait::async_trait;

use super::{BaseNotifier, Notification};

/// Posts each notification as JSON to the notification service.
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl BaseNotifier for WebhookNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(notification)
            .send()
            .await
            .context("Failed to send notification")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Notification service error {}: {}", status, body);
        }
        Ok(())
    }
}

/// Notifier used when no webhook is configured.
pub struct LogNotifier;

#[async_trait]
impl BaseNotifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        tracing::info!(
            kind = %notification.kind,
            recipient = %notification.recipient_id,
            title = %notification.title,
            "LogNotifier: notification not delivered (no webhook configured)"
        );
        Ok(())
    }
}
