//! Webhook relay implementation of the notifier port.
//!
//! Posts each message as JSON to the notification collaborator's endpoint,
//! which owns template rendering and actual email delivery.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use kidtrack_core::config::notification::NotificationConfig;
use kidtrack_core::error::{AppError, ErrorKind};
use kidtrack_core::result::AppResult;
use kidtrack_core::traits::{NotificationMessage, Notifier};

/// Relays notification messages to a configured webhook endpoint.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl WebhookNotifier {
    /// Creates a new webhook notifier from configuration.
    pub fn new(config: &NotificationConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint: config.webhook_url.clone(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, message: NotificationMessage) -> AppResult<()> {
        let Some(endpoint) = &self.endpoint else {
            debug!(
                kind = message.kind.as_str(),
                recipient = %message.recipient_email,
                "No notification endpoint configured; message dropped"
            );
            return Ok(());
        };

        let response = self
            .client
            .post(endpoint)
            .json(&message)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Notification relay request failed",
                    e,
                )
            })?;

        if !response.status().is_success() {
            return Err(AppError::external_service(format!(
                "Notification relay returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
