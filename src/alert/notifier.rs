//! Alert delivery backends

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Delivery failures; logged by the caller, never fatal
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Webhook rejected alert with status {0}")]
    Rejected(reqwest::StatusCode),
}

/// Trait for alert sinks
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a rendered alert to `destination` (chat id, channel...)
    async fn notify(&self, destination: &str, message: &str) -> Result<(), NotifyError>;
}

/// Writes alerts to the structured log
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, destination: &str, message: &str) -> Result<(), NotifyError> {
        info!(destination, "ALERT\n{}", message);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    destination: &'a str,
    text: &'a str,
}

/// POSTs alerts as JSON to a webhook endpoint
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, destination: &str, message: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload {
                destination,
                text: message,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Rejected(response.status()));
        }
        Ok(())
    }
}

/// Either backend, picked from configuration
pub enum AnyNotifier {
    Log(LogNotifier),
    Webhook(WebhookNotifier),
}

#[async_trait]
impl Notifier for AnyNotifier {
    async fn notify(&self, destination: &str, message: &str) -> Result<(), NotifyError> {
        match self {
            AnyNotifier::Log(n) => n.notify(destination, message).await,
            AnyNotifier::Webhook(n) => n.notify(destination, message).await,
        }
    }
}
