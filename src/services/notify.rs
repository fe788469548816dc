// src/services/notify.rs

//! Notification dispatch across independent channels.
//!
//! Every configured channel is attempted; one channel's failure or timeout
//! never prevents the others from being tried, and there are no retries at
//! this layer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{ChannelConfig, ChannelKind, NotifyConfig};
use crate::pipeline::render::RenderedMessage;

/// Transport for delivering a rendered message to one channel.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, channel: &ChannelConfig, message: &RenderedMessage) -> Result<()>;
}

/// Webhook and bot-API transport over HTTP.
pub struct WebhookTransport {
    client: reqwest::Client,
}

impl WebhookTransport {
    /// Create a transport using the given HTTP client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn webhook_url(channel: &ChannelConfig) -> Result<String> {
        channel.webhook_url.clone().ok_or_else(|| {
            AppError::dispatch(format!("channel '{}' has no webhook_url", channel.name))
        })
    }
}

#[async_trait]
impl Transport for WebhookTransport {
    async fn send(&self, channel: &ChannelConfig, message: &RenderedMessage) -> Result<()> {
        let (url, payload) = match channel.kind {
            ChannelKind::Discord => (
                Self::webhook_url(channel)?,
                json!({ "content": message.markup }),
            ),
            ChannelKind::Slack => (
                Self::webhook_url(channel)?,
                json!({ "text": message.plain }),
            ),
            ChannelKind::Telegram => {
                let token = channel.bot_token.as_deref().ok_or_else(|| {
                    AppError::dispatch(format!("channel '{}' has no bot_token", channel.name))
                })?;
                let chat_id = channel.chat_id.as_deref().ok_or_else(|| {
                    AppError::dispatch(format!("channel '{}' has no chat_id", channel.name))
                })?;
                (
                    format!("https://api.telegram.org/bot{token}/sendMessage"),
                    json!({ "chat_id": chat_id, "text": message.plain }),
                )
            }
        };

        log::debug!(
            "Sending to {} channel '{}'",
            channel.kind.as_str(),
            channel.name
        );
        self.client
            .post(&url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Result of one channel attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelAttempt {
    /// Channel display name
    pub channel: String,
    /// Captured failure reason; `None` on success
    pub error: Option<String>,
}

impl ChannelAttempt {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate outcome of a dispatch.
///
/// An empty report means no channels were configured, which is distinct
/// from every configured channel failing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchReport {
    pub attempts: Vec<ChannelAttempt>,
}

impl DispatchReport {
    /// No channels were configured.
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// At least one delivery succeeded.
    pub fn any_succeeded(&self) -> bool {
        self.attempts.iter().any(ChannelAttempt::succeeded)
    }

    /// Every configured channel failed.
    pub fn all_failed(&self) -> bool {
        !self.is_empty() && !self.any_succeeded()
    }

    /// Number of failed attempts.
    pub fn failure_count(&self) -> usize {
        self.attempts.iter().filter(|a| !a.succeeded()).count()
    }
}

/// Sends a rendered message to every configured channel.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    send_timeout: Duration,
    max_concurrent: usize,
}

impl Dispatcher {
    /// Create a dispatcher from the notify settings.
    pub fn new(transport: Arc<dyn Transport>, config: &NotifyConfig) -> Self {
        Self::with_timeout(
            transport,
            Duration::from_secs(config.send_timeout_secs),
            config.max_concurrent,
        )
    }

    /// Create a dispatcher with an explicit per-send timeout.
    pub fn with_timeout(
        transport: Arc<dyn Transport>,
        send_timeout: Duration,
        max_concurrent: usize,
    ) -> Self {
        Self {
            transport,
            send_timeout,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Attempt every channel concurrently, bounded by `max_concurrent`.
    ///
    /// A timeout aborts only its own send; siblings keep running. Results
    /// are collected without ordering requirements.
    pub async fn dispatch(
        &self,
        message: &RenderedMessage,
        channels: &[ChannelConfig],
    ) -> DispatchReport {
        let attempts = stream::iter(channels)
            .map(|channel| {
                let transport = Arc::clone(&self.transport);
                async move {
                    let result =
                        tokio::time::timeout(self.send_timeout, transport.send(channel, message))
                            .await;
                    let error = match result {
                        Ok(Ok(())) => None,
                        Ok(Err(e)) => Some(e.to_string()),
                        Err(_) => Some(format!(
                            "timed out after {}s",
                            self.send_timeout.as_secs_f64()
                        )),
                    };
                    ChannelAttempt {
                        channel: channel.name.clone(),
                        error,
                    }
                }
            })
            .buffer_unordered(self.max_concurrent)
            .collect::<Vec<_>>()
            .await;

        DispatchReport { attempts }
    }
}
