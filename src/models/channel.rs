// src/models/channel.rs

//! Notification channel configuration.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Kind of notification channel. Decides which rendered form a channel
/// receives: Discord displays monospace blocks and gets the markup form,
/// Slack and Telegram render literal text and get the plain form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Discord webhook
    Discord,
    /// Slack incoming webhook
    Slack,
    /// Telegram bot API
    Telegram,
}

impl ChannelKind {
    /// Stable lowercase name, for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Discord => "discord",
            ChannelKind::Slack => "slack",
            ChannelKind::Telegram => "telegram",
        }
    }
}

/// One configured notification channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Display name used in logs and outcome reporting
    pub name: String,

    /// Channel kind
    pub kind: ChannelKind,

    /// Webhook URL (discord and slack)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    /// Bot token (telegram)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,

    /// Chat identifier (telegram)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
}

impl ChannelConfig {
    /// Validate that the fields required by the channel kind are present.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("channel name is empty"));
        }
        match self.kind {
            ChannelKind::Discord | ChannelKind::Slack => {
                if self.webhook_url.as_deref().is_none_or(|u| u.trim().is_empty()) {
                    return Err(AppError::validation(format!(
                        "channel '{}' requires webhook_url",
                        self.name
                    )));
                }
            }
            ChannelKind::Telegram => {
                if self.bot_token.as_deref().is_none_or(|t| t.trim().is_empty())
                    || self.chat_id.as_deref().is_none_or(|c| c.trim().is_empty())
                {
                    return Err(AppError::validation(format!(
                        "channel '{}' requires bot_token and chat_id",
                        self.name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn webhook_channel(kind: ChannelKind) -> ChannelConfig {
        ChannelConfig {
            name: "team".to_string(),
            kind,
            webhook_url: Some("https://example.com/hook".to_string()),
            bot_token: None,
            chat_id: None,
        }
    }

    #[test]
    fn test_validate_webhook_channels() {
        assert!(webhook_channel(ChannelKind::Discord).validate().is_ok());
        assert!(webhook_channel(ChannelKind::Slack).validate().is_ok());

        let mut missing = webhook_channel(ChannelKind::Discord);
        missing.webhook_url = None;
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_validate_telegram_channel() {
        let channel = ChannelConfig {
            name: "tg".to_string(),
            kind: ChannelKind::Telegram,
            webhook_url: None,
            bot_token: Some("123:abc".to_string()),
            chat_id: Some("-100200300".to_string()),
        };
        assert!(channel.validate().is_ok());

        let mut missing = channel.clone();
        missing.chat_id = None;
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_kind_deserializes_lowercase() {
        let toml = r#"
            name = "team"
            kind = "discord"
            webhook_url = "https://example.com/hook"
        "#;
        let channel: ChannelConfig = toml::from_str(toml).unwrap();
        assert_eq!(channel.kind, ChannelKind::Discord);
    }
}
