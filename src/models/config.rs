// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

use super::channel::ChannelConfig;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target page and fetch behavior
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Row keying and tracked-field settings
    #[serde(default)]
    pub diff: DiffConfig,

    /// Message rendering limits
    #[serde(default)]
    pub render: RenderConfig,

    /// Dispatch behavior
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Snapshot storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Notification channels
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.monitor.target_url.trim().is_empty() {
            return Err(AppError::validation("monitor.target_url is empty"));
        }
        if self.monitor.selectors.is_empty() {
            return Err(AppError::validation("monitor.selectors is empty"));
        }
        if self.monitor.user_agent.trim().is_empty() {
            return Err(AppError::validation("monitor.user_agent is empty"));
        }
        if self.monitor.timeout_secs == 0 {
            return Err(AppError::validation("monitor.timeout_secs must be > 0"));
        }
        if self.diff.key_fields.is_empty() {
            return Err(AppError::validation("diff.key_fields is empty"));
        }
        if self.diff.tracked_fields.is_empty() {
            return Err(AppError::validation("diff.tracked_fields is empty"));
        }
        if self.render.max_markup_chars < 80 || self.render.max_plain_chars < 80 {
            return Err(AppError::validation(
                "render message limits must be at least 80 characters",
            ));
        }
        if self.render.preview_rows == 0 || self.render.preview_columns == 0 {
            return Err(AppError::validation("render preview bounds must be > 0"));
        }
        if self.notify.send_timeout_secs == 0 {
            return Err(AppError::validation("notify.send_timeout_secs must be > 0"));
        }
        if self.notify.max_concurrent == 0 {
            return Err(AppError::validation("notify.max_concurrent must be > 0"));
        }
        for channel in &self.channels {
            channel.validate()?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig::default(),
            diff: DiffConfig::default(),
            render: RenderConfig::default(),
            notify: NotifyConfig::default(),
            storage: StorageConfig::default(),
            channels: Vec::new(),
        }
    }
}

/// Target page and HTTP fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// URL of the roster page to watch
    #[serde(default)]
    pub target_url: String,

    /// Ordered selector candidates for the watched fragment
    #[serde(default = "defaults::selectors")]
    pub selectors: Vec<String>,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            selectors: defaults::selectors(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Row keying and tracked-field settings for the diff engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Key fields tried in order to match a row across snapshots
    #[serde(default = "defaults::key_fields")]
    pub key_fields: Vec<String>,

    /// Fields whose old/new values classify a row as changed
    #[serde(default = "defaults::tracked_fields")]
    pub tracked_fields: Vec<String>,

    /// Tracked field rendered with a directional marker
    #[serde(default = "defaults::rank_field")]
    pub rank_field: String,

    /// Fields tried in order for a row's display label
    #[serde(default = "defaults::label_fields")]
    pub label_fields: Vec<String>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            key_fields: defaults::key_fields(),
            tracked_fields: defaults::tracked_fields(),
            rank_field: defaults::rank_field(),
            label_fields: defaults::label_fields(),
        }
    }
}

/// Message rendering limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Maximum length of the markup form, in characters
    #[serde(default = "defaults::max_markup_chars")]
    pub max_markup_chars: usize,

    /// Maximum length of the plain form, in characters
    #[serde(default = "defaults::max_plain_chars")]
    pub max_plain_chars: usize,

    /// Maximum rows in a tabular preview
    #[serde(default = "defaults::preview_rows")]
    pub preview_rows: usize,

    /// Maximum columns in a tabular preview
    #[serde(default = "defaults::preview_columns")]
    pub preview_columns: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_markup_chars: defaults::max_markup_chars(),
            max_plain_chars: defaults::max_plain_chars(),
            preview_rows: defaults::preview_rows(),
            preview_columns: defaults::preview_columns(),
        }
    }
}

/// Notification dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Per-send timeout in seconds
    #[serde(default = "defaults::send_timeout")]
    pub send_timeout_secs: u64,

    /// Maximum concurrent channel sends
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            send_timeout_secs: defaults::send_timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Snapshot storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the snapshot file
    #[serde(default = "defaults::storage_root")]
    pub root_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: defaults::storage_root(),
        }
    }
}

mod defaults {
    // Monitor defaults
    pub fn selectors() -> Vec<String> {
        vec![
            "table#results".into(),
            "table.dataTable".into(),
            "#events_results_table".into(),
            "div#content table".into(),
            "table".into(),
        ]
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; zpwatch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Diff defaults
    pub fn key_fields() -> Vec<String> {
        vec!["ZID".into(), "Name".into()]
    }
    pub fn tracked_fields() -> Vec<String> {
        vec![
            "Rank".into(),
            "Status".into(),
            "Category".into(),
            "FTP".into(),
            "w/kg".into(),
        ]
    }
    pub fn rank_field() -> String {
        "Rank".into()
    }
    pub fn label_fields() -> Vec<String> {
        vec!["Name".into(), "ZID".into()]
    }

    // Render defaults, sized under the Discord and Telegram hard caps
    pub fn max_markup_chars() -> usize {
        1900
    }
    pub fn max_plain_chars() -> usize {
        3900
    }
    pub fn preview_rows() -> usize {
        10
    }
    pub fn preview_columns() -> usize {
        4
    }

    // Notify defaults
    pub fn send_timeout() -> u64 {
        15
    }
    pub fn max_concurrent() -> usize {
        4
    }

    // Storage defaults
    pub fn storage_root() -> String {
        "storage".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChannelKind;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.monitor.target_url = "https://zwiftpower.com/team.php?id=1".to_string();
        config
    }

    #[test]
    fn validate_accepts_minimal_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_target_url() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_tracked_fields() {
        let mut config = valid_config();
        config.diff.tracked_fields.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_channel() {
        let mut config = valid_config();
        config.channels.push(ChannelConfig {
            name: "broken".to_string(),
            kind: ChannelKind::Discord,
            webhook_url: None,
            bot_token: None,
            chat_id: None,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_selectors_end_with_bare_table() {
        let config = Config::default();
        assert_eq!(config.monitor.selectors.last().unwrap(), "table");
    }

    #[test]
    fn load_parses_channel_table() {
        let toml = r#"
            [monitor]
            target_url = "https://zwiftpower.com/team.php?id=1"

            [[channels]]
            name = "team-discord"
            kind = "discord"
            webhook_url = "https://discord.com/api/webhooks/1/x"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.channels.len(), 1);
        assert!(config.validate().is_ok());
    }
}
