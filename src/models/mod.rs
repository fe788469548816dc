// src/models/mod.rs

//! Domain models for the monitor application.

mod channel;
mod config;
mod row;
mod snapshot;

// Re-export all public types
pub use channel::{ChannelConfig, ChannelKind};
pub use config::{Config, DiffConfig, MonitorConfig, NotifyConfig, RenderConfig, StorageConfig};
pub use row::{Dataset, Row, ZID_FIELD};
pub use snapshot::Snapshot;
