//! Snapshot persistence.
//!
//! One snapshot (fingerprint + dataset) is read before diffing and written
//! at most once per cycle, after notifications have been attempted.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Snapshot;

// Re-export for convenience
pub use local::LocalStore;

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the previous snapshot; `None` on the first-ever run.
    async fn load(&self) -> Result<Option<Snapshot>>;

    /// Persist the snapshot atomically, replacing any previous one.
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;
}
