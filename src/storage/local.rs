//! Local filesystem snapshot storage.
//!
//! Stores the snapshot as pretty-printed JSON under a root directory,
//! written atomically (temp file, then rename) so a concurrent reader
//! never sees a partial snapshot.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Snapshot;
use crate::storage::SnapshotStore;

const SNAPSHOT_FILE: &str = "snapshot.json";

/// Filesystem storage backend rooted at a directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root_dir: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn snapshot_path(&self) -> PathBuf {
        self.root_dir.join(SNAPSHOT_FILE)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &PathBuf, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for LocalStore {
    async fn load(&self) -> Result<Option<Snapshot>> {
        match tokio::fs::read(self.snapshot_path()).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        self.write_bytes(&self.snapshot_path(), &bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dataset, Row};
    use tempfile::TempDir;

    fn sample_snapshot(fingerprint: &str, name: &str) -> Snapshot {
        let mut row = Row::new();
        row.set("Name", name);
        row.set("Rank", "1");
        Snapshot::new(
            fingerprint,
            Dataset::new(vec!["Name".into(), "Rank".into()], vec![row]),
        )
    }

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        store.save(&sample_snapshot("abc", "Alice")).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.fingerprint, "abc");
        assert_eq!(loaded.dataset.rows[0].get("Name"), Some("Alice"));
    }

    #[tokio::test]
    async fn test_save_overwrites_previous() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        store.save(&sample_snapshot("old", "Alice")).await.unwrap();
        store.save(&sample_snapshot("new", "Bob")).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.fingerprint, "new");
        assert_eq!(loaded.dataset.rows[0].get("Name"), Some("Bob"));
    }

    #[tokio::test]
    async fn test_creates_missing_root_dir() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path().join("nested/state"));

        store.save(&sample_snapshot("abc", "Alice")).await.unwrap();
        assert!(store.load().await.unwrap().is_some());
    }
}
