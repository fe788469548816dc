//! Persisted snapshot structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::row::Dataset;

/// The persisted pair consumed by the next cycle's diff: the fingerprint of
/// the stabilized fragment plus the dataset it was computed from. Written
/// only when a change is detected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Hex digest of the stabilized fragment
    pub fingerprint: String,

    /// When the snapshot was captured
    pub captured_at: DateTime<Utc>,

    /// The extracted dataset at capture time
    pub dataset: Dataset,
}

impl Snapshot {
    /// Create a snapshot stamped with the current time.
    pub fn new(fingerprint: impl Into<String>, dataset: Dataset) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            captured_at: Utc::now(),
            dataset,
        }
    }
}
