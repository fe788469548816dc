//! Diff calculation between roster snapshots.
//!
//! Computes added, removed and changed rows between the previous and
//! current datasets for notification dispatch. Rows are matched by a keyed
//! comparison; only tracked fields classify a matched row as changed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::{DiffConfig, Row};

/// The value used to match the same logical entity across two snapshots,
/// tagged with the field that supplied it. Rows keyed by different fields
/// never match, even if the values coincide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    /// A natural key taken from a configured key field
    Field { name: String, value: String },
    /// Hash of the full sorted field content, when no natural key exists
    Structural(String),
}

/// Direction of a rank change. Numerically lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankDirection {
    Improved,
    Declined,
    Neutral,
}

/// One tracked field's old/new values on a matched row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldChange {
    /// Tracked field name
    pub field: String,
    /// Previous cell text (empty when the column was absent)
    pub old: String,
    /// Current cell text (empty when the column is absent)
    pub new: String,
    /// Set only for the rank field
    pub direction: Option<RankDirection>,
}

/// A matched row with at least one tracked-field difference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedRow {
    /// Display label for the row
    pub label: String,
    /// Tracked-field deltas, rank delta first when present
    pub changes: Vec<FieldChange>,
}

/// Added/removed/changed row sets between two snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowDiff {
    pub added: Vec<Row>,
    pub removed: Vec<Row>,
    pub changed: Vec<ChangedRow>,
}

impl RowDiff {
    /// Check if there are any changes.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }
}

/// Result of diffing the current rows against the stored ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DiffOutcome {
    /// No prior snapshot existed; carries the current rows verbatim
    Initial(Vec<Row>),
    /// Field-level diff against the prior snapshot
    Changes(RowDiff),
}

/// Calculator for keyed, field-level diffs.
///
/// Key, tracked and label fields are configuration: which columns identify
/// a rider and which count as "interesting" is a deployment concern, not
/// part of the algorithm.
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    config: DiffConfig,
}

impl DiffEngine {
    /// Create a diff engine with the given field configuration.
    pub fn new(config: DiffConfig) -> Self {
        Self { config }
    }

    /// Compute the diff, or the initial-snapshot signal when there is no
    /// previous dataset to compare against.
    pub fn diff(&self, previous: Option<&[Row]>, current: &[Row]) -> DiffOutcome {
        let Some(previous) = previous else {
            return DiffOutcome::Initial(current.to_vec());
        };

        let prev_index = self.index(previous);
        let curr_index = self.index(current);

        let mut diff = RowDiff::default();

        for (key, row) in &curr_index {
            match prev_index.get(key) {
                None => diff.added.push((*row).clone()),
                Some(prev_row) => {
                    let changes = self.compare_tracked(prev_row, row);
                    if !changes.is_empty() {
                        diff.changed.push(ChangedRow {
                            label: self.row_label(row),
                            changes,
                        });
                    }
                }
            }
        }

        for (key, row) in &prev_index {
            if !curr_index.contains_key(key) {
                diff.removed.push((*row).clone());
            }
        }

        DiffOutcome::Changes(diff)
    }

    /// Key→row index. Rows sharing a key collapse to one entry, last write
    /// wins; natural keys are expected to be unique per cycle.
    fn index<'a>(&self, rows: &'a [Row]) -> HashMap<RowKey, &'a Row> {
        rows.iter().map(|row| (self.row_key(row), row)).collect()
    }

    /// The first configured key field with non-empty trimmed text supplies
    /// the key; rows without any natural key get a structural one, so every
    /// row maps to some key.
    pub fn row_key(&self, row: &Row) -> RowKey {
        for field in &self.config.key_fields {
            if let Some(value) = row.get(field) {
                let value = value.trim();
                if !value.is_empty() {
                    return RowKey::Field {
                        name: field.clone(),
                        value: value.to_string(),
                    };
                }
            }
        }
        RowKey::Structural(structural_key(row))
    }

    /// Display label for a row.
    pub fn row_label(&self, row: &Row) -> String {
        row_label(row, &self.config.label_fields)
    }

    /// Tracked-field comparison. Exact string inequality only; untracked
    /// churn is intentionally ignored.
    fn compare_tracked(&self, prev: &Row, curr: &Row) -> Vec<FieldChange> {
        let mut changes = Vec::new();
        for field in &self.config.tracked_fields {
            let old = prev.get(field).unwrap_or("");
            let new = curr.get(field).unwrap_or("");
            if old != new {
                let direction =
                    (field == &self.config.rank_field).then(|| rank_direction(old, new));
                changes.push(FieldChange {
                    field: field.clone(),
                    old: old.to_string(),
                    new: new.to_string(),
                    direction,
                });
            }
        }
        // Surface the rank delta first; the sort is stable so the tracked
        // order is kept for the rest.
        changes.sort_by_key(|c| c.direction.is_none());
        changes
    }
}

/// Display label for a row: the first non-empty label field, else a short
/// structural-key prefix.
pub fn row_label(row: &Row, label_fields: &[String]) -> String {
    for field in label_fields {
        if let Some(value) = row.get(field) {
            let value = value.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }
    let key = structural_key(row);
    format!("row:{}", &key[..8])
}

/// Content hash over the sorted field pairs of a row.
fn structural_key(row: &Row) -> String {
    let mut hasher = Sha256::new();
    for (name, value) in row.sorted_fields() {
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        hasher.update(value.as_bytes());
        hasher.update([1u8]);
    }
    hex::encode(hasher.finalize())
}

/// Directional marker for a rank change. Digits are extracted from each
/// side; a non-numeric value on either side is neutral.
fn rank_direction(old: &str, new: &str) -> RankDirection {
    match (parse_rank(old), parse_rank(new)) {
        (Some(o), Some(n)) if n < o => RankDirection::Improved,
        (Some(o), Some(n)) if n > o => RankDirection::Declined,
        _ => RankDirection::Neutral,
    }
}

fn parse_rank(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() { None } else { digits.parse().ok() }
}
