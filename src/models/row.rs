//! Roster row and dataset structures.

use serde::{Deserialize, Serialize};

/// Column name of the derived rider identifier.
pub const ZID_FIELD: &str = "ZID";

/// A single roster row: an insertion-ordered mapping from column name to
/// cell text.
///
/// Rows have no identity beyond their field content; matching across
/// snapshots is done by the diff engine's key function. Serializes
/// transparently as a sequence of `[name, value]` pairs so stored datasets
/// keep their column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing the value of an existing column of the same
    /// name or appending a new column.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Get a field value. Absent columns are an explicit `None`; callers at
    /// the diff/render boundary decide whether to treat that as empty text.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the row has a column of the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Field pairs sorted by column name, for structural keying.
    pub fn sorted_fields(&self) -> Vec<(&str, &str)> {
        let mut fields: Vec<(&str, &str)> = self.iter().collect();
        fields.sort();
        fields
    }
}

/// An extracted dataset: ordered rows plus the header list that produced
/// them. Row order reflects document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Header names in document order
    pub headers: Vec<String>,

    /// Extracted rows in document order
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Create a dataset from headers and rows.
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    /// Whether the dataset contains no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_existing_column() {
        let mut row = Row::new();
        row.set("Name", "Alice");
        row.set("Name", "Bob");
        assert_eq!(row.get("Name"), Some("Bob"));
        assert_eq!(row.len(), 1);
    }

    #[test]
    fn test_get_absent_column() {
        let row = Row::new();
        assert_eq!(row.get("Rank"), None);
        assert!(!row.contains("Rank"));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut row = Row::new();
        row.set("Rank", "1");
        row.set("Name", "Alice");
        row.set("FTP", "280");
        let names: Vec<&str> = row.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Rank", "Name", "FTP"]);
    }

    #[test]
    fn test_sorted_fields() {
        let mut row = Row::new();
        row.set("Rank", "1");
        row.set("Name", "Alice");
        assert_eq!(row.sorted_fields(), vec![("Name", "Alice"), ("Rank", "1")]);
    }

    #[test]
    fn test_serializes_as_ordered_pairs() {
        let mut row = Row::new();
        row.set("Rank", "2");
        row.set("Name", "Alice");
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"[["Rank","2"],["Name","Alice"]]"#);

        let back: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }
}
