//! Message rendering for notification dispatch.
//!
//! Turns a diff outcome into per-audience text: a markup-preserving form
//! for channels that display monospace blocks and a plain-text form for
//! channels that render literal text, each independently length-capped.

use unicode_segmentation::UnicodeSegmentation;

use crate::models::{Dataset, RenderConfig};

use super::diff::{DiffOutcome, RankDirection, RowDiff, row_label};

/// Marker appended when a form is cut to its length budget.
const TRUNCATION_MARKER: &str = "\n… [truncated]";

/// A rendered notification in both channel representations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Markup-preserving form, for monospace-block channels
    pub markup: String,
    /// Plain-text form, for literal-text channels
    pub plain: String,
}

/// Body text in both representations, before assembly and truncation.
struct Body {
    mono: String,
    plain: String,
}

/// Renders diff outcomes into per-audience message forms.
#[derive(Debug, Clone)]
pub struct Renderer {
    config: RenderConfig,
    label_fields: Vec<String>,
}

impl Renderer {
    /// Create a renderer with the given limits and label-field order.
    pub fn new(config: RenderConfig, label_fields: Vec<String>) -> Self {
        Self {
            config,
            label_fields,
        }
    }

    /// Render a cycle's outcome.
    ///
    /// An all-empty diff falls back to a preview of the current dataset so
    /// a detected change never produces an empty notification.
    pub fn render(
        &self,
        outcome: &DiffOutcome,
        current: &Dataset,
        source_url: &str,
    ) -> RenderedMessage {
        let (title, body) = match outcome {
            DiffOutcome::Initial(_) => ("Initial roster snapshot", self.preview_body(current)),
            DiffOutcome::Changes(diff) if diff.is_empty() => (
                "Roster changed (no tracked fields differ)",
                self.preview_body(current),
            ),
            DiffOutcome::Changes(diff) => ("Roster changes", self.diff_body(diff)),
        };

        let markup = format!("{title}\n{source_url}\n\n```\n{}\n```", body.mono);
        let plain = format!("{title}\n{source_url}\n\n{}", body.plain);

        RenderedMessage {
            markup: truncate(&markup, self.config.max_markup_chars),
            plain: truncate(&plain, self.config.max_plain_chars),
        }
    }

    /// Compact tabular preview, bounded by the configured row and column
    /// counts. The monospace form pads columns for alignment; the plain
    /// form joins cells with pipes.
    fn preview_body(&self, dataset: &Dataset) -> Body {
        if dataset.rows.is_empty() {
            return Body {
                mono: "(no rows)".to_string(),
                plain: "(no rows)".to_string(),
            };
        }

        // Column names mirror extraction: header names with `col_<n>`
        // filling empty slots, or the first row's own columns when there
        // are no headers at all.
        let mut columns: Vec<String> = if dataset.headers.is_empty() {
            dataset.rows[0].iter().map(|(n, _)| n.to_string()).collect()
        } else {
            dataset
                .headers
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    if h.is_empty() {
                        format!("col_{}", i + 1)
                    } else {
                        h.clone()
                    }
                })
                .collect()
        };
        columns.truncate(self.config.preview_columns);

        let shown = dataset.rows.len().min(self.config.preview_rows);
        let mut grid: Vec<Vec<String>> = vec![columns.clone()];
        for row in &dataset.rows[..shown] {
            grid.push(
                columns
                    .iter()
                    .map(|c| row.get(c).unwrap_or("").to_string())
                    .collect(),
            );
        }

        let widths: Vec<usize> = (0..columns.len())
            .map(|i| {
                grid.iter()
                    .map(|r| r[i].graphemes(true).count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut mono_lines: Vec<String> = Vec::with_capacity(grid.len());
        let mut plain_lines: Vec<String> = Vec::with_capacity(grid.len());
        for row in &grid {
            let padded: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| {
                    let pad = w.saturating_sub(cell.graphemes(true).count());
                    format!("{}{}", cell, " ".repeat(pad))
                })
                .collect();
            mono_lines.push(padded.join("  ").trim_end().to_string());
            plain_lines.push(row.join(" | "));
        }

        let remainder = dataset.rows.len() - shown;
        if remainder > 0 {
            let note = format!("(+{remainder} more rows)");
            mono_lines.push(note.clone());
            plain_lines.push(note);
        }

        Body {
            mono: mono_lines.join("\n"),
            plain: plain_lines.join("\n"),
        }
    }

    /// Added / Removed / Changed sections; empty sections are omitted.
    fn diff_body(&self, diff: &RowDiff) -> Body {
        let mut lines: Vec<String> = Vec::new();

        if !diff.added.is_empty() {
            lines.push("Added:".to_string());
            for row in &diff.added {
                lines.push(format!("+ {}", row_label(row, &self.label_fields)));
            }
        }

        if !diff.removed.is_empty() {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push("Removed:".to_string());
            for row in &diff.removed {
                lines.push(format!("- {}", row_label(row, &self.label_fields)));
            }
        }

        if !diff.changed.is_empty() {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push("Changed:".to_string());
            for changed in &diff.changed {
                let deltas: Vec<String> = changed
                    .changes
                    .iter()
                    .map(|c| {
                        let old = display_value(&c.old);
                        let new = display_value(&c.new);
                        match c.direction {
                            Some(direction) => format!(
                                "{} {} → {} {}",
                                c.field,
                                old,
                                new,
                                direction_marker(direction)
                            ),
                            None => format!("{} {} → {}", c.field, old, new),
                        }
                    })
                    .collect();
                lines.push(format!("* {}: {}", changed.label, deltas.join(", ")));
            }
        }

        let body = lines.join("\n");
        Body {
            mono: body.clone(),
            plain: body,
        }
    }
}

fn display_value(value: &str) -> &str {
    if value.is_empty() { "(empty)" } else { value }
}

fn direction_marker(direction: RankDirection) -> &'static str {
    match direction {
        RankDirection::Improved => "▲",
        RankDirection::Declined => "▼",
        RankDirection::Neutral => "•",
    }
}

/// Cap the assembled message at `max_chars` graphemes, appending a marker
/// when anything was cut.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.graphemes(true).count() <= max_chars {
        return text.to_string();
    }
    let marker_len = TRUNCATION_MARKER.graphemes(true).count();
    let keep = max_chars.saturating_sub(marker_len);
    let cut: String = text.graphemes(true).take(keep).collect();
    format!("{cut}{TRUNCATION_MARKER}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiffConfig, Row};
    use crate::pipeline::diff::DiffEngine;

    fn renderer() -> Renderer {
        Renderer::new(RenderConfig::default(), DiffConfig::default().label_fields)
    }

    fn rider(zid: &str, name: &str, rank: &str, status: &str) -> Row {
        let mut row = Row::new();
        row.set("ZID", zid);
        row.set("Name", name);
        row.set("Rank", rank);
        row.set("Status", status);
        row
    }

    fn dataset(rows: Vec<Row>) -> Dataset {
        Dataset::new(
            vec!["ZID".into(), "Name".into(), "Rank".into(), "Status".into()],
            rows,
        )
    }

    const URL: &str = "https://zwiftpower.com/team.php?id=1";

    #[test]
    fn test_initial_snapshot_message() {
        let rows = vec![rider("1001", "Alice", "1", "active")];
        let outcome = DiffOutcome::Initial(rows.clone());
        let message = renderer().render(&outcome, &dataset(rows), URL);

        assert!(message.markup.starts_with("Initial roster snapshot"));
        assert!(message.markup.contains(URL));
        assert!(message.markup.contains("```"));
        assert!(message.plain.contains("Alice"));
        assert!(!message.plain.contains("```"));
    }

    #[test]
    fn test_diff_sections_and_rank_marker() {
        let engine = DiffEngine::new(DiffConfig::default());
        let prev = vec![
            rider("1001", "Alice", "5", "active"),
            rider("1002", "Bob", "2", "active"),
        ];
        let curr = vec![
            rider("1001", "Alice", "2", "active"),
            rider("1003", "Carol", "9", "active"),
        ];
        let outcome = engine.diff(Some(prev.as_slice()), curr.as_slice());
        let message = renderer().render(&outcome, &dataset(curr.clone()), URL);

        assert!(message.plain.contains("Added:"));
        assert!(message.plain.contains("+ Carol"));
        assert!(message.plain.contains("Removed:"));
        assert!(message.plain.contains("- Bob"));
        assert!(message.plain.contains("Changed:"));
        assert!(message.plain.contains("Rank 5 → 2 ▲"));
    }

    #[test]
    fn test_decline_and_neutral_markers() {
        let engine = DiffEngine::new(DiffConfig::default());

        let prev = vec![rider("1001", "Alice", "2", "active")];
        let curr = vec![rider("1001", "Alice", "5", "active")];
        let outcome = engine.diff(Some(prev.as_slice()), curr.as_slice());
        let message = renderer().render(&outcome, &dataset(curr), URL);
        assert!(message.plain.contains("Rank 2 → 5 ▼"));

        let prev = vec![rider("1001", "Alice", "-", "active")];
        let curr = vec![rider("1001", "Alice", "5", "active")];
        let outcome = engine.diff(Some(prev.as_slice()), curr.as_slice());
        let message = renderer().render(&outcome, &dataset(curr), URL);
        assert!(message.plain.contains("Rank - → 5 •"));
    }

    #[test]
    fn test_empty_sections_omitted() {
        let engine = DiffEngine::new(DiffConfig::default());
        let prev = vec![rider("1001", "Alice", "1", "active")];
        let curr = vec![
            rider("1001", "Alice", "1", "active"),
            rider("1002", "Bob", "2", "active"),
        ];
        let outcome = engine.diff(Some(prev.as_slice()), curr.as_slice());
        let message = renderer().render(&outcome, &dataset(curr), URL);

        assert!(message.plain.contains("Added:"));
        assert!(!message.plain.contains("Removed:"));
        assert!(!message.plain.contains("Changed:"));
    }

    #[test]
    fn test_empty_diff_falls_back_to_preview() {
        let rows = vec![rider("1001", "Alice", "1", "active")];
        let outcome = DiffOutcome::Changes(RowDiff::default());
        let message = renderer().render(&outcome, &dataset(rows), URL);

        assert!(message.plain.contains("no tracked fields differ"));
        assert!(message.plain.contains("Alice"));
    }

    #[test]
    fn test_preview_bounds_and_remainder_note() {
        let rows: Vec<Row> = (0..15)
            .map(|i| rider(&format!("{}", 1000 + i), &format!("Rider{i}"), "1", "active"))
            .collect();
        let outcome = DiffOutcome::Initial(rows.clone());
        let message = renderer().render(&outcome, &dataset(rows), URL);

        assert!(message.plain.contains("(+5 more rows)"));
        assert!(message.plain.contains("Rider9"));
        assert!(!message.plain.contains("Rider10"));
    }

    #[test]
    fn test_truncation_appends_marker() {
        let config = RenderConfig {
            max_markup_chars: 120,
            max_plain_chars: 120,
            ..RenderConfig::default()
        };
        let renderer = Renderer::new(config, DiffConfig::default().label_fields);

        let rows: Vec<Row> = (0..10)
            .map(|i| rider(&format!("{}", 1000 + i), &format!("VeryLongRiderName{i}"), "1", "active"))
            .collect();
        let outcome = DiffOutcome::Initial(rows.clone());
        let message = renderer.render(&outcome, &dataset(rows), URL);

        assert!(message.plain.ends_with("[truncated]"));
        assert!(message.plain.graphemes(true).count() <= 120);
        assert!(message.markup.graphemes(true).count() <= 120);
    }

    #[test]
    fn test_forms_truncate_independently() {
        let config = RenderConfig {
            max_markup_chars: 100,
            max_plain_chars: 4000,
            ..RenderConfig::default()
        };
        let renderer = Renderer::new(config, DiffConfig::default().label_fields);

        let rows: Vec<Row> = (0..8)
            .map(|i| rider(&format!("{}", 1000 + i), &format!("Rider{i}"), "1", "active"))
            .collect();
        let message = renderer.render(&DiffOutcome::Initial(rows.clone()), &dataset(rows), URL);

        assert!(message.markup.ends_with("[truncated]"));
        assert!(!message.plain.ends_with("[truncated]"));
    }
}
