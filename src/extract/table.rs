// src/extract/table.rs

//! Roster table extraction.
//!
//! Parses an HTML fragment into an ordered sequence of structured rows plus
//! the header list used to name their columns. Extraction is total: missing
//! or malformed markup degrades to an empty dataset, never an error.

use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};

use crate::models::{Dataset, Row, ZID_FIELD};
use crate::utils::url::extract_rider_id;

static TABLE: OnceLock<Selector> = OnceLock::new();
static HEAD_CELLS: OnceLock<Selector> = OnceLock::new();
static HEAD_FALLBACK_CELLS: OnceLock<Selector> = OnceLock::new();
static BODY_ROWS: OnceLock<Selector> = OnceLock::new();
static CELLS: OnceLock<Selector> = OnceLock::new();
static LINKS: OnceLock<Selector> = OnceLock::new();

fn sel(cell: &'static OnceLock<Selector>, css: &'static str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).expect("valid static selector"))
}

/// Extract the first table in the fragment into a dataset.
pub fn extract(html: &str) -> Dataset {
    let fragment = Html::parse_fragment(html);
    let Some(table) = fragment.select(sel(&TABLE, "table")).next() else {
        return Dataset::default();
    };

    // Explicit header cells first.
    let mut headers: Vec<String> = table
        .select(sel(&HEAD_CELLS, "thead th"))
        .map(cell_text)
        .collect();
    if headers.is_empty() {
        headers = table
            .select(sel(&HEAD_FALLBACK_CELLS, "thead td"))
            .map(cell_text)
            .collect();
    }

    // The parser wraps stray rows in an implicit tbody, so the non-head
    // rows are `tbody tr` either way. Without an explicit head the first
    // row doubles as the header list and is not re-counted as data.
    let body_rows: Vec<ElementRef> = table.select(sel(&BODY_ROWS, "tbody tr")).collect();
    let body_rows: &[ElementRef] = if headers.is_empty() {
        if let Some(first_row) = body_rows.first() {
            headers = first_row
                .select(sel(&CELLS, "th, td"))
                .map(cell_text)
                .collect();
        }
        body_rows.get(1..).unwrap_or(&[])
    } else {
        &body_rows
    };

    let rows = body_rows
        .iter()
        .filter_map(|tr| parse_row(tr, &headers))
        .collect();
    Dataset::new(headers, rows)
}

/// Parse one body row. Rows with zero cells are skipped entirely.
fn parse_row(tr: &ElementRef, headers: &[String]) -> Option<Row> {
    let cells: Vec<String> = tr.select(sel(&CELLS, "th, td")).map(cell_text).collect();
    if cells.is_empty() {
        return None;
    }

    let mut row = Row::new();
    for (i, cell) in cells.into_iter().enumerate() {
        let name = headers
            .get(i)
            .filter(|h| !h.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("col_{}", i + 1));
        row.set(name, cell);
    }

    // Derived rider id from the first profile link, unless a literal ZID
    // column already supplied one.
    if !row.contains(ZID_FIELD) {
        let zid = tr
            .select(sel(&LINKS, "a[href]"))
            .find_map(|a| a.value().attr("href").and_then(extract_rider_id));
        if let Some(zid) = zid {
            row.set(ZID_FIELD, zid);
        }
    }

    Some(row)
}

/// Trimmed inner text of a cell, inner whitespace joined to single spaces.
fn cell_text(el: ElementRef) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}
