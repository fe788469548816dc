// src/extract/stabilize.rs

//! Markup stabilization before fingerprinting.
//!
//! Naive full-markup hashing over-triggers on cosmetic re-renders:
//! regenerated element ids, DataTables `data-*` state, render timestamps.
//! Stabilization strips those attributes and collapses whitespace so the
//! fingerprint only moves on a content change.
//!
//! This is literal pattern replacement over the markup text, not DOM
//! mutation — an accepted approximation.

use std::sync::OnceLock;

use regex::Regex;

static ID_ATTRS: OnceLock<Regex> = OnceLock::new();
static DATA_ATTRS: OnceLock<Regex> = OnceLock::new();
static TIME_ATTRS: OnceLock<Regex> = OnceLock::new();
static WHITESPACE: OnceLock<Regex> = OnceLock::new();

/// Normalize an HTML fragment for fingerprinting.
///
/// Pure and total; idempotent, so `stabilize(stabilize(x)) == stabilize(x)`.
pub fn stabilize(html: &str) -> String {
    let id_re = ID_ATTRS
        .get_or_init(|| Regex::new(r#"\s+id=("[^"]*"|'[^']*')"#).expect("valid pattern"));
    let data_re = DATA_ATTRS
        .get_or_init(|| Regex::new(r#"\s+data-[\w-]+=("[^"]*"|'[^']*')"#).expect("valid pattern"));
    let time_re = TIME_ATTRS.get_or_init(|| {
        Regex::new(r#"(?i)\s+(?:datetime|timestamp)=("[^"]*"|'[^']*')"#).expect("valid pattern")
    });
    let ws_re = WHITESPACE.get_or_init(|| Regex::new(r"\s{2,}").expect("valid pattern"));

    let text = id_re.replace_all(html, "");
    let text = data_re.replace_all(&text, "");
    let text = time_re.replace_all(&text, "");
    let text = ws_re.replace_all(&text, " ");
    text.trim().to_string()
}
