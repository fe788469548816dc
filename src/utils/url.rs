// src/utils/url.rs

//! URL helpers for rider identification.

use std::sync::OnceLock;

use regex::Regex;

static PROFILE_HREF: OnceLock<Regex> = OnceLock::new();

/// Extract a stable rider identifier from a profile hyperlink.
///
/// Recognizes ZwiftPower profile references carrying a numeric id parameter
/// (`profile.php?z=12345`, `z`/`zid` variants). Roster pages link profiles
/// relatively, so non-absolute hrefs are matched textually.
pub fn extract_rider_id(href: &str) -> Option<String> {
    if let Ok(parsed) = url::Url::parse(href) {
        if !parsed.path().to_lowercase().contains("profile") {
            return None;
        }
        for (key, value) in parsed.query_pairs() {
            let key = key.to_lowercase();
            if (key == "z" || key == "zid")
                && !value.is_empty()
                && value.chars().all(|c| c.is_ascii_digit())
            {
                return Some(value.to_string());
            }
        }
        return None;
    }

    // Relative href fallback
    let re = PROFILE_HREF.get_or_init(|| {
        Regex::new(r"(?i)profile[^?\s]*\?(?:[^#\s]*&)?z(?:id)?=(\d+)").expect("valid pattern")
    });
    re.captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
