// src/services/fetch.rs

//! Page fetching seam and selector-candidate matching.
//!
//! The watched fragment is located by an ordered list of selector
//! candidates; each attempt is recorded as an explicit outcome rather than
//! threaded through error handling, and the page body is the final
//! fallback.

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::MonitorConfig;
use crate::utils::http;

/// Parse a selector candidate, mapping failures into a selector error.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Outcome of one selector attempt against the fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Selector matched; its fragment was captured
    Matched,
    /// Selector is valid but matched nothing
    NoMatch,
    /// Selector did not become visible within the fetcher's wait budget
    /// (only produced by wait-based fetchers)
    TimedOut,
    /// Selector failed to parse
    Invalid(String),
}

/// One entry of the ordered selector-candidate scan.
#[derive(Debug, Clone)]
pub struct SelectorAttempt {
    pub selector: String,
    pub outcome: AttemptOutcome,
}

/// Result of fragment selection: the chosen fragment plus the attempt
/// trail.
#[derive(Debug, Clone)]
pub struct FragmentMatch {
    /// Markup of the first matching candidate (the element itself, so a
    /// matched table survives re-parsing), else the body content fallback
    pub html: String,
    /// The candidate that matched, if any
    pub selector: Option<String>,
    /// Ordered record of every attempt
    pub attempts: Vec<SelectorAttempt>,
}

/// Pick the first selector candidate present in the page, falling back to
/// the whole body. More selective candidates belong first; the body
/// fallback causes more change noise.
pub fn select_fragment(html: &str, candidates: &[String]) -> FragmentMatch {
    let document = Html::parse_document(html);
    let mut attempts = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match Selector::parse(candidate) {
            Err(e) => attempts.push(SelectorAttempt {
                selector: candidate.clone(),
                outcome: AttemptOutcome::Invalid(format!("{e:?}")),
            }),
            Ok(selector) => match document.select(&selector).next() {
                Some(el) => {
                    attempts.push(SelectorAttempt {
                        selector: candidate.clone(),
                        outcome: AttemptOutcome::Matched,
                    });
                    return FragmentMatch {
                        html: el.html(),
                        selector: Some(candidate.clone()),
                        attempts,
                    };
                }
                None => attempts.push(SelectorAttempt {
                    selector: candidate.clone(),
                    outcome: AttemptOutcome::NoMatch,
                }),
            },
        }
    }

    let body = Selector::parse("body").expect("valid static selector");
    let html = document
        .select(&body)
        .next()
        .map(|el| el.inner_html())
        .unwrap_or_else(|| html.to_string());

    FragmentMatch {
        html,
        selector: None,
        attempts,
    }
}

/// Source of the watched page's markup fragment.
///
/// The production implementation for authenticated, script-rendered pages
/// (a headless browser holding a stored session) lives outside this crate;
/// the built-in implementation fetches server-rendered pages over plain
/// HTTP.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page and return the markup of the first selector
    /// candidate that matches, falling back to the page body content.
    async fn fetch(&self, url: &str, selectors: &[String]) -> Result<String>;
}

/// HTTP fetcher for server-rendered pages.
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    /// Create a fetcher with a client configured from the monitor settings.
    pub fn new(config: &MonitorConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_async_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str, selectors: &[String]) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::fetch(url, e))?;
        let text = response.text().await?;

        let matched = select_fragment(&text, selectors);
        for attempt in &matched.attempts {
            match &attempt.outcome {
                AttemptOutcome::Invalid(reason) => {
                    log::warn!("Selector '{}' is invalid: {}", attempt.selector, reason);
                }
                AttemptOutcome::NoMatch | AttemptOutcome::TimedOut => {
                    log::debug!("Selector '{}' matched nothing", attempt.selector);
                }
                AttemptOutcome::Matched => {}
            }
        }
        match &matched.selector {
            Some(selector) => log::debug!("Watching fragment '{}'", selector),
            None => log::debug!("No selector matched; watching page body"),
        }

        Ok(matched.html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div id="content">
            <table class="dataTable"><tr><td>inner</td></tr></table>
          </div>
        </body></html>
    "#;

    fn candidates(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_matching_candidate_wins() {
        let result = select_fragment(PAGE, &candidates(&["table.dataTable", "table"]));
        assert_eq!(result.selector.as_deref(), Some("table.dataTable"));
        assert!(result.html.contains("inner"));
        // The matched element itself is kept, so extraction can find it.
        assert!(result.html.starts_with("<table"));
        assert_eq!(result.attempts.len(), 1);
    }

    #[test]
    fn test_non_matching_candidates_recorded() {
        let result = select_fragment(PAGE, &candidates(&["table#results", "table"]));
        assert_eq!(result.selector.as_deref(), Some("table"));
        assert_eq!(result.attempts.len(), 2);
        assert_eq!(result.attempts[0].outcome, AttemptOutcome::NoMatch);
        assert_eq!(result.attempts[1].outcome, AttemptOutcome::Matched);
    }

    #[test]
    fn test_invalid_selector_skipped() {
        let result = select_fragment(PAGE, &candidates(&["[[broken", "table"]));
        assert_eq!(result.selector.as_deref(), Some("table"));
        assert!(matches!(
            result.attempts[0].outcome,
            AttemptOutcome::Invalid(_)
        ));
    }

    #[test]
    fn test_body_fallback_when_nothing_matches() {
        let result = select_fragment(PAGE, &candidates(&["table#results"]));
        assert!(result.selector.is_none());
        assert!(result.html.contains("content"));
    }

    #[test]
    fn test_empty_candidate_list_yields_body() {
        let result = select_fragment(PAGE, &[]);
        assert!(result.selector.is_none());
        assert!(result.attempts.is_empty());
        assert!(result.html.contains("dataTable"));
    }

    #[test]
    fn test_parse_selector_valid() {
        assert!(parse_selector("div#content table").is_ok());
        assert!(parse_selector("tr:has(a)").is_ok());
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(parse_selector("[[invalid").is_err());
    }
}
