// src/pipeline/cycle.rs

//! One check-and-notify cycle.
//!
//! Fetch the watched fragment, fingerprint it, and when the fingerprint
//! moved: diff against the stored snapshot, render, dispatch, then update
//! the store. Dispatch always runs before the store is overwritten, so a
//! crash in between re-diffs on the next run instead of dropping the
//! notification.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::extract::{extract, fingerprint, stabilize};
use crate::models::{Config, Snapshot};
use crate::services::fetch::PageFetcher;
use crate::services::notify::{DispatchReport, Dispatcher};
use crate::storage::SnapshotStore;

use super::diff::{DiffEngine, DiffOutcome};
use super::render::Renderer;

/// Outcome summary of one cycle, for logging and exit-status decisions.
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    /// Whether the fingerprint moved this cycle
    pub changed: bool,
    /// Fingerprint of the fetched fragment
    pub fingerprint: String,
    /// Whether this was the first-ever observation
    pub initial: bool,
    pub added: usize,
    pub removed: usize,
    pub changed_rows: usize,
    /// Whether the new snapshot reached the store
    pub snapshot_saved: bool,
    /// Per-channel delivery results
    pub dispatch: DispatchReport,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CycleSummary {
    fn unchanged(fingerprint: String, started_at: DateTime<Utc>) -> Self {
        Self {
            changed: false,
            fingerprint,
            initial: false,
            added: 0,
            removed: 0,
            changed_rows: 0,
            snapshot_saved: false,
            dispatch: DispatchReport::default(),
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Run one check-and-notify cycle.
///
/// Fetch failure is fatal for the cycle; store and channel failures are
/// recorded and logged but never abort it.
pub async fn run_cycle(
    config: &Config,
    fetcher: &dyn PageFetcher,
    store: &dyn SnapshotStore,
    dispatcher: &Dispatcher,
) -> Result<CycleSummary> {
    let started_at = Utc::now();
    log::info!("Checking {}", config.monitor.target_url);

    let html = fetcher
        .fetch(&config.monitor.target_url, &config.monitor.selectors)
        .await?;

    let dataset = extract(&html);
    let digest = fingerprint(&stabilize(&html));
    log::debug!(
        "Extracted {} rows, fingerprint {}",
        dataset.rows.len(),
        digest
    );

    let previous = match store.load().await {
        Ok(previous) => previous,
        Err(e) => {
            log::warn!("Snapshot load failed: {}. Treating as first run.", e);
            None
        }
    };

    if let Some(prev) = &previous {
        if prev.fingerprint == digest {
            log::info!("No change");
            return Ok(CycleSummary::unchanged(digest, started_at));
        }
    }

    let engine = DiffEngine::new(config.diff.clone());
    let outcome = engine.diff(
        previous.as_ref().map(|s| s.dataset.rows.as_slice()),
        &dataset.rows,
    );

    let (initial, added, removed, changed_rows) = match &outcome {
        DiffOutcome::Initial(rows) => (true, rows.len(), 0, 0),
        DiffOutcome::Changes(diff) => {
            (false, diff.added.len(), diff.removed.len(), diff.changed.len())
        }
    };
    if initial {
        log::info!("First observation: {} rows", added);
    } else {
        log::info!(
            "Change detected: {} added, {} removed, {} changed",
            added,
            removed,
            changed_rows
        );
    }

    let renderer = Renderer::new(config.render.clone(), config.diff.label_fields.clone());
    let message = renderer.render(&outcome, &dataset, &config.monitor.target_url);

    let dispatch = dispatcher.dispatch(&message, &config.channels).await;
    for attempt in &dispatch.attempts {
        match &attempt.error {
            None => log::info!("Delivered to {}", attempt.channel),
            Some(e) => log::warn!("Delivery to {} failed: {}", attempt.channel, e),
        }
    }
    if dispatch.is_empty() {
        log::info!("No channels configured; change logged only");
    }

    let snapshot = Snapshot::new(digest.clone(), dataset);
    let snapshot_saved = match store.save(&snapshot).await {
        Ok(()) => true,
        Err(e) => {
            log::error!("Snapshot save failed: {}", e);
            false
        }
    };

    Ok(CycleSummary {
        changed: true,
        fingerprint: digest,
        initial,
        added,
        removed,
        changed_rows,
        snapshot_saved,
        dispatch,
        started_at,
        finished_at: Utc::now(),
    })
}
