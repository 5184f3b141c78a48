// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Discovery: breadth-first crawl under per-host rate limits.
//!
//! The crawl queue is a grow-only log; consumption is tracked through
//! `visited_urls`/`blocked_urls` and the phase cursor, which makes the
//! phase resume-safe without removing records. Page content is stored
//! under `raw/<association>/` and only its hash travels in the state.

use crate::phases::PhaseCx;
use crate::EngineError;
use scout_core::{PageSnapshot, Phase, QueueEntry};
use serde_json::json;

pub(crate) async fn run(cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
    let mut fetched = 0usize;

    while fetched < cx.config.max_pages && !cx.interrupted() {
        let Some(entry) = next_entry(cx) else {
            break;
        };
        let url = entry.url.clone();

        // Verdict gate: never fetch from a disallowed domain.
        let domain = scout_core::extract_domain(&url);
        let blocked_by_verdict = cx
            .state
            .buckets
            .verdicts
            .get(&domain)
            .is_some_and(|verdict| !verdict.allowed);
        if blocked_by_verdict {
            let at = cx.clock.utc_now();
            let epoch = cx.epoch_ms();
            cx.state.mark_blocked(&url, "gatekeeper verdict", at, epoch)?;
            cx.state.phase_progress.cursor_mut(Phase::Discovery).mark(&url);
            continue;
        }

        let result = cx
            .run_agent(
                "discovery.link_crawler",
                json!({
                    "url": url,
                    "association": entry.association,
                    "max_links": cx.config.max_pages,
                }),
            )
            .await?;

        let epoch = cx.epoch_ms();
        let at = cx.clock.utc_now();
        cx.state.mark_visited(&url, at, epoch)?;
        cx.state.phase_progress.cursor_mut(Phase::Discovery).mark(&url);
        fetched += 1;

        if let Some(result) = result {
            merge_page(cx, &entry, &result.output)?;

            // Same-origin links joined the queue unless already seen.
            let links = result.output["links"].as_array().cloned().unwrap_or_default();
            for link in links.iter().filter_map(|l| l.as_str()) {
                let queued = QueueEntry {
                    depth: entry.depth + 1,
                    source_url: Some(url.clone()),
                    association: entry.association.clone(),
                    ..QueueEntry::new(link)
                };
                let epoch = cx.epoch_ms();
                cx.state.enqueue_url(queued, epoch)?;
            }
        }

        cx.item_done()?;
    }

    tracing::info!(
        job_id = %cx.state.job_id,
        fetched,
        queue = cx.state.buckets.crawl_queue.len(),
        "discovery finished"
    );
    Ok(())
}

/// Highest-priority queue entry not yet processed. Ties resolve to the
/// earliest-queued entry, which keeps the crawl order deterministic.
fn next_entry(cx: &PhaseCx<'_>) -> Option<QueueEntry> {
    let cursor = cx.state.phase_progress.cursor(Phase::Discovery);
    let mut best: Option<&QueueEntry> = None;
    for entry in &cx.state.buckets.crawl_queue {
        if cx.state.buckets.visited_urls.contains(&entry.url)
            || cx.state.buckets.blocked_urls.contains(&entry.url)
            || cursor.is_some_and(|c| c.is_done(&entry.url))
        {
            continue;
        }
        if best.map(|b| entry.priority > b.priority).unwrap_or(true) {
            best = Some(entry);
        }
    }
    best.cloned()
}

/// Persist page content to the raw store and keep the snapshot.
fn merge_page(
    cx: &mut PhaseCx<'_>,
    entry: &QueueEntry,
    output: &serde_json::Value,
) -> Result<(), EngineError> {
    let Some(page) = output.get("page") else {
        return Ok(());
    };
    let mut page = page.clone();
    let content = page
        .as_object_mut()
        .and_then(|obj| obj.remove("content"))
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    let mut snapshot: PageSnapshot = match serde_json::from_value(page) {
        Ok(snapshot) => snapshot,
        Err(error) => {
            tracing::warn!(url = entry.url, error = %error, "malformed page snapshot dropped");
            return Ok(());
        }
    };
    snapshot.page_type = snapshot.page_type.or(entry.page_type_hint);

    if !cx.dry_run && !content.is_empty() {
        let association = entry.association.as_deref().unwrap_or("unsorted");
        let dir = cx.data_root.join("raw").join(association);
        let path = dir.join(format!("{}.html", snapshot.content_hash));
        match std::fs::create_dir_all(&dir).and_then(|()| std::fs::write(&path, &content)) {
            Ok(()) => snapshot.content_location = path.display().to_string(),
            Err(error) => {
                tracing::warn!(url = entry.url, error = %error, "raw content not stored");
            }
        }
    }

    cx.state.buckets.pages.insert(snapshot);
    Ok(())
}
