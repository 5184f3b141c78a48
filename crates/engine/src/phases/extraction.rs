// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Extraction: route each page to its extractor and merge the returned
//! records into the typed buckets.
//!
//! Pages are dispatched in bounded-parallel batches; results merge in
//! input order, so bucket contents are deterministic for a given queue.

use crate::phases::{classification::read_content, PhaseCx};
use crate::EngineError;
use scout_core::{AgentTask, Company, EventRecord, PageSnapshot, Participant, PageType, Phase};
use serde_json::json;
use std::time::Duration;

pub(crate) async fn run(cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
    loop {
        if cx.interrupted() {
            return Ok(());
        }

        // Next batch of unprocessed, extractable pages.
        let batch: Vec<PageSnapshot> = {
            let cursor = cx.state.phase_progress.cursor(Phase::Extraction);
            cx.state
                .buckets
                .pages
                .iter()
                .filter(|page| !page.auth_required)
                .filter(|page| !cursor.is_some_and(|c| c.is_done(&page.url)))
                .take(cx.config.max_concurrent)
                .cloned()
                .collect()
        };
        if batch.is_empty() {
            break;
        }

        // Group the batch by extractor so each parallel dispatch is a
        // single agent type, then run groups in order.
        let mut groups: Vec<(String, Vec<PageSnapshot>)> = Vec::new();
        for page in batch {
            let extractor = extractor_for(&page);
            match groups.iter_mut().find(|(name, _)| *name == extractor) {
                Some((_, pages)) => pages.push(page),
                None => groups.push((extractor, vec![page])),
            }
        }

        for (extractor, pages) in groups {
            let tasks: Vec<AgentTask> = pages
                .iter()
                .map(|page| {
                    AgentTask::new(
                        &extractor,
                        json!({
                            "url": page.url,
                            "content": read_content(cx, &page.content_location),
                            "association": page.association,
                            "page_type": page.page_type.map(|t| t.to_string()),
                        }),
                    )
                    .with_deadline(Duration::from_secs(cx.config.agent_timeout_secs))
                })
                .collect();

            let results = cx
                .executor
                .spawn_parallel(&extractor, tasks, cx.config.max_concurrent)
                .await;

            for (page, result) in pages.iter().zip(results) {
                match result {
                    Ok(result) => merge_records(cx, &extractor, &result.output)?,
                    Err(error) if error.kind.is_fatal() => {
                        return Err(EngineError::PhaseFailed {
                            phase: cx.state.current_phase,
                            source: error,
                        });
                    }
                    Err(error) => cx.record_skip(&error),
                }
                cx.state.phase_progress.cursor_mut(Phase::Extraction).mark(&page.url);
                cx.item_done()?;
            }
        }
    }

    tracing::info!(
        job_id = %cx.state.job_id,
        companies = cx.state.buckets.companies.len(),
        events = cx.state.buckets.events.len(),
        participants = cx.state.buckets.participants.len(),
        "extraction finished"
    );
    Ok(())
}

/// The classifier's recommendation, falling back on the page type.
fn extractor_for(page: &PageSnapshot) -> String {
    if let Some(extractor) = &page.recommended_extractor {
        return extractor.clone();
    }
    match page.page_type {
        Some(PageType::EventsList | PageType::EventDetail) => {
            "extraction.event_extractor".to_string()
        }
        Some(PageType::ParticipantsList) => "extraction.event_participant_extractor".to_string(),
        _ => "extraction.html_parser".to_string(),
    }
}

/// Merge extractor output into the bucket its record shape belongs to.
fn merge_records(
    cx: &mut PhaseCx<'_>,
    extractor: &str,
    output: &serde_json::Value,
) -> Result<(), EngineError> {
    let records = output.get("records").and_then(|r| r.as_array()).cloned().unwrap_or_default();
    let epoch = cx.epoch_ms();

    for record in records {
        match extractor {
            "extraction.event_extractor" => {
                match serde_json::from_value::<EventRecord>(record) {
                    Ok(event) => {
                        if cx.state.buckets.events.insert(event) {
                            cx.state.counters.total_events_extracted += 1;
                        }
                    }
                    Err(error) => tracing::warn!(error = %error, "event record dropped"),
                }
            }
            "extraction.event_participant_extractor" => {
                match serde_json::from_value::<Participant>(record) {
                    Ok(participant) => {
                        if cx.state.buckets.participants.insert(participant) {
                            cx.state.counters.total_participants_extracted += 1;
                        }
                    }
                    Err(error) => tracing::warn!(error = %error, "participant record dropped"),
                }
            }
            _ => match serde_json::from_value::<Company>(record) {
                Ok(company) => {
                    if cx.state.buckets.companies.insert(company) {
                        cx.state.counters.total_companies_extracted += 1;
                    }
                }
                Err(error) => tracing::warn!(error = %error, "company record dropped"),
            },
        }
    }

    cx.state.updated_at_ms = epoch;
    Ok(())
}
