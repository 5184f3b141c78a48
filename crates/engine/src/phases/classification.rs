// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Classification: label every unlabeled page and pick its extractor.

use crate::phases::PhaseCx;
use crate::EngineError;
use scout_core::{PageType, Phase};
use serde_json::json;

pub(crate) async fn run(cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
    let pending: Vec<String> = cx
        .state
        .buckets
        .pages
        .iter()
        .filter(|page| page.page_type.is_none() && !page.auth_required)
        .map(|page| page.url.clone())
        .collect();

    for url in pending {
        if cx.interrupted() {
            return Ok(());
        }
        let already_done = cx
            .state
            .phase_progress
            .cursor(Phase::Classification)
            .is_some_and(|cursor| cursor.is_done(&url));
        if already_done {
            continue;
        }

        let content = cx
            .state
            .buckets
            .pages
            .get(&url)
            .map(|page| read_content(cx, &page.content_location))
            .unwrap_or_default();

        let result = cx
            .run_agent("discovery.page_classifier", json!({ "url": url, "content": content }))
            .await?;

        if let Some(result) = result {
            if let Some(mut page) = cx.state.buckets.pages.get(&url).cloned() {
                page.page_type = result.output["page_type"]
                    .as_str()
                    .and_then(|raw| serde_json::from_value(json!(raw)).ok());
                page.recommended_extractor =
                    result.output["recommended_extractor"].as_str().map(str::to_string);
                if page.page_type.is_none() {
                    page.page_type = Some(PageType::Other);
                }
                cx.state.buckets.pages.insert(page);
            }
        }

        cx.state.phase_progress.cursor_mut(Phase::Classification).mark(&url);
        cx.item_done()?;
    }

    Ok(())
}

/// Page content from the raw store; empty when never persisted.
pub(crate) fn read_content(cx: &PhaseCx<'_>, location: &str) -> String {
    if location.is_empty() {
        return String::new();
    }
    std::fs::read_to_string(location).unwrap_or_default()
}
