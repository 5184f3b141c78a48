// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monitor: baseline the discovered directory pages for drift checks.

use crate::phases::PhaseCx;
use crate::EngineError;
use serde_json::json;

pub(crate) async fn run(cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
    let directory_urls: Vec<String> = cx
        .state
        .buckets
        .visited_urls
        .iter()
        .map(|visited| visited.url.clone())
        .filter(|url| url.contains("/member") || url.contains("/directory"))
        .take(cx.config.max_baseline_urls)
        .collect();

    if directory_urls.is_empty() {
        return Ok(());
    }

    let result = cx
        .run_agent(
            "monitoring.source_monitor",
            json!({ "action": "baseline", "urls": directory_urls }),
        )
        .await?;

    if let Some(result) = result {
        tracing::info!(
            job_id = %cx.state.job_id,
            baselines = result.output.get("baselines_created").and_then(|n| n.as_u64()).unwrap_or(0),
            "monitoring baselines created"
        );
    }
    cx.item_done()?;
    Ok(())
}
