// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Graph: mine competitor signals per company, then build edges.

use crate::phases::PhaseCx;
use crate::EngineError;
use scout_core::{GraphEdge, Phase, Signal};
use scout_storage::Cursor;
use serde_json::json;

pub(crate) async fn run(cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
    mine_signals(cx).await?;
    if cx.interrupted() {
        return Ok(());
    }
    build_edges(cx).await
}

/// Signal mining per company website, bounded and cursor-tracked.
async fn mine_signals(cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
    let sources: Vec<(String, String)> = cx
        .state
        .buckets
        .companies
        .iter()
        .filter_map(|company| {
            company.website.clone().map(|website| (company.id.clone(), website))
        })
        .take(cx.config.max_signal_sources)
        .collect();

    for (company_id, website) in sources {
        if cx.interrupted() {
            return Ok(());
        }
        let mined = cx
            .state
            .phase_progress
            .cursor(Phase::Graph)
            .is_some_and(|cursor| cursor.is_done(&company_id));
        if mined {
            continue;
        }

        let result = cx
            .run_agent(
                "intelligence.competitor_signal_miner",
                json!({ "url": website, "source_company_id": company_id }),
            )
            .await?;

        if let Some(result) = result {
            let signals =
                result.output.get("signals").and_then(|s| s.as_array()).cloned().unwrap_or_default();
            for signal in signals {
                match serde_json::from_value::<Signal>(signal) {
                    Ok(signal) => {
                        if cx.state.buckets.competitor_signals.insert(signal) {
                            cx.state.counters.total_signals_detected += 1;
                        }
                    }
                    Err(error) => tracing::warn!(error = %error, "signal dropped"),
                }
            }
        }

        cx.state.phase_progress.cursor_mut(Phase::Graph).mark(&company_id);
        cx.item_done()?;
    }
    Ok(())
}

/// One graph-builder pass over the resolved data.
async fn build_edges(cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
    let built = matches!(
        cx.state.phase_progress.cursor(Phase::Graph),
        Some(Cursor::Graph { graph_built: true, .. })
    );
    if built {
        return Ok(());
    }

    let companies: Vec<serde_json::Value> = if cx.state.buckets.canonical_entities.is_empty() {
        cx.state.buckets.companies.iter().filter_map(|c| serde_json::to_value(c).ok()).collect()
    } else {
        cx.state
            .buckets
            .canonical_entities
            .iter()
            .filter_map(|entity| {
                let mut company = serde_json::to_value(&entity.company).ok()?;
                company["id"] = json!(entity.id);
                Some(company)
            })
            .collect()
    };
    let participants: Vec<serde_json::Value> =
        cx.state.buckets.participants.iter().filter_map(|p| serde_json::to_value(p).ok()).collect();
    let signals: Vec<serde_json::Value> = cx
        .state
        .buckets
        .competitor_signals
        .iter()
        .filter_map(|s| serde_json::to_value(s).ok())
        .collect();

    let result = cx
        .run_agent(
            "intelligence.relationship_graph_builder",
            json!({
                "companies": companies,
                "participants": participants,
                "signals": signals,
                "associations": cx.state.associations,
            }),
        )
        .await?;

    if let Some(result) = result {
        let edges = result.output.get("edges").and_then(|e| e.as_array()).cloned().unwrap_or_default();
        for edge in edges {
            match serde_json::from_value::<GraphEdge>(edge) {
                Ok(edge) => {
                    cx.state.buckets.graph_edges.insert(edge);
                }
                Err(error) => tracing::warn!(error = %error, "graph edge dropped"),
            }
        }
    }

    if let Cursor::Graph { graph_built, .. } = cx.state.phase_progress.cursor_mut(Phase::Graph) {
        *graph_built = true;
    }
    cx.item_done()?;

    tracing::info!(
        job_id = %cx.state.job_id,
        edges = cx.state.buckets.graph_edges.len(),
        signals = cx.state.buckets.competitor_signals.len(),
        "graph finished"
    );
    Ok(())
}
