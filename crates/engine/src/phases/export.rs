// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Export: emit the curated artifacts, one cursor entry per kind.

use crate::phases::PhaseCx;
use crate::EngineError;
use scout_core::{ExportArtifact, Phase, Provenance};
use serde_json::json;

const EXPORT_AGENT: &str = "export.export_activation";

pub(crate) async fn run(cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
    let output_dir = cx
        .data_root
        .join("validated")
        .join(cx.clock.utc_now().format("%Y%m%d_%H%M%S").to_string());

    for kind in ["companies", "events", "summary"] {
        if cx.interrupted() {
            return Ok(());
        }
        let already_done = cx
            .state
            .phase_progress
            .cursor(Phase::Export)
            .is_some_and(|cursor| cursor.is_done(kind));
        if already_done {
            continue;
        }

        let records: Vec<serde_json::Value> = match kind {
            "events" => cx
                .state
                .buckets
                .events
                .iter()
                .filter_map(|event| serde_json::to_value(event).ok())
                .collect(),
            // Companies and the summary both prefer the resolved set.
            _ => {
                if cx.state.buckets.canonical_entities.is_empty() {
                    cx.state
                        .buckets
                        .companies
                        .iter()
                        .filter_map(|company| serde_json::to_value(company).ok())
                        .collect()
                } else {
                    cx.state
                        .buckets
                        .canonical_entities
                        .iter()
                        .filter_map(|entity| serde_json::to_value(&entity.company).ok())
                        .collect()
                }
            }
        };

        if records.is_empty() && kind != "summary" {
            cx.state.phase_progress.cursor_mut(Phase::Export).mark(kind);
            continue;
        }

        let mut payload = json!({
            "export_type": kind,
            "format": "jsonl",
            "records": records,
            "output_dir": output_dir.display().to_string(),
        });
        if kind == "companies" {
            payload["min_quality"] = json!(cx.config.min_quality);
        }

        let result = cx.run_agent(EXPORT_AGENT, payload).await?;
        if let Some(result) = result {
            if let Some(path) = result.output.get("export_path").and_then(|p| p.as_str()) {
                let artifact = ExportArtifact {
                    kind: kind.to_string(),
                    path: path.to_string(),
                    record_count: result
                        .output
                        .get("records_exported")
                        .and_then(|n| n.as_u64())
                        .unwrap_or(0) as usize,
                    created_at: cx.clock.utc_now(),
                    provenance: vec![Provenance::new(path, EXPORT_AGENT, cx.clock.utc_now())],
                };
                cx.state.buckets.exports.insert(artifact);
            }
        }

        cx.state.phase_progress.cursor_mut(Phase::Export).mark(kind);
        cx.item_done()?;
    }

    Ok(())
}
