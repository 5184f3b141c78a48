// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation: dedupe -> crossref -> scorer over the whole company set.
//!
//! The working set stays JSON between sub-steps so scratch fields the
//! agents exchange (crossref findings) survive until the scorer has
//! consumed them; only the final records are parsed back into the
//! bucket.

use crate::phases::PhaseCx;
use crate::EngineError;
use scout_core::{Company, Phase};
use scout_storage::Bucket;
use serde_json::json;

/// Sub-steps in execution order.
pub(crate) const SUB_STEPS: [(&str, &str); 3] = [
    ("dedupe", "validation.dedupe"),
    ("crossref", "validation.crossref"),
    ("scorer", "validation.scorer"),
];

pub(crate) async fn run(cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
    if cx.state.buckets.companies.is_empty() {
        return Ok(());
    }

    let mut working: Vec<serde_json::Value> = cx
        .state
        .buckets
        .companies
        .iter()
        .filter_map(|company| serde_json::to_value(company).ok())
        .collect();

    for (step, agent_name) in SUB_STEPS {
        if cx.interrupted() {
            return Ok(());
        }
        let already_done = cx
            .state
            .phase_progress
            .cursor(Phase::Validation)
            .is_some_and(|cursor| cursor.is_done(step));
        if already_done {
            continue;
        }

        let result = cx.run_agent(agent_name, json!({ "records": working.clone() })).await?;
        if let Some(result) = result {
            if let Some(records) = result.output.get("records").and_then(|r| r.as_array()) {
                working = records.clone();
            }
        }

        // The merged set replaces the bucket after every sub-step, so a
        // resume mid-phase continues from real data.
        let mut rebuilt = Bucket::new();
        for record in &working {
            match serde_json::from_value::<Company>(record.clone()) {
                Ok(company) => {
                    rebuilt.insert(company);
                }
                Err(error) => tracing::warn!(step, error = %error, "validated record dropped"),
            }
        }
        cx.state.buckets.companies = rebuilt;
        cx.state.updated_at_ms = cx.epoch_ms();

        cx.state.phase_progress.cursor_mut(Phase::Validation).mark(step);
        cx.item_done()?;
    }

    tracing::info!(
        job_id = %cx.state.job_id,
        companies = cx.state.buckets.companies.len(),
        "validation finished"
    );
    Ok(())
}
