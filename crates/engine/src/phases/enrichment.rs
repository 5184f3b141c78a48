// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Enrichment: per-company sub-agents in a fixed order, with a
//! per-company sub-step cursor.

use crate::phases::PhaseCx;
use crate::EngineError;
use scout_core::{Company, Phase};
use serde_json::json;

/// Sub-agents in execution order; the cursor records the short name.
pub(crate) const SUB_STEPS: [(&str, &str); 3] = [
    ("firmographic", "enrichment.firmographic"),
    ("tech_stack", "enrichment.tech_stack"),
    ("contact_finder", "enrichment.contact_finder"),
];

pub(crate) async fn run(cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
    let company_ids: Vec<String> =
        cx.state.buckets.companies.ids().map(str::to_string).collect();

    for company_id in company_ids {
        if cx.interrupted() {
            return Ok(());
        }

        for (step, agent_name) in SUB_STEPS {
            let already_done = cx
                .state
                .phase_progress
                .cursor(Phase::Enrichment)
                .is_some_and(|cursor| cursor.is_substep_done(&company_id, step));
            if already_done {
                continue;
            }

            let Some(company) = cx.state.buckets.companies.get(&company_id).cloned() else {
                break;
            };
            let payload = json!({ "records": [company] });

            let result = cx.run_agent(agent_name, payload).await?;
            if let Some(result) = result {
                merge_company(cx, &company_id, &result.output);
            }

            cx.state.phase_progress.cursor_mut(Phase::Enrichment).mark_substep(&company_id, step);
        }

        cx.item_done()?;
    }

    Ok(())
}

/// Replace the company with the enriched version, keeping its identity.
fn merge_company(cx: &mut PhaseCx<'_>, company_id: &str, output: &serde_json::Value) {
    let Some(record) = output.get("records").and_then(|r| r.as_array()).and_then(|r| r.first())
    else {
        return;
    };
    match serde_json::from_value::<Company>(record.clone()) {
        Ok(enriched) if enriched.id == company_id => {
            cx.state.buckets.companies.insert(enriched);
            cx.state.updated_at_ms = cx.epoch_ms();
        }
        Ok(enriched) => {
            tracing::warn!(
                company_id,
                returned = enriched.id,
                "enrichment changed the record id, dropped"
            );
        }
        Err(error) => tracing::warn!(company_id, error = %error, "enriched record dropped"),
    }
}
