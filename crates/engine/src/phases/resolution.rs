// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolution: canonical entities plus participant -> company links.

use crate::phases::PhaseCx;
use crate::EngineError;
use scout_core::{CanonicalEntity, Phase};
use scout_storage::Cursor;
use serde_json::json;

pub(crate) async fn run(cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
    let already_done = cx
        .state
        .phase_progress
        .cursor(Phase::Resolution)
        .is_some_and(|cursor| matches!(cursor, Cursor::Flag { done: true }));
    if already_done || cx.state.buckets.companies.is_empty() {
        return Ok(());
    }

    let records: Vec<serde_json::Value> = cx
        .state
        .buckets
        .companies
        .iter()
        .filter_map(|company| serde_json::to_value(company).ok())
        .collect();

    let result = cx
        .run_agent(
            "validation.entity_resolver",
            json!({ "records": records, "merge_strategy": "keep_best" }),
        )
        .await?;

    if let Some(result) = result {
        let entities =
            result.output.get("canonical_entities").and_then(|e| e.as_array()).cloned().unwrap_or_default();
        for entity in entities {
            match serde_json::from_value::<CanonicalEntity>(entity) {
                Ok(entity) => {
                    if cx.state.buckets.canonical_entities.insert(entity) {
                        cx.state.counters.total_entities_resolved += 1;
                    }
                }
                Err(error) => tracing::warn!(error = %error, "canonical entity dropped"),
            }
        }
        link_participants(cx);
    }

    *cx.state.phase_progress.cursor_mut(Phase::Resolution) = Cursor::Flag { done: true };
    cx.item_done()?;
    Ok(())
}

/// Rewrite participant records to point at their canonical company,
/// matched by normalized name.
fn link_participants(cx: &mut PhaseCx<'_>) {
    let entity_by_name: std::collections::HashMap<String, String> = cx
        .state
        .buckets
        .canonical_entities
        .iter()
        .map(|entity| {
            (
                scout_core::normalize_company_name(&entity.company.company_name),
                entity.id.clone(),
            )
        })
        .collect();

    let mut linked = 0usize;
    let updates: Vec<_> = cx
        .state
        .buckets
        .participants
        .iter()
        .filter(|participant| participant.company_id.is_none())
        .cloned()
        .collect();

    for mut participant in updates {
        let resolved = entity_by_name
            .get(&scout_core::normalize_company_name(&participant.company_name))
            .cloned();
        if let Some(entity_id) = resolved {
            participant.company_id = Some(entity_id);
            cx.state.buckets.participants.insert(participant);
            linked += 1;
        }
    }

    tracing::info!(
        entities = cx.state.buckets.canonical_entities.len(),
        linked_participants = linked,
        "resolution finished"
    );
}
