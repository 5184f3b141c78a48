// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Duplicate detection and merge over the company set.

use crate::validation::{match_score, records, stamp, INPUT_SCHEMA, OUTPUT_SCHEMA};
use crate::{Agent, AgentContext, AgentError};
use async_trait::async_trait;
use scout_core::AgentTask;
use serde_json::{json, Value};

const DEFAULT_THRESHOLD: f64 = 0.85;

pub struct Dedupe;

#[async_trait]
impl Agent for Dedupe {
    fn name(&self) -> &'static str {
        "validation.dedupe"
    }

    fn input_schema_id(&self) -> &'static str {
        INPUT_SCHEMA
    }

    fn output_schema_id(&self) -> &'static str {
        OUTPUT_SCHEMA
    }

    async fn execute(
        &self,
        task: &AgentTask,
        ctx: &AgentContext,
    ) -> Result<serde_json::Value, AgentError> {
        let records = records(&task.payload)?;
        let threshold = task
            .payload
            .get("threshold")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_THRESHOLD);

        // Group indices of records that pairwise match above threshold.
        let mut group_of: Vec<Option<usize>> = vec![None; records.len()];
        let mut groups: Vec<Vec<usize>> = Vec::new();

        for i in 0..records.len() {
            if group_of[i].is_some() {
                continue;
            }
            let group_index = groups.len();
            group_of[i] = Some(group_index);
            let mut group = vec![i];
            for j in (i + 1)..records.len() {
                if group_of[j].is_some() {
                    continue;
                }
                if match_score(&records[i], &records[j]) >= threshold {
                    group_of[j] = Some(group_index);
                    group.push(j);
                }
            }
            groups.push(group);
        }

        let mut merged_records = Vec::with_capacity(groups.len());
        let mut duplicate_groups = Vec::new();
        for group in &groups {
            if group.len() > 1 {
                duplicate_groups.push(group.clone());
            }
            let mut merged = merge_group(group.iter().map(|i| &records[*i]));
            stamp(&mut merged, self.name(), ctx);
            merged_records.push(merged);
        }

        let duplicates_removed = records.len() - merged_records.len();
        tracing::info!(
            input = records.len(),
            output = merged_records.len(),
            duplicates_removed,
            "deduplication done"
        );
        Ok(json!({
            "success": true,
            "records": merged_records,
            "duplicates_removed": duplicates_removed,
            "duplicate_groups": duplicate_groups,
            "records_processed": records.len(),
        }))
    }
}

/// Merge a duplicate group: first record wins, missing fields fill in
/// from later ones, list fields union.
fn merge_group<'a>(mut group: impl Iterator<Item = &'a Value>) -> Value {
    let Some(first) = group.next() else {
        return Value::Null;
    };
    let mut merged = first.clone();
    for other in group {
        merge_record_into(&mut merged, other);
    }
    merged
}

pub(crate) fn merge_record_into(target: &mut Value, source: &Value) {
    let Some(source_obj) = source.as_object() else {
        return;
    };
    for (key, value) in source_obj {
        match key.as_str() {
            // List fields union
            "associations" | "tech_stack" | "contacts" | "provenance" => {
                let existing = target.get_mut(key).and_then(Value::as_array_mut);
                match existing {
                    Some(items) => {
                        if let Some(incoming) = value.as_array() {
                            for item in incoming {
                                if !items.contains(item) {
                                    items.push(item.clone());
                                }
                            }
                        }
                    }
                    None => target[key] = value.clone(),
                }
            }
            // Identity of the surviving record is the first one's
            "id" => {}
            _ => {
                let missing = target.get(key).map(Value::is_null).unwrap_or(true);
                if missing && !value.is_null() {
                    target[key.as_str()] = value.clone();
                }
            }
        }
    }
}
