// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entity resolution: collapse the validated company set into canonical
//! entities with merge lineage.

use crate::validation::dedupe::merge_record_into;
use crate::validation::{match_score, records, stamp, INPUT_SCHEMA, OUTPUT_SCHEMA};
use crate::{Agent, AgentContext, AgentError};
use async_trait::async_trait;
use scout_core::AgentTask;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Resolution is stricter than dedupe: only confident matches merge.
const RESOLUTION_THRESHOLD: f64 = 0.92;

pub struct EntityResolver;

#[async_trait]
impl Agent for EntityResolver {
    fn name(&self) -> &'static str {
        "validation.entity_resolver"
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

        // Blocking: only records sharing a block key are compared, which
        // keeps resolution near-linear on real directory sizes.
        let mut blocks: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            blocks.entry(block_key(record)).or_default().push(i);
        }

        let mut merged_into: Vec<Option<usize>> = vec![None; records.len()];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut block_indices: Vec<_> = blocks.into_values().collect();
        block_indices.sort();

        for indices in &block_indices {
            for (a, &i) in indices.iter().enumerate() {
                if merged_into[i].is_some() {
                    continue;
                }
                let group_index = groups.len();
                merged_into[i] = Some(group_index);
                let mut group = vec![i];
                for &j in &indices[a + 1..] {
                    if merged_into[j].is_some() {
                        continue;
                    }
                    if match_score(&records[i], &records[j]) >= RESOLUTION_THRESHOLD {
                        merged_into[j] = Some(group_index);
                        group.push(j);
                    }
                }
                groups.push(group);
            }
        }

        let mut canonical_entities = Vec::with_capacity(groups.len());
        for group in &groups {
            let merged_from: Vec<String> = group
                .iter()
                .filter_map(|i| records[*i].get("id").and_then(Value::as_str))
                .map(str::to_string)
                .collect();

            let mut company = records[group[0]].clone();
            for &i in &group[1..] {
                merge_record_into(&mut company, &records[i]);
            }
            stamp(&mut company, self.name(), ctx);

            let canonical_id = format!(
                "canon-{}",
                &scout_core::content_hash(&merged_from.join("+"))[..16]
            );
            let completeness = field_completeness(&company);
            canonical_entities.push(json!({
                "id": canonical_id,
                "company": company,
                "merged_from": merged_from,
                "completeness": completeness,
            }));
        }

        tracing::info!(
            input = records.len(),
            entities = canonical_entities.len(),
            "entity resolution done"
        );

        let mut output_records = records;
        for record in &mut output_records {
            stamp(record, self.name(), ctx);
        }
        Ok(json!({
            "success": true,
            "records_processed": output_records.len(),
            "records": output_records,
            "canonical_entities": canonical_entities,
        }))
    }
}

/// Block key: domain when known, else first token of the normalized name.
fn block_key(record: &Value) -> String {
    if let Some(domain) = record.get("domain").and_then(Value::as_str).filter(|d| !d.is_empty()) {
        return format!("d:{domain}");
    }
    let name = record.get("company_name").and_then(Value::as_str).unwrap_or("");
    let normalized = scout_core::normalize_company_name(name);
    format!("n:{}", normalized.split(' ').next().unwrap_or(""))
}

/// Share of populated fields, 0-100.
fn field_completeness(record: &Value) -> u8 {
    const FIELDS: [&str; 8] = [
        "company_name",
        "website",
        "domain",
        "city",
        "state",
        "employee_count_min",
        "erp_system",
        "contacts",
    ];
    let filled = FIELDS
        .iter()
        .filter(|field| {
            record.get(**field).is_some_and(|v| match v {
                Value::Null => false,
                Value::String(s) => !s.is_empty(),
                Value::Array(items) => !items.is_empty(),
                _ => true,
            })
        })
        .count();
    ((filled * 100) / FIELDS.len()) as u8
}
