// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Relationship graph construction: membership, participation, and
//! competitor edges over the resolved entity set.

use crate::intelligence::{INPUT_SCHEMA, OUTPUT_SCHEMA};
use crate::{Agent, AgentContext, AgentError};
use async_trait::async_trait;
use scout_core::AgentTask;
use serde_json::{json, Value};

pub struct GraphBuilder;

#[async_trait]
impl Agent for GraphBuilder {
    fn name(&self) -> &'static str {
        "intelligence.relationship_graph_builder"
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
        _ctx: &AgentContext,
    ) -> Result<serde_json::Value, AgentError> {
        let companies = array(&task.payload, "companies");
        let participants = array(&task.payload, "participants");
        let signals = array(&task.payload, "signals");

        let mut edges = Vec::new();

        // company -> association membership
        for company in &companies {
            let Some(company_id) = company.get("id").and_then(Value::as_str) else {
                continue;
            };
            for association in company
                .get("associations")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
            {
                edges.push(edge(company_id, &format!("assoc:{association}"), "member_of"));
            }
        }

        // participant -> event participation, and on to the company when
        // the participant was resolved
        for participant in &participants {
            let Some(participant_id) = participant.get("id").and_then(Value::as_str) else {
                continue;
            };
            if let Some(event_id) =
                participant.get("event_id").and_then(Value::as_str).filter(|e| !e.is_empty())
            {
                edges.push(edge(participant_id, event_id, "participated_in"));
            }
            if let Some(company_id) = participant.get("company_id").and_then(Value::as_str) {
                edges.push(edge(participant_id, company_id, "represents"));
            }
        }

        // company -> competitor product usage signals
        for signal in &signals {
            let Some(company_id) = signal.get("source_company_id").and_then(Value::as_str) else {
                continue;
            };
            if let Some(competitor) = signal.get("competitor_name").and_then(Value::as_str) {
                edges.push(edge(company_id, &format!("competitor:{competitor}"), "uses"));
            }
        }

        tracing::info!(edges = edges.len(), "relationship graph built");
        Ok(json!({
            "success": true,
            "edges": edges,
            "records_processed": edges.len(),
        }))
    }
}

fn array(payload: &Value, field: &str) -> Vec<Value> {
    payload.get(field).and_then(Value::as_array).cloned().unwrap_or_default()
}

fn edge(from: &str, to: &str, kind: &str) -> Value {
    json!({
        "id": format!("{from}--{kind}--{to}"),
        "from": from,
        "to": to,
        "kind": kind,
    })
}
