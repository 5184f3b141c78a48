// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Contact discovery through the people-search provider.

use crate::enrichment::{records, stamp, CONTACTS_KEY, INPUT_SCHEMA, OUTPUT_SCHEMA};
use crate::{Agent, AgentContext, AgentError};
use async_trait::async_trait;
use scout_core::{AgentTask, Capability};
use serde_json::{json, Value};

const PROVIDER_URL: &str = "https://api.apollo.example/v1/people/search";

pub struct ContactFinder;

#[async_trait]
impl Agent for ContactFinder {
    fn name(&self) -> &'static str {
        "enrichment.contact_finder"
    }

    fn input_schema_id(&self) -> &'static str {
        INPUT_SCHEMA
    }

    fn output_schema_id(&self) -> &'static str {
        OUTPUT_SCHEMA
    }

    fn required_capabilities(&self) -> Vec<Capability> {
        vec![Capability::Enricher, Capability::Secret(CONTACTS_KEY.to_string())]
    }

    async fn execute(
        &self,
        task: &AgentTask,
        ctx: &AgentContext,
    ) -> Result<serde_json::Value, AgentError> {
        let mut records = records(&task.payload)?;

        if !ctx.secrets().present(CONTACTS_KEY) {
            tracing::warn!(key = CONTACTS_KEY, "contacts key absent, passing through");
            for record in &mut records {
                stamp(record, self.name(), ctx);
            }
            return Ok(json!({
                "success": true,
                "provider": "none",
                "records_processed": records.len(),
                "records": records,
            }));
        }

        let http = ctx.http()?;
        let mut found = 0usize;
        for record in &mut records {
            if let Some(domain) = record.get("domain").and_then(Value::as_str) {
                let lookup = format!("{PROVIDER_URL}?domain={domain}");
                tracing::info!(domain, provider = "contacts", "external enrichment call");
                match http.get(&lookup).await {
                    Ok(response) => {
                        if let Ok(data) = serde_json::from_str::<Value>(&response.body) {
                            found += apply_contacts(record, &data);
                        }
                    }
                    Err(error) => {
                        tracing::warn!(domain, error = %error, "contact lookup failed");
                    }
                }
            }
            stamp(record, self.name(), ctx);
        }

        tracing::info!(total = records.len(), contacts = found, "contact discovery done");
        Ok(json!({
            "success": true,
            "provider": "apollo",
            "records_processed": records.len(),
            "records": records,
        }))
    }
}

/// Merge provider contacts, deduplicated by full name.
fn apply_contacts(record: &mut Value, data: &Value) -> usize {
    let Some(people) = data.get("people").and_then(Value::as_array) else {
        return 0;
    };
    let mut contacts: Vec<Value> = record
        .get("contacts")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let mut added = 0;

    for person in people {
        let Some(full_name) = person.get("name").and_then(Value::as_str) else {
            continue;
        };
        let exists = contacts
            .iter()
            .any(|c| c.get("full_name").and_then(Value::as_str) == Some(full_name));
        if exists {
            continue;
        }
        let mut contact = json!({ "full_name": full_name, "confidence": 0.5 });
        for field in ["title", "email", "phone"] {
            if let Some(value) = person.get(field).and_then(Value::as_str) {
                contact[field] = json!(value);
            }
        }
        contacts.push(contact);
        added += 1;
    }

    if !contacts.is_empty() {
        record["contacts"] = json!(contacts);
    }
    added
}
