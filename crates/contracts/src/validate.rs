// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Payload validation against registered schemas.
//!
//! Covers the keyword subset the shipped contracts use: `type`,
//! `required`, `properties`, `items`, `enum`, `minLength`, `minimum`,
//! `maximum`, `minItems`, and `$ref`. Diagnostics are path-tagged so a
//! failing record inside an array is addressable
//! (`records[3].provenance: expected array, got string`).

use crate::{SchemaError, SchemaRegistry};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Enforcement mode for a gate point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Validation failure is logged; execution continues.
    #[default]
    Soft,
    /// Validation failure raises to the executor as a terminal agent error.
    Strict,
}

/// One path-tagged diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// A strict-mode validation failure.
#[derive(Debug, Error)]
#[error("schema {schema_id} rejected payload: {}", summarize(.errors))]
pub struct ValidationFailure {
    pub schema_id: String,
    pub errors: Vec<PathError>,
}

fn summarize(errors: &[PathError]) -> String {
    let mut parts: Vec<String> = errors.iter().take(3).map(|e| e.to_string()).collect();
    if errors.len() > 3 {
        parts.push(format!("... and {} more", errors.len() - 3));
    }
    parts.join("; ")
}

/// Validates payloads against the schema registry.
pub struct Validator {
    registry: Arc<SchemaRegistry>,
    mode: Mode,
}

impl Validator {
    pub fn new(registry: Arc<SchemaRegistry>, mode: Mode) -> Self {
        Self { registry, mode }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Collect all diagnostics for a payload against a named schema.
    pub fn check(&self, schema_id: &str, payload: &Value) -> Result<Vec<PathError>, SchemaError> {
        let schema = self
            .registry
            .get(schema_id)
            .ok_or_else(|| SchemaError::UnknownSchema(schema_id.to_string()))?;
        let mut errors = Vec::new();
        self.walk(schema_id, schema, payload, "", &mut errors);
        Ok(errors)
    }

    /// Gate a payload. Soft mode logs and passes; strict mode fails.
    pub fn enforce(
        &self,
        schema_id: &str,
        payload: &Value,
    ) -> Result<Result<(), ValidationFailure>, SchemaError> {
        let errors = self.check(schema_id, payload)?;
        if errors.is_empty() {
            return Ok(Ok(()));
        }
        match self.mode {
            Mode::Soft => {
                tracing::warn!(
                    schema = schema_id,
                    errors = %summarize(&errors),
                    "contract validation failed (soft mode)"
                );
                Ok(Ok(()))
            }
            Mode::Strict => {
                Ok(Err(ValidationFailure { schema_id: schema_id.to_string(), errors }))
            }
        }
    }

    fn walk(
        &self,
        base_id: &str,
        schema: &Value,
        payload: &Value,
        path: &str,
        errors: &mut Vec<PathError>,
    ) {
        let Some(schema_obj) = schema.as_object() else {
            return;
        };

        // $ref replaces the local schema entirely (registry guarantees
        // resolution at build time; a miss here is an internal error).
        if let Some(reference) = schema_obj.get("$ref").and_then(Value::as_str) {
            match self.registry.resolve_ref(base_id, reference) {
                Some(target) => {
                    let target = target.clone();
                    let target_id = target
                        .get("$id")
                        .and_then(Value::as_str)
                        .unwrap_or(base_id)
                        .to_string();
                    self.walk(&target_id, &target, payload, path, errors);
                }
                None => errors.push(PathError {
                    path: path.to_string(),
                    message: format!("unresolvable $ref {reference}"),
                }),
            }
            return;
        }

        if let Some(expected) = schema_obj.get("type").and_then(Value::as_str) {
            if !type_matches(expected, payload) {
                errors.push(PathError {
                    path: path.to_string(),
                    message: format!("expected {expected}, got {}", type_name(payload)),
                });
                return;
            }
        }

        if let Some(allowed) = schema_obj.get("enum").and_then(Value::as_array) {
            if !allowed.contains(payload) {
                errors.push(PathError {
                    path: path.to_string(),
                    message: format!("value not in enum: {payload}"),
                });
            }
        }

        match payload {
            Value::Object(fields) => {
                if let Some(required) = schema_obj.get("required").and_then(Value::as_array) {
                    for name in required.iter().filter_map(Value::as_str) {
                        if !fields.contains_key(name) {
                            errors.push(PathError {
                                path: path.to_string(),
                                message: format!("missing required field {name}"),
                            });
                        }
                    }
                }
                if let Some(properties) = schema_obj.get("properties").and_then(Value::as_object) {
                    for (name, sub_schema) in properties {
                        if let Some(sub_payload) = fields.get(name) {
                            let sub_path = join_path(path, name);
                            self.walk(base_id, sub_schema, sub_payload, &sub_path, errors);
                        }
                    }
                }
            }
            Value::Array(items) => {
                if let Some(min) = schema_obj.get("minItems").and_then(Value::as_u64) {
                    if (items.len() as u64) < min {
                        errors.push(PathError {
                            path: path.to_string(),
                            message: format!("expected at least {min} items, got {}", items.len()),
                        });
                    }
                }
                if let Some(item_schema) = schema_obj.get("items") {
                    for (i, item) in items.iter().enumerate() {
                        let sub_path = format!("{path}[{i}]");
                        self.walk(base_id, item_schema, item, &sub_path, errors);
                    }
                }
            }
            Value::String(s) => {
                if let Some(min) = schema_obj.get("minLength").and_then(Value::as_u64) {
                    if (s.len() as u64) < min {
                        errors.push(PathError {
                            path: path.to_string(),
                            message: format!("string shorter than minLength {min}"),
                        });
                    }
                }
            }
            Value::Number(n) => {
                if let Some(min) = schema_obj.get("minimum").and_then(Value::as_f64) {
                    if n.as_f64().is_some_and(|v| v < min) {
                        errors.push(PathError {
                            path: path.to_string(),
                            message: format!("value below minimum {min}"),
                        });
                    }
                }
                if let Some(max) = schema_obj.get("maximum").and_then(Value::as_f64) {
                    if n.as_f64().is_some_and(|v| v > max) {
                        errors.push(PathError {
                            path: path.to_string(),
                            message: format!("value above maximum {max}"),
                        });
                    }
                }
            }
            _ => {}
        }
    }
}

fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Object(_) => "object",
        Value::Array(_) => "array",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
