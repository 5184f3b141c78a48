// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema registry: scan, index by `$id`, resolve references.

use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while building or querying the registry.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Schema parse error in {path}: {source}")]
    Json { path: String, source: serde_json::Error },
    #[error("schema {path} has no $id")]
    MissingId { path: String },
    #[error("duplicate schema id {id}")]
    DuplicateId { id: String },
    #[error("schema {schema} references unresolved {reference}")]
    UnresolvedRef { schema: String, reference: String },
    #[error("unknown schema id {0}")]
    UnknownSchema(String),
}

/// Immutable map from schema `$id` to schema document.
///
/// Built once at startup; shared behind `Arc` afterwards.
#[derive(Debug)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Value>>,
}

impl SchemaRegistry {
    /// Build from raw schema documents. Two-phase: index all documents by
    /// `$id`, then verify every `$ref` resolves. Cycles are legal.
    pub fn from_documents(documents: Vec<(String, Value)>) -> Result<Self, SchemaError> {
        let mut schemas: HashMap<String, Arc<Value>> = HashMap::new();

        // Phase 1: index by identifier.
        for (origin, document) in documents {
            let id = document
                .get("$id")
                .and_then(Value::as_str)
                .ok_or_else(|| SchemaError::MissingId { path: origin.clone() })?
                .to_string();
            if schemas.insert(id.clone(), Arc::new(document)).is_some() {
                return Err(SchemaError::DuplicateId { id });
            }
        }

        let registry = Self { schemas };

        // Phase 2: resolve every reference by identifier lookup.
        for (id, document) in &registry.schemas {
            registry.verify_refs(id, document)?;
        }

        tracing::debug!(count = registry.schemas.len(), "schema registry built");
        Ok(registry)
    }

    /// Scan a directory tree for `*.json` schema documents.
    pub fn from_dir(root: &Path) -> Result<Self, SchemaError> {
        let mut documents = Vec::new();
        collect_json_files(root, &mut documents)?;
        Self::from_documents(documents)
    }

    /// The schema set bundled with the crate.
    pub fn builtin() -> Result<Self, SchemaError> {
        let documents = builtin_documents()
            .iter()
            .map(|(name, raw)| {
                serde_json::from_str(raw)
                    .map(|value| (name.to_string(), value))
                    .map_err(|source| SchemaError::Json { path: name.to_string(), source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_documents(documents)
    }

    /// Look up a schema by its `$id`.
    pub fn get(&self, id: &str) -> Option<&Arc<Value>> {
        self.schemas.get(id)
    }

    /// Resolve a `$ref` occurring inside `base_id`'s document.
    ///
    /// Absolute URIs resolve directly; relative references (`./x.json`,
    /// `../core/x.json`) resolve against the base identifier.
    pub fn resolve_ref(&self, base_id: &str, reference: &str) -> Option<&Arc<Value>> {
        if let Some(schema) = self.schemas.get(reference) {
            return Some(schema);
        }
        let absolute = join_reference(base_id, reference)?;
        self.schemas.get(&absolute)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    fn verify_refs(&self, id: &str, value: &Value) -> Result<(), SchemaError> {
        match value {
            Value::Object(map) => {
                if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                    if self.resolve_ref(id, reference).is_none() {
                        return Err(SchemaError::UnresolvedRef {
                            schema: id.to_string(),
                            reference: reference.to_string(),
                        });
                    }
                }
                for nested in map.values() {
                    self.verify_refs(id, nested)?;
                }
            }
            Value::Array(items) => {
                for nested in items {
                    self.verify_refs(id, nested)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Join a relative reference against a base `$id` URI.
fn join_reference(base_id: &str, reference: &str) -> Option<String> {
    let (prefix, path) = base_id.rsplit_once('/')?;
    let mut segments: Vec<&str> = prefix.split('/').collect();
    let _ = path;

    let mut remainder = reference;
    loop {
        if let Some(rest) = remainder.strip_prefix("./") {
            remainder = rest;
        } else if let Some(rest) = remainder.strip_prefix("../") {
            // Never pop into the scheme part of the URI.
            if segments.len() > 3 {
                segments.pop();
            }
            remainder = rest;
        } else {
            break;
        }
    }
    Some(format!("{}/{}", segments.join("/"), remainder))
}

fn collect_json_files(
    dir: &Path,
    documents: &mut Vec<(String, Value)>,
) -> Result<(), SchemaError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_json_files(&path, documents)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            let raw = std::fs::read_to_string(&path)?;
            let value = serde_json::from_str(&raw).map_err(|source| SchemaError::Json {
                path: path.display().to_string(),
                source,
            })?;
            documents.push((path.display().to_string(), value));
        }
    }
    Ok(())
}

/// The contract set shipped with the pipeline, embedded at compile time.
fn builtin_documents() -> &'static [(&'static str, &'static str)] {
    &[
        ("core/provenance", include_str!("../schemas/core/provenance.json")),
        ("core/contact", include_str!("../schemas/core/contact.json")),
        ("core/company", include_str!("../schemas/core/company.json")),
        ("core/page_snapshot", include_str!("../schemas/core/page_snapshot.json")),
        ("core/delta", include_str!("../schemas/core/delta.json")),
        ("discovery/input", include_str!("../schemas/discovery/input.json")),
        ("discovery/output", include_str!("../schemas/discovery/output.json")),
        ("extraction/input", include_str!("../schemas/extraction/input.json")),
        ("extraction/output", include_str!("../schemas/extraction/output.json")),
        ("enrichment/input", include_str!("../schemas/enrichment/input.json")),
        ("enrichment/output", include_str!("../schemas/enrichment/output.json")),
        ("validation/input", include_str!("../schemas/validation/input.json")),
        ("validation/output", include_str!("../schemas/validation/output.json")),
        ("intelligence/input", include_str!("../schemas/intelligence/input.json")),
        ("intelligence/output", include_str!("../schemas/intelligence/output.json")),
        ("export/input", include_str!("../schemas/export/input.json")),
        ("export/output", include_str!("../schemas/export/output.json")),
        ("monitoring/input", include_str!("../schemas/monitoring/input.json")),
        ("monitoring/output", include_str!("../schemas/monitoring/output.json")),
    ]
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
