// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared across the pipeline.
//!
//! Every error that crosses an agent or executor boundary is classified
//! into one [`ErrorKind`], which determines its propagation: retry with
//! backoff, skip the unit, or abort the phase. Nothing is recovered by
//! catching and ignoring.

use serde::{Deserialize, Serialize};

/// Classification of a pipeline error, orthogonal to its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Timeout, 429, 5xx, connection reset. Retried with backoff; on
    /// exhaustion the task goes to the dead-letter sink.
    Transient,
    /// Resource missing (404) or expected-absent. Skip, log at WARN.
    NotFound,
    /// 403, robots disallow, policy veto. Skip the unit; never retried.
    Forbidden,
    /// Malformed input from upstream. Skip the unit.
    Parse,
    /// Contract validator failure. Skip in soft mode; fatal in strict mode.
    SchemaViolation,
    /// Circuit breaker open for the host. Skip unit; bookkeeping only.
    CircuitOpen,
    /// Unknown agent, missing mandatory secret. Fatal; abort phase.
    Config,
    /// Invariant violated. Fatal; abort phase, force `Failed`.
    Internal,
}

impl ErrorKind {
    /// Retryable errors go through the backoff loop before the DLQ.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Transient)
    }

    /// Skippable errors drop the unit and continue the phase.
    pub fn is_skippable(self) -> bool {
        matches!(
            self,
            ErrorKind::NotFound
                | ErrorKind::Forbidden
                | ErrorKind::Parse
                | ErrorKind::SchemaViolation
                | ErrorKind::CircuitOpen
        )
    }

    /// Fatal errors abort the enclosing phase.
    pub fn is_fatal(self) -> bool {
        matches!(self, ErrorKind::Config | ErrorKind::Internal)
    }
}

crate::simple_display! {
    ErrorKind {
        Transient => "transient",
        NotFound => "not_found",
        Forbidden => "forbidden",
        Parse => "parse",
        SchemaViolation => "schema_violation",
        CircuitOpen => "circuit_open",
        Config => "config",
        Internal => "internal",
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
