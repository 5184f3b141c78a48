// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Phase-progress cursors: the resume state of the phase in flight.
//!
//! A cursor records "what has already been done" for one phase; on
//! resume the phase handler filters its work set against it. The cursor
//! is cleared on successful phase exit, so `phase_progress` holds at
//! most the current phase's cursor.

use scout_core::Phase;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Per-phase resume state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cursor {
    /// Set of completed item keys: domains (Gatekeeper), URLs
    /// (Discovery), page ids (Classification, Extraction), sub-steps
    /// (Validation), export kinds (Export).
    Done { done: BTreeSet<String> },
    /// Per-company completed enrichment sub-steps.
    PerKey { done: BTreeMap<String, BTreeSet<String>> },
    /// Single completion flag (Resolution).
    Flag { done: bool },
    /// Graph phase: companies mined plus the build flag.
    Graph { mined: BTreeSet<String>, graph_built: bool },
}

impl Cursor {
    pub fn done_set() -> Self {
        Cursor::Done { done: BTreeSet::new() }
    }

    pub fn per_key() -> Self {
        Cursor::PerKey { done: BTreeMap::new() }
    }

    pub fn flag() -> Self {
        Cursor::Flag { done: false }
    }

    pub fn graph() -> Self {
        Cursor::Graph { mined: BTreeSet::new(), graph_built: false }
    }

    /// Whether a plain item key is recorded as done.
    pub fn is_done(&self, key: &str) -> bool {
        match self {
            Cursor::Done { done } => done.contains(key),
            Cursor::PerKey { done } => done.contains_key(key),
            Cursor::Flag { done } => *done,
            Cursor::Graph { mined, .. } => mined.contains(key),
        }
    }

    /// Record a plain item key as done.
    pub fn mark(&mut self, key: &str) {
        match self {
            Cursor::Done { done } => {
                done.insert(key.to_string());
            }
            Cursor::Graph { mined, .. } => {
                mined.insert(key.to_string());
            }
            Cursor::PerKey { .. } | Cursor::Flag { .. } => {
                debug_assert!(false, "mark() on a keyed or flag cursor");
            }
        }
    }

    /// Whether a sub-step is recorded as done for a key.
    pub fn is_substep_done(&self, key: &str, substep: &str) -> bool {
        match self {
            Cursor::PerKey { done } => done.get(key).is_some_and(|steps| steps.contains(substep)),
            _ => false,
        }
    }

    /// Record a sub-step as done for a key.
    pub fn mark_substep(&mut self, key: &str, substep: &str) {
        if let Cursor::PerKey { done } = self {
            done.entry(key.to_string()).or_default().insert(substep.to_string());
        } else {
            debug_assert!(false, "mark_substep() on a non-keyed cursor");
        }
    }

    /// Number of completed item keys.
    pub fn completed(&self) -> usize {
        match self {
            Cursor::Done { done } => done.len(),
            Cursor::PerKey { done } => done.len(),
            Cursor::Flag { done } => usize::from(*done),
            Cursor::Graph { mined, graph_built } => mined.len() + usize::from(*graph_built),
        }
    }
}

/// Map from phase to its in-flight cursor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseProgress {
    cursors: BTreeMap<Phase, Cursor>,
}

impl PhaseProgress {
    /// Cursor for a phase, created with the phase-appropriate shape on
    /// first access.
    pub fn cursor_mut(&mut self, phase: Phase) -> &mut Cursor {
        self.cursors.entry(phase).or_insert_with(|| match phase {
            Phase::Enrichment => Cursor::per_key(),
            Phase::Resolution => Cursor::flag(),
            Phase::Graph => Cursor::graph(),
            _ => Cursor::done_set(),
        })
    }

    pub fn cursor(&self, phase: Phase) -> Option<&Cursor> {
        self.cursors.get(&phase)
    }

    /// Clear a phase's cursor on successful exit.
    pub fn clear(&mut self, phase: Phase) {
        self.cursors.remove(&phase);
    }

    /// Phases that currently hold a cursor.
    pub fn phases(&self) -> impl Iterator<Item = Phase> + '_ {
        self.cursors.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }
}

#[cfg(test)]
#[path = "cursor_tests.rs"]
mod tests;
