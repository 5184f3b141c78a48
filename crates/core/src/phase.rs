// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline phase enum and transition rules.
//!
//! The pipeline advances through a fixed linear order of phases; `Failed`
//! is reachable from any non-terminal phase and, like `Done`, has no
//! outgoing transitions. There are no backward edges and no skipping; a
//! phase with nothing to do completes trivially.

use serde::{Deserialize, Serialize};

/// One stage of the acquisition pipeline.
///
/// Ordering follows declaration order, which is the forward order of the
/// pipeline; `Failed` sorts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Init,
    Gatekeeper,
    Discovery,
    Classification,
    Extraction,
    Enrichment,
    Validation,
    Resolution,
    Graph,
    Export,
    Monitor,
    Done,
    Failed,
}

/// Forward order of the non-terminal phases plus `Done`.
const ORDER: [Phase; 12] = [
    Phase::Init,
    Phase::Gatekeeper,
    Phase::Discovery,
    Phase::Classification,
    Phase::Extraction,
    Phase::Enrichment,
    Phase::Validation,
    Phase::Resolution,
    Phase::Graph,
    Phase::Export,
    Phase::Monitor,
    Phase::Done,
];

impl Phase {
    /// All phases in forward order, `Failed` excluded.
    pub fn order() -> &'static [Phase] {
        &ORDER
    }

    /// The next forward phase, or `None` for terminals.
    pub fn successor(self) -> Option<Phase> {
        let idx = ORDER.iter().position(|p| *p == self)?;
        ORDER.get(idx + 1).copied()
    }

    /// Terminal phases accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }

    /// Whether `self -> next` is a legal transition.
    ///
    /// Legal edges: each phase to its forward successor, and every
    /// non-terminal phase to `Failed`.
    pub fn can_transition(self, next: Phase) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == Phase::Failed {
            return true;
        }
        self.successor() == Some(next)
    }
}

crate::simple_display! {
    Phase {
        Init => "INIT",
        Gatekeeper => "GATEKEEPER",
        Discovery => "DISCOVERY",
        Classification => "CLASSIFICATION",
        Extraction => "EXTRACTION",
        Enrichment => "ENRICHMENT",
        Validation => "VALIDATION",
        Resolution => "RESOLUTION",
        Graph => "GRAPH",
        Export => "EXPORT",
        Monitor => "MONITOR",
        Done => "DONE",
        Failed => "FAILED",
    }
}

/// How a phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseOutcome {
    Completed,
    Failed,
    /// Process was interrupted mid-phase; the phase re-runs on resume.
    Interrupted,
}

crate::simple_display! {
    PhaseOutcome {
        Completed => "completed",
        Failed => "failed",
        Interrupted => "interrupted",
    }
}

/// One entry of the phase history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub phase: Phase,
    pub entered_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exited_at_ms: Option<u64>,
    pub outcome: PhaseOutcome,
}

impl PhaseRecord {
    pub fn entered(phase: Phase, epoch_ms: u64) -> Self {
        Self { phase, entered_at_ms: epoch_ms, exited_at_ms: None, outcome: PhaseOutcome::Interrupted }
    }

    /// Close the record with the given outcome, if not already closed.
    pub fn finish(&mut self, outcome: PhaseOutcome, epoch_ms: u64) {
        if self.exited_at_ms.is_none() {
            self.exited_at_ms = Some(epoch_ms);
            self.outcome = outcome;
        }
    }
}

#[cfg(test)]
#[path = "phase_tests.rs"]
mod tests;
