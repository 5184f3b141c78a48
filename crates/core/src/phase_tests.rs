// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn forward_order_is_linear() {
    assert_eq!(Phase::Init.successor(), Some(Phase::Gatekeeper));
    assert_eq!(Phase::Gatekeeper.successor(), Some(Phase::Discovery));
    assert_eq!(Phase::Export.successor(), Some(Phase::Monitor));
    assert_eq!(Phase::Monitor.successor(), Some(Phase::Done));
    assert_eq!(Phase::Done.successor(), None);
    assert_eq!(Phase::Failed.successor(), None);
}

#[test]
fn failed_reachable_from_every_non_terminal() {
    for phase in Phase::order() {
        if phase.is_terminal() {
            continue;
        }
        assert!(phase.can_transition(Phase::Failed), "{phase} -> FAILED must be legal");
    }
}

#[test]
fn terminals_have_no_outgoing_transitions() {
    for next in Phase::order() {
        assert!(!Phase::Done.can_transition(*next));
        assert!(!Phase::Failed.can_transition(*next));
    }
    assert!(!Phase::Done.can_transition(Phase::Failed));
}

#[test]
fn no_skipping_and_no_backward_edges() {
    assert!(!Phase::Init.can_transition(Phase::Discovery));
    assert!(!Phase::Extraction.can_transition(Phase::Discovery));
    assert!(!Phase::Discovery.can_transition(Phase::Init));
    assert!(Phase::Init.can_transition(Phase::Gatekeeper));
}

#[test]
fn serde_uses_screaming_snake_wire_format() {
    assert_eq!(serde_json::to_string(&Phase::Gatekeeper).unwrap(), "\"GATEKEEPER\"");
    assert_eq!(serde_json::from_str::<Phase>("\"CLASSIFICATION\"").unwrap(), Phase::Classification);
}

#[test]
fn phase_record_finish_is_idempotent() {
    let mut record = PhaseRecord::entered(Phase::Discovery, 1000);
    assert_eq!(record.outcome, PhaseOutcome::Interrupted);
    record.finish(PhaseOutcome::Completed, 2000);
    record.finish(PhaseOutcome::Failed, 3000);
    assert_eq!(record.exited_at_ms, Some(2000));
    assert_eq!(record.outcome, PhaseOutcome::Completed);
}
