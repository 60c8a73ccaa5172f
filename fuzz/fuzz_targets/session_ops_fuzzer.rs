//! Fuzz target for the chat session under arbitrary operation sequences.
//!
//! # Strategy
//!
//! - Any participant slot attempts any action, moderator or not
//! - Time advances in arbitrary steps between actions
//! - Messages are picked from live history or outside it
//!
//! # Invariants
//!
//! - Every standard session invariant holds after every operation
//! - A rejected operation leaves observable state unchanged
//! - Nothing is accepted after the session ends, except time passing

#![no_main]

use arbitrary::Arbitrary;
use creator_chat_core::{RoomKind, RoomStatus};
use creator_chat_harness::{InvariantRegistry, Operation, SimSession};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct SessionScenario {
    seed: u64,
    creator_only: bool,
    ops: Vec<Operation>,
}

fuzz_target!(|scenario: SessionScenario| {
    let kind = if scenario.creator_only { RoomKind::CreatorOnly } else { RoomKind::General };
    let mut sim = SimSession::with_kind(scenario.seed, kind);
    let registry = InvariantRegistry::standard();

    for (step, op) in scenario.ops.iter().take(256).enumerate() {
        let ended = sim.session().status() == RoomStatus::Ended;
        let before = sim.snapshot();

        let result = sim.apply(op);

        if result.is_err() {
            assert_eq!(before, sim.snapshot(), "step {step}: rejected {op:?} changed state");
        }
        if ended && !matches!(op, Operation::AdvanceTime { .. } | Operation::Tick) {
            assert!(result.is_err(), "step {step}: {op:?} accepted after end");
        }

        registry.assert_all(&sim.snapshot(), &format!("after step {step} ({op:?})"));
    }
});
