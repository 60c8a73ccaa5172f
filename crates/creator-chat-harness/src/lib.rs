//! Deterministic simulation harness for creator chat testing.
//!
//! A virtual-clock [`Environment`](creator_chat_core::env::Environment) and a
//! session driver so countdowns, slow mode, and moderation flows can be
//! replayed second by second and from any RNG seed.
//!
//! # Model-Based Testing
//!
//! [`Operation`] enumerates every action on a room. Proptest and libfuzzer
//! generate sequences of them, [`SimSession`] applies each one, and the
//! invariant registry checks the resulting state.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the common
//! session invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod operation;
pub mod sim_env;
pub mod sim_session;

pub use invariants::{
    EndedIsTerminal, FilteredKeepsOriginal, Invariant, InvariantRegistry, InvariantResult,
    MessageSnapshot, PauseMatchesStatus, ReactionCountsCoverLedger, SessionSnapshot,
    StatsCoverHistory, UniqueMessageIds, Violation,
};
pub use operation::{MessagePick, Operation, Slot, SmallContent};
pub use sim_env::{SIM_EPOCH_SECS, SimEnv, SimInstant};
pub use sim_session::{CREATOR_ID, EMOJI, MODERATOR_ID, PARTICIPANT_SLOTS, SimSession};
