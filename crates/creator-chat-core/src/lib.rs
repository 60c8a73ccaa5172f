//! Creator chat core
//!
//! Sans-IO state machines for a single creator chat room: message history,
//! emoji reactions, timed restrictions, and the session controller that ties
//! them together. Nothing in this crate performs I/O or owns a timer; time
//! and randomness come from an [`env::Environment`] so the same code runs in
//! production and in deterministic simulation.
//!
//! # Components
//!
//! - [`MessageStore`]: ordered history with in-place redaction
//! - [`ReactionLedger`]: emoji tallies, one active reaction per viewer
//! - [`RestrictionState`]: pause, slow mode, per-viewer cooldowns and blocks
//! - [`ChatSession`]: the single entry point a UI or transport calls
//! - [`RoomDirectory`]: a channel's general and creator-only rooms

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod env;
mod directory;
mod error;
mod message;
mod reaction;
mod restriction;
mod session;
mod store;

pub use directory::{
    ChannelOverview, DirectoryEvent, DirectoryStats, ExistingRooms, MAX_ANNOUNCEMENT_CHARS,
    MAX_TITLE_CHARS, RoomDirectory, RoomSummary,
};
pub use error::{DenyReason, InputError, RoomError, SessionError, Target};
pub use message::{
    AuthorRole, MembershipTier, Message, MessageDraft, MessageId, MessageView, Participant, Role,
    SYSTEM_USER_ID, UserId,
};
pub use reaction::{ReactionChange, ReactionLedger};
pub use restriction::{
    MAX_RESTRICTION, MAX_SLOW_MODE, RestrictionKind, RestrictionState, RestrictionStatus,
    RestrictionType, format_remaining, remaining_secs,
};
pub use session::{
    ChatSession, RoomId, RoomKind, RoomStatus, SessionConfig, SessionEvent, SessionStats,
};
pub use store::{DateGroup, MessageNotFound, MessageStore};
