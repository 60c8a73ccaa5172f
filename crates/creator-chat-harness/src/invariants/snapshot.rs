//! Observable session state for invariant checking.
//!
//! Snapshots copy what a session exposes at one point in time, so checks run
//! against a consistent view and two snapshots can be compared to prove an
//! operation changed nothing.

use std::collections::BTreeMap;

use creator_chat_core::{ChatSession, MessageId, RoomStatus, SessionStats, UserId, env::Environment};
use serde::Serialize;

/// Snapshot of one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageSnapshot {
    /// Message ID.
    pub id: MessageId,
    /// Author.
    pub author_id: UserId,
    /// Displayed text.
    pub content: String,
    /// Pre-filter text.
    pub original_content: Option<String>,
    /// Content was replaced.
    pub is_filtered: bool,
    /// Emoji tallies.
    pub reactions: BTreeMap<String, u32>,
}

/// Snapshot of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Lifecycle status.
    pub status: RoomStatus,
    /// Every status the session went through, oldest first.
    pub status_history: Vec<RoomStatus>,
    /// Messages in store order.
    pub messages: Vec<MessageSnapshot>,
    /// Active reactions as `(message, viewer) → emoji`.
    pub reactions: BTreeMap<(MessageId, UserId), String>,
    /// Room is paused.
    pub paused: bool,
    /// Slow mode interval in seconds.
    pub slow_mode_secs: u64,
    /// Running counters.
    pub stats: SessionStats,
}

impl SessionSnapshot {
    /// Capture a session. `status_history` is supplied by the caller, which
    /// observed the session's status events.
    pub fn capture<E: Environment>(
        session: &ChatSession<E>,
        status_history: &[RoomStatus],
    ) -> Self {
        let messages = session
            .messages()
            .iter()
            .map(|m| MessageSnapshot {
                id: m.id(),
                author_id: m.author_id(),
                content: m.content().to_string(),
                original_content: m.original_content().map(str::to_string),
                is_filtered: m.is_filtered(),
                reactions: m.reactions().clone(),
            })
            .collect();

        let reactions = session
            .reactions()
            .iter()
            .map(|(message_id, viewer, emoji)| ((message_id, viewer), emoji.to_string()))
            .collect();

        Self {
            status: session.status(),
            status_history: status_history.to_vec(),
            messages,
            reactions,
            paused: session.restrictions().is_paused(),
            slow_mode_secs: session.restrictions().slow_mode().as_secs(),
            stats: session.stats(),
        }
    }

    /// Message by ID.
    pub fn message(&self, id: MessageId) -> Option<&MessageSnapshot> {
        self.messages.iter().find(|m| m.id == id)
    }
}
