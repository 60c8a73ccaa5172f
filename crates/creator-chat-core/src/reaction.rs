//! Emoji reactions with single-reaction-per-viewer semantics.
//!
//! Counts live on the [`Message`]; the ledger only remembers which emoji each
//! viewer currently has active on each message.

use std::collections::HashMap;

use crate::message::{Message, MessageId, UserId};

/// Effect of a toggle on one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionChange {
    /// Viewer had no reaction; `emoji` was added.
    Added {
        /// Emoji now active.
        emoji: String,
    },
    /// Viewer toggled their active emoji off.
    Removed {
        /// Emoji that was cleared.
        emoji: String,
    },
    /// Viewer switched from one emoji to another.
    Switched {
        /// Previously active emoji (decremented).
        from: String,
        /// Newly active emoji (incremented).
        to: String,
    },
}

/// Which emoji each viewer has active on each message.
#[derive(Debug, Default, Clone)]
pub struct ReactionLedger {
    /// Message ID → (viewer → active emoji)
    choices: HashMap<MessageId, HashMap<UserId, String>>,
}

impl ReactionLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle `emoji` for `viewer` on `message`.
    ///
    /// Same emoji as the active one: decrement and clear. Otherwise the
    /// previous emoji (if any) is decremented first, then `emoji` is
    /// incremented and recorded. Counts never go below zero.
    pub fn toggle(&mut self, message: &mut Message, viewer: UserId, emoji: &str) -> ReactionChange {
        let viewers = self.choices.entry(message.id()).or_default();

        match viewers.remove(&viewer) {
            Some(current) if current == emoji => {
                message.decrement_reaction(&current);
                if viewers.is_empty() {
                    self.choices.remove(&message.id());
                }
                ReactionChange::Removed { emoji: current }
            },
            Some(previous) => {
                message.decrement_reaction(&previous);
                message.increment_reaction(emoji);
                viewers.insert(viewer, emoji.to_string());
                ReactionChange::Switched { from: previous, to: emoji.to_string() }
            },
            None => {
                message.increment_reaction(emoji);
                viewers.insert(viewer, emoji.to_string());
                ReactionChange::Added { emoji: emoji.to_string() }
            },
        }
    }

    /// Viewer's active emoji on a message. `None` if they have not reacted.
    pub fn reaction_of(&self, message_id: MessageId, viewer: UserId) -> Option<&str> {
        self.choices.get(&message_id).and_then(|v| v.get(&viewer)).map(String::as_str)
    }

    /// All active reactions as `(message, viewer, emoji)`.
    pub fn iter(&self) -> impl Iterator<Item = (MessageId, UserId, &str)> {
        self.choices.iter().flat_map(|(message_id, viewers)| {
            viewers.iter().map(move |(viewer, emoji)| (*message_id, *viewer, emoji.as_str()))
        })
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.choices.clear();
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::message::{MembershipTier, MessageDraft, Participant};

    fn seeded(emoji: &str, count: u32) -> Message {
        let author = Participant::creator(1, "momorina");
        let draft = MessageDraft::from_participant(&author, "hello").with_reaction(emoji, count);
        Message::from_draft(MessageId::new(1), draft, DateTime::<Utc>::default())
    }

    #[test]
    fn double_toggle_restores_count() {
        let mut msg = seeded("❤", 45);
        let mut ledger = ReactionLedger::new();

        ledger.toggle(&mut msg, 9, "❤");
        assert_eq!(msg.reaction_count("❤"), 46);
        assert_eq!(ledger.reaction_of(msg.id(), 9), Some("❤"));

        let change = ledger.toggle(&mut msg, 9, "❤");
        assert_eq!(change, ReactionChange::Removed { emoji: "❤".to_string() });
        assert_eq!(msg.reaction_count("❤"), 45);
        assert_eq!(ledger.reaction_of(msg.id(), 9), None);
    }

    #[test]
    fn switching_moves_the_single_reaction() {
        let mut msg = seeded("👍", 12);
        let mut ledger = ReactionLedger::new();

        ledger.toggle(&mut msg, 9, "👍");
        let change = ledger.toggle(&mut msg, 9, "🔥");

        assert_eq!(change, ReactionChange::Switched { from: "👍".to_string(), to: "🔥".to_string() });
        assert_eq!(msg.reaction_count("👍"), 12);
        assert_eq!(msg.reaction_count("🔥"), 1);
        assert_eq!(ledger.iter().count(), 1);
    }

    #[test]
    fn viewers_are_independent() {
        let author = Participant::fan(2, "kane", MembershipTier::Basic);
        let mut msg = Message::from_draft(
            MessageId::new(3),
            MessageDraft::from_participant(&author, "what content?"),
            DateTime::<Utc>::default(),
        );
        let mut ledger = ReactionLedger::new();

        ledger.toggle(&mut msg, 10, "😍");
        ledger.toggle(&mut msg, 11, "😍");
        ledger.toggle(&mut msg, 10, "😍");

        assert_eq!(msg.reaction_count("😍"), 1);
        assert_eq!(ledger.reaction_of(msg.id(), 10), None);
        assert_eq!(ledger.reaction_of(msg.id(), 11), Some("😍"));
    }
}
