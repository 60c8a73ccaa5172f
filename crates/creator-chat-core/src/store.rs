//! Ordered message history for one room.
//!
//! Append-only with in-place redaction. IDs are assigned on append from a
//! counter that survives [`MessageStore::clear`], so an ID is never reused
//! within a store's lifetime.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::message::{Message, MessageDraft, MessageId, UserId};

/// Redaction target does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("message not found: {0}")]
pub struct MessageNotFound(pub MessageId);

/// Messages posted on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateGroup<'a> {
    /// Calendar day at the grouping offset.
    pub date: NaiveDate,
    /// Display label (`YYYY.MM.DD`).
    pub label: String,
    /// Messages of that day, in store order.
    pub messages: Vec<&'a Message>,
}

/// Ordered message history.
#[derive(Debug, Default, Clone)]
pub struct MessageStore {
    /// Messages in append order
    messages: Vec<Message>,
    /// Message ID → position in `messages`
    index: HashMap<MessageId, usize>,
    /// Next ID to assign
    next_id: u64,
}

impl MessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the end and return its assigned ID.
    pub fn append(&mut self, draft: MessageDraft, now: DateTime<Utc>) -> MessageId {
        self.next_id += 1;
        let id = MessageId::new(self.next_id);
        self.index.insert(id, self.messages.len());
        self.messages.push(Message::from_draft(id, draft, now));
        id
    }

    /// Replace one message's content with `replacement`.
    ///
    /// Returns whether the visible content changed (a repeated redaction with
    /// the same text is a no-op).
    pub fn redact(&mut self, id: MessageId, replacement: &str) -> Result<bool, MessageNotFound> {
        let message = self.get_mut(id).ok_or(MessageNotFound(id))?;
        Ok(message.redact(replacement))
    }

    /// Redact every message authored by `author_id`.
    ///
    /// Returns how many messages changed.
    pub fn redact_author(&mut self, author_id: UserId, replacement: &str) -> usize {
        self.messages
            .iter_mut()
            .filter(|m| m.author_id() == author_id)
            .map(|m| m.redact(replacement))
            .filter(|changed| *changed)
            .count()
    }

    /// Group messages by calendar day at `offset`.
    ///
    /// Groups are ordered by first appearance and each keeps store order.
    /// Pure: the store is not touched.
    pub fn group_by_date(&self, offset: FixedOffset) -> Vec<DateGroup<'_>> {
        let mut groups: Vec<DateGroup<'_>> = Vec::new();
        let mut positions: HashMap<NaiveDate, usize> = HashMap::new();

        for message in &self.messages {
            let date = message.created_at().with_timezone(&offset).date_naive();
            if let Some(&pos) = positions.get(&date) {
                groups[pos].messages.push(message);
            } else {
                positions.insert(date, groups.len());
                groups.push(DateGroup {
                    date,
                    label: date.format("%Y.%m.%d").to_string(),
                    messages: vec![message],
                });
            }
        }

        groups
    }

    /// Drop all history. IDs keep counting up.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.index.clear();
    }

    /// Message by ID. `None` if absent.
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.index.get(&id).and_then(|&pos| self.messages.get(pos))
    }

    pub(crate) fn get_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        let pos = *self.index.get(&id)?;
        self.messages.get_mut(pos)
    }

    /// Messages in append order.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Messages authored by one user.
    pub fn messages_by(&self, author_id: UserId) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.author_id() == author_id)
    }

    /// Most recent message. `None` if empty.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Store holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
