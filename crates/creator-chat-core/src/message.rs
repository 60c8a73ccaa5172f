//! Chat message types.
//!
//! [`Message`] is the stored record. Its fields are private so the filtering
//! invariants (original content preserved exactly once, counts never below
//! zero) can only be changed through the store and the reaction ledger.
//! [`MessageView`] is the per-viewer projection a presentation layer renders.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User identifier.
pub type UserId = u64;

/// Author ID used for system announcements.
pub const SYSTEM_USER_ID: UserId = 0;

/// Opaque message identifier, unique within a store for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    /// Wrap a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// Role of a viewer acting on a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Channel owner. May always post, even while the room is paused.
    Creator,
    /// Moderator appointed by the creator.
    Moderator,
    /// Regular viewer.
    Fan,
}

impl Role {
    /// Creator and moderators may delete, block, pause, and end.
    pub fn is_moderator(self) -> bool {
        matches!(self, Self::Creator | Self::Moderator)
    }
}

/// Role recorded on a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorRole {
    /// Posted by the creator.
    Creator,
    /// Posted by a moderator.
    Moderator,
    /// Posted by a fan.
    Fan,
    /// Room announcement (pause, block, resume).
    System,
}

impl From<Role> for AuthorRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Creator => Self::Creator,
            Role::Moderator => Self::Moderator,
            Role::Fan => Self::Fan,
        }
    }
}

/// Fan membership tier. Ignored for creator and system messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipTier {
    /// Free tier.
    #[default]
    Basic,
    /// Paid tier.
    Premium,
    /// Top tier.
    Vip,
}

/// Someone taking part in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Stable user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Role in this room.
    pub role: Role,
    /// Membership tier.
    pub tier: MembershipTier,
}

impl Participant {
    /// Create a participant.
    pub fn new(id: UserId, name: impl Into<String>, role: Role, tier: MembershipTier) -> Self {
        Self { id, name: name.into(), role, tier }
    }

    /// The channel creator (always VIP).
    pub fn creator(id: UserId, name: impl Into<String>) -> Self {
        Self::new(id, name, Role::Creator, MembershipTier::Vip)
    }

    /// A moderator.
    pub fn moderator(id: UserId, name: impl Into<String>) -> Self {
        Self::new(id, name, Role::Moderator, MembershipTier::Basic)
    }

    /// A fan at the given tier.
    pub fn fan(id: UserId, name: impl Into<String>, tier: MembershipTier) -> Self {
        Self::new(id, name, Role::Fan, tier)
    }
}

/// A message that has not been appended yet.
///
/// The store assigns the ID on append and stamps `created_at` unless the
/// draft carries its own (seeded history).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub(crate) author_id: UserId,
    pub(crate) author_name: String,
    pub(crate) author_role: AuthorRole,
    pub(crate) tier: MembershipTier,
    pub(crate) content: String,
    pub(crate) original_content: Option<String>,
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) reactions: BTreeMap<String, u32>,
}

impl MessageDraft {
    /// Draft a message from a participant.
    pub fn from_participant(author: &Participant, content: impl Into<String>) -> Self {
        Self {
            author_id: author.id,
            author_name: author.name.clone(),
            author_role: author.role.into(),
            tier: author.tier,
            content: content.into(),
            original_content: None,
            created_at: None,
            reactions: BTreeMap::new(),
        }
    }

    /// Draft a system announcement.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            author_id: SYSTEM_USER_ID,
            author_name: "system".to_string(),
            author_role: AuthorRole::System,
            tier: MembershipTier::Basic,
            content: content.into(),
            original_content: None,
            created_at: None,
            reactions: BTreeMap::new(),
        }
    }

    /// Use an explicit creation time instead of the append time.
    #[must_use]
    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Seed a reaction count. Zero counts are ignored.
    #[must_use]
    pub fn with_reaction(mut self, emoji: impl Into<String>, count: u32) -> Self {
        if count > 0 {
            self.reactions.insert(emoji.into(), count);
        }
        self
    }

    /// Mark the draft as already filtered: `masked` is shown, the current
    /// content is kept as the original.
    #[must_use]
    pub fn filtered(mut self, masked: impl Into<String>) -> Self {
        let original = std::mem::replace(&mut self.content, masked.into());
        self.original_content = Some(original);
        self
    }
}

/// A stored chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    author_id: UserId,
    author_name: String,
    author_role: AuthorRole,
    tier: MembershipTier,
    content: String,
    original_content: Option<String>,
    created_at: DateTime<Utc>,
    is_filtered: bool,
    reactions: BTreeMap<String, u32>,
}

impl Message {
    pub(crate) fn from_draft(id: MessageId, draft: MessageDraft, now: DateTime<Utc>) -> Self {
        let is_filtered = draft.original_content.is_some();
        Self {
            id,
            author_id: draft.author_id,
            author_name: draft.author_name,
            author_role: draft.author_role,
            tier: draft.tier,
            content: draft.content,
            original_content: draft.original_content,
            created_at: draft.created_at.unwrap_or(now),
            is_filtered,
            reactions: draft.reactions,
        }
    }

    /// Message ID.
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Author's user ID.
    pub fn author_id(&self) -> UserId {
        self.author_id
    }

    /// Author's display name.
    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    /// Author's role.
    pub fn author_role(&self) -> AuthorRole {
        self.author_role
    }

    /// Author's membership tier. Only meaningful for fans.
    pub fn tier(&self) -> MembershipTier {
        self.tier
    }

    /// Currently displayed text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Pre-filter text. `None` if the content was never altered.
    ///
    /// Moderator-only; fan-facing views go through [`Message::view`].
    pub fn original_content(&self) -> Option<&str> {
        self.original_content.as_deref()
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Content was replaced by a filter or a moderator.
    pub fn is_filtered(&self) -> bool {
        self.is_filtered
    }

    /// Emoji tallies.
    pub fn reactions(&self) -> &BTreeMap<String, u32> {
        &self.reactions
    }

    /// Count for one emoji. Zero if nobody reacted with it.
    pub fn reaction_count(&self, emoji: &str) -> u32 {
        self.reactions.get(emoji).copied().unwrap_or(0)
    }

    /// Replace the visible content.
    ///
    /// The first pre-filter text is kept; later redactions never overwrite it
    /// with a placeholder. Returns `false` if the content already equals
    /// `replacement`.
    pub(crate) fn redact(&mut self, replacement: &str) -> bool {
        if self.is_filtered && self.content == replacement {
            return false;
        }
        if self.original_content.is_none() {
            self.original_content = Some(std::mem::take(&mut self.content));
        }
        self.content = replacement.to_string();
        self.is_filtered = true;
        true
    }

    pub(crate) fn increment_reaction(&mut self, emoji: &str) {
        *self.reactions.entry(emoji.to_string()).or_insert(0) += 1;
    }

    /// Decrement with a floor of zero. Entries that reach zero are dropped so
    /// a double toggle leaves the map exactly as it was.
    pub(crate) fn decrement_reaction(&mut self, emoji: &str) {
        if let Some(count) = self.reactions.get_mut(emoji) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.reactions.remove(emoji);
            }
        }
    }

    /// Project this message for a viewer.
    ///
    /// `original_content` is only exposed to moderators and the creator.
    pub fn view(&self, role: Role, viewer_reaction: Option<&str>) -> MessageView {
        MessageView {
            id: self.id,
            author_id: self.author_id,
            author_name: self.author_name.clone(),
            author_role: self.author_role,
            tier: self.tier,
            content: self.content.clone(),
            original_content: role.is_moderator().then(|| self.original_content.clone()).flatten(),
            created_at: self.created_at,
            is_filtered: self.is_filtered,
            reactions: self.reactions.clone(),
            viewer_reaction: viewer_reaction.map(str::to_string),
        }
    }
}

/// Per-viewer projection of a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    /// Message ID.
    pub id: MessageId,
    /// Author's user ID.
    pub author_id: UserId,
    /// Author's display name.
    pub author_name: String,
    /// Author's role.
    pub author_role: AuthorRole,
    /// Author's membership tier.
    pub tier: MembershipTier,
    /// Displayed text.
    pub content: String,
    /// Pre-filter text. Always `None` for fans.
    pub original_content: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Content was replaced.
    pub is_filtered: bool,
    /// Emoji tallies.
    pub reactions: BTreeMap<String, u32>,
    /// The viewer's own active reaction.
    pub viewer_reaction: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(content: &str) -> Message {
        let author = Participant::fan(7, "kane", MembershipTier::Basic);
        Message::from_draft(
            MessageId::new(1),
            MessageDraft::from_participant(&author, content),
            DateTime::<Utc>::default(),
        )
    }

    #[test]
    fn redact_preserves_first_original() {
        let mut msg = message("hello");

        assert!(msg.redact("message removed"));
        assert!(!msg.redact("message removed"));
        assert!(msg.redact("[message from blocked user]"));

        assert_eq!(msg.content(), "[message from blocked user]");
        assert_eq!(msg.original_content(), Some("hello"));
        assert!(msg.is_filtered());
    }

    #[test]
    fn filtered_draft_keeps_original() {
        let author = Participant::fan(3, "anon", MembershipTier::Basic);
        let draft = MessageDraft::from_participant(&author, "this game is great")
            .filtered("this ***** is great");
        let msg = Message::from_draft(MessageId::new(4), draft, DateTime::<Utc>::default());

        assert!(msg.is_filtered());
        assert_eq!(msg.content(), "this ***** is great");
        assert_eq!(msg.original_content(), Some("this game is great"));
    }

    #[test]
    fn fan_view_hides_original() {
        let mut msg = message("spoiler");
        msg.redact("message removed");

        assert_eq!(msg.view(Role::Fan, None).original_content, None);
        assert_eq!(msg.view(Role::Moderator, None).original_content.as_deref(), Some("spoiler"));
        assert_eq!(msg.view(Role::Creator, None).original_content.as_deref(), Some("spoiler"));
    }

    #[test]
    fn decrement_never_underflows() {
        let mut msg = message("hi");
        msg.decrement_reaction("👍");
        assert_eq!(msg.reaction_count("👍"), 0);

        msg.increment_reaction("👍");
        msg.decrement_reaction("👍");
        msg.decrement_reaction("👍");
        assert_eq!(msg.reaction_count("👍"), 0);
        assert!(msg.reactions().is_empty());
    }
}
