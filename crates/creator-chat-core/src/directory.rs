//! A channel's chat rooms.
//!
//! A channel runs at most one creator-only room, which stays up until a
//! moderator ends it, and at most one general room that has not ended yet.
//! Ended rooms stay listed until closed so their history can still be read.
//!
//! The directory also holds channel-wide settings edited from the dashboard:
//! the pinned announcement and the banned-word list. Banned words are stored
//! for display and export only; messages are not filtered against them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    env::Environment,
    error::{InputError, RoomError, SessionError},
    message::Role,
    session::{ChatSession, RoomId, RoomKind, RoomStatus, SessionConfig, require_moderator},
};

/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 50;

/// Maximum announcement length in characters.
pub const MAX_ANNOUNCEMENT_CHARS: usize = 500;

/// Change to channel-wide settings, drained with
/// [`RoomDirectory::take_events`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectoryEvent {
    /// Announcement replaced or cleared (`None`).
    AnnouncementChanged {
        /// New announcement.
        text: Option<String>,
    },
    /// Word added to the banned list.
    BannedWordAdded {
        /// Trimmed word.
        word: String,
    },
    /// Word removed from the banned list.
    BannedWordRemoved {
        /// Removed word.
        word: String,
    },
}

/// Everything the channel dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelOverview {
    /// Channel name.
    pub channel: String,
    /// Pinned announcement, if any.
    pub announcement: Option<String>,
    /// Banned words in insertion order.
    pub banned_words: Vec<String>,
    /// Rooms in creation order.
    pub rooms: Vec<RoomSummary>,
    /// Totals across rooms.
    pub totals: DirectoryStats,
}

/// One room as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    /// Room ID.
    pub room_id: RoomId,
    /// General or creator-only.
    pub kind: RoomKind,
    /// Display title.
    pub title: String,
    /// Lifecycle status.
    pub status: RoomStatus,
    /// Current participants.
    pub participants: u64,
    /// Messages in history.
    pub messages: usize,
}

/// Which room kinds a channel already runs, for the create dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingRooms {
    /// A creator-only room has not ended.
    pub has_creator_only: bool,
    /// A general room has not ended.
    pub has_active_general: bool,
}

/// Totals across every listed room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryStats {
    /// Rooms listed, ended ones included.
    pub rooms: usize,
    /// Rooms not ended.
    pub live_rooms: usize,
    /// Participants across live rooms.
    pub participants: u64,
    /// Messages appended across all rooms.
    pub total_messages: u64,
    /// Block actions across all rooms.
    pub blocked_users: u64,
}

/// Rooms of one channel.
pub struct RoomDirectory<E: Environment> {
    env: E,
    channel: String,
    config: SessionConfig,
    rooms: HashMap<RoomId, ChatSession<E>>,
    /// Creation order for listing
    order: Vec<RoomId>,
    announcement: Option<String>,
    banned_words: Vec<String>,
    events: Vec<DirectoryEvent>,
}

impl<E: Environment> RoomDirectory<E> {
    /// Create an empty directory for `channel`. New rooms get a copy of
    /// `config`.
    pub fn new(env: E, channel: impl Into<String>, config: SessionConfig) -> Self {
        Self {
            env,
            channel: channel.into(),
            config,
            rooms: HashMap::new(),
            order: Vec::new(),
            announcement: None,
            banned_words: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Open and start a room.
    ///
    /// An empty title falls back to `"{channel}'s live chat"`.
    ///
    /// # Errors
    ///
    /// - `RoomError::TitleTooLong` if the trimmed title exceeds
    ///   [`MAX_TITLE_CHARS`]
    /// - `RoomError::CreatorOnlyExists` if a creator-only room is still up
    /// - `RoomError::GeneralAlreadyActive` if a general room is still up
    pub fn create_room(&mut self, kind: RoomKind, title: &str) -> Result<RoomId, RoomError> {
        let title = title.trim();
        let len = title.chars().count();
        if len > MAX_TITLE_CHARS {
            return Err(RoomError::TitleTooLong { len, max: MAX_TITLE_CHARS });
        }

        let existing = self.existing();
        match kind {
            RoomKind::CreatorOnly if existing.has_creator_only => {
                return Err(RoomError::CreatorOnlyExists);
            },
            RoomKind::General if existing.has_active_general => {
                return Err(RoomError::GeneralAlreadyActive);
            },
            _ => {},
        }

        let title = if title.is_empty() {
            format!("{}'s live chat", self.channel)
        } else {
            title.to_string()
        };

        let mut room_id = self.env.random_u128();
        while self.rooms.contains_key(&room_id) {
            room_id = self.env.random_u128();
        }

        let mut session =
            ChatSession::new(self.env.clone(), room_id, kind, title, self.config.clone());
        session.start()?;

        self.rooms.insert(room_id, session);
        self.order.push(room_id);
        tracing::info!(room = %format_args!("{room_id:032x}"), ?kind, "room created");
        Ok(room_id)
    }

    /// End a room. It stays listed.
    pub fn end_room(&mut self, room_id: RoomId, role: Role) -> Result<(), RoomError> {
        let session = self.rooms.get_mut(&room_id).ok_or(RoomError::RoomNotFound(room_id))?;
        session.end_session(role)?;
        Ok(())
    }

    /// Discard a room and its history. Returns the session.
    pub fn close_room(&mut self, room_id: RoomId) -> Result<ChatSession<E>, RoomError> {
        let session = self.rooms.remove(&room_id).ok_or(RoomError::RoomNotFound(room_id))?;
        self.order.retain(|id| *id != room_id);
        tracing::debug!(room = %format_args!("{room_id:032x}"), "room closed");
        Ok(session)
    }

    /// Room by ID.
    pub fn get(&self, room_id: RoomId) -> Option<&ChatSession<E>> {
        self.rooms.get(&room_id)
    }

    /// Room by ID, mutable.
    pub fn get_mut(&mut self, room_id: RoomId) -> Option<&mut ChatSession<E>> {
        self.rooms.get_mut(&room_id)
    }

    /// Rooms in creation order.
    pub fn summaries(&self) -> Vec<RoomSummary> {
        self.sessions()
            .map(|s| RoomSummary {
                room_id: s.room_id(),
                kind: s.kind(),
                title: s.title().to_string(),
                status: s.status(),
                participants: s.participant_count(),
                messages: s.messages().len(),
            })
            .collect()
    }

    /// Which room kinds are still up.
    pub fn existing(&self) -> ExistingRooms {
        let live = |kind: RoomKind| {
            self.sessions().any(|s| s.kind() == kind && s.status() != RoomStatus::Ended)
        };
        ExistingRooms {
            has_creator_only: live(RoomKind::CreatorOnly),
            has_active_general: live(RoomKind::General),
        }
    }

    /// Dashboard totals.
    pub fn totals(&self) -> DirectoryStats {
        self.sessions().fold(DirectoryStats::default(), |mut acc, s| {
            let stats = s.stats();
            acc.rooms += 1;
            if s.status() != RoomStatus::Ended {
                acc.live_rooms += 1;
                acc.participants += stats.participant_count;
            }
            acc.total_messages += stats.total_messages;
            acc.blocked_users += stats.blocked_users;
            acc
        })
    }

    /// Advance every room's countdowns. Returns viewers released in total.
    pub fn tick(&mut self) -> usize {
        self.rooms.values_mut().map(ChatSession::tick).sum()
    }

    /// Pin an announcement for the channel.
    ///
    /// The text is trimmed; an empty result clears the announcement.
    /// Creator or moderator only.
    pub fn set_announcement(&mut self, role: Role, text: &str) -> Result<(), RoomError> {
        require_moderator(role, "edit the announcement")?;
        let text = text.trim();
        let len = text.chars().count();
        if len > MAX_ANNOUNCEMENT_CHARS {
            let input = InputError::TooLong { len, max: MAX_ANNOUNCEMENT_CHARS };
            return Err(SessionError::from(input).into());
        }

        let text = (!text.is_empty()).then(|| text.to_string());
        if self.announcement != text {
            self.announcement = text.clone();
            self.events.push(DirectoryEvent::AnnouncementChanged { text });
            tracing::info!(channel = %self.channel, "announcement changed");
        }
        Ok(())
    }

    /// Remove the announcement.
    pub fn clear_announcement(&mut self, role: Role) -> Result<(), RoomError> {
        self.set_announcement(role, "")
    }

    /// Current announcement.
    pub fn announcement(&self) -> Option<&str> {
        self.announcement.as_deref()
    }

    /// Add a banned word. Returns `false` if it was already listed.
    ///
    /// # Errors
    ///
    /// - `Session(Unauthorized)` for fans
    /// - `Session(InvalidInput(Empty))` if the word is blank after trimming
    pub fn add_banned_word(&mut self, role: Role, word: &str) -> Result<bool, RoomError> {
        require_moderator(role, "edit banned words")?;
        let word = word.trim();
        if word.is_empty() {
            return Err(SessionError::from(InputError::Empty).into());
        }
        if self.banned_words.iter().any(|w| w == word) {
            return Ok(false);
        }

        self.banned_words.push(word.to_string());
        self.events.push(DirectoryEvent::BannedWordAdded { word: word.to_string() });
        tracing::debug!(word, "banned word added");
        Ok(true)
    }

    /// Remove a banned word. Returns `false` if it was not listed.
    pub fn remove_banned_word(&mut self, role: Role, word: &str) -> Result<bool, RoomError> {
        require_moderator(role, "edit banned words")?;
        let Some(index) = self.banned_words.iter().position(|w| w == word) else {
            return Ok(false);
        };

        let word = self.banned_words.remove(index);
        tracing::debug!(word = %word, "banned word removed");
        self.events.push(DirectoryEvent::BannedWordRemoved { word });
        Ok(true)
    }

    /// Banned words in insertion order.
    pub fn banned_words(&self) -> &[String] {
        &self.banned_words
    }

    /// Announcement, banned words, rooms and totals in one view.
    pub fn overview(&self) -> ChannelOverview {
        ChannelOverview {
            channel: self.channel.clone(),
            announcement: self.announcement.clone(),
            banned_words: self.banned_words.clone(),
            rooms: self.summaries(),
            totals: self.totals(),
        }
    }

    /// Drain queued settings changes.
    pub fn take_events(&mut self) -> Vec<DirectoryEvent> {
        std::mem::take(&mut self.events)
    }

    /// Channel name.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Number of listed rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// No rooms listed.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    fn sessions(&self) -> impl Iterator<Item = &ChatSession<E>> {
        self.order.iter().filter_map(|id| self.rooms.get(id))
    }
}
