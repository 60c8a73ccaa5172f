//! Chat session controller.
//!
//! [`ChatSession`] is the single entry point for one room. A UI calls it for
//! user actions; a transport (or the mock activity feed) calls the very same
//! methods for inbound events. It never touches the network or a timer:
//! time comes from the [`Environment`], and countdowns advance because the
//! runtime calls [`ChatSession::tick`] once per second.
//!
//! # Room state machine
//!
//! ```text
//! Created ──start──► Active ⇄ Paused ──end──► Ended
//!                      └──────────end─────────┘
//! ```
//!
//! `Ended` is terminal. Per-viewer cooldowns and blocks are an overlay kept in
//! [`RestrictionState`]; they are not room states.
//!
//! Every operation validates before it commits, so an `Err` leaves the
//! session exactly as it was. Successful operations queue [`SessionEvent`]s
//! that subscribers drain with [`ChatSession::take_events`].

use std::{collections::HashSet, time::Duration};

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    env::Environment,
    error::{DenyReason, InputError, SessionError, Target},
    message::{
        AuthorRole, MessageDraft, MessageId, MessageView, Participant, Role, SYSTEM_USER_ID, UserId,
    },
    reaction::{ReactionChange, ReactionLedger},
    restriction::{
        MAX_RESTRICTION, MAX_SLOW_MODE, RestrictionState, RestrictionStatus, RestrictionType,
        format_remaining,
    },
    store::{DateGroup, MessageStore},
};

/// 128-bit room identifier.
pub type RoomId = u128;

/// Who may post in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    /// Everyone may post, subject to moderation.
    General,
    /// Only the creator posts; everyone may react.
    CreatorOnly,
}

/// Room lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Opened but not live yet.
    Created,
    /// Live.
    Active,
    /// Live, but only the creator may post.
    Paused,
    /// Terminal.
    Ended,
}

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum message length in characters, after trimming.
    pub max_message_chars: usize,
    /// Block duration when the moderator does not pick one.
    pub default_block: Duration,
    /// Reason recorded on moderator blocks.
    pub block_reason: String,
    /// Replacement text for deleted messages.
    pub removed_placeholder: String,
    /// Replacement text for messages of blocked users.
    pub blocked_placeholder: String,
    /// Participant count the session starts with.
    pub initial_participants: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_message_chars: 500,
            default_block: Duration::from_secs(3600),
            block_reason: "inappropriate language".to_string(),
            removed_placeholder: "message removed".to_string(),
            blocked_placeholder: "[message from blocked user]".to_string(),
            initial_participants: 0,
        }
    }
}

/// Change notifications for subscribers (presentation layer, fan-out).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A message was appended.
    MessageAppended {
        /// New message.
        id: MessageId,
    },

    /// A message's content was replaced.
    MessageRedacted {
        /// Redacted message.
        id: MessageId,
    },

    /// A viewer's reaction changed.
    ReactionChanged {
        /// Target message.
        id: MessageId,
        /// Viewer who toggled.
        viewer: UserId,
        /// What changed.
        change: ReactionChange,
    },

    /// A viewer was put in cooldown or blocked.
    UserRestricted {
        /// Restricted viewer.
        user_id: UserId,
        /// Cooldown or block.
        kind: RestrictionType,
        /// Restriction length in seconds.
        duration_secs: u64,
    },

    /// A viewer's restriction expired or was lifted.
    RestrictionLifted {
        /// Released viewer.
        user_id: UserId,
    },

    /// Room status changed.
    StatusChanged {
        /// Previous status.
        from: RoomStatus,
        /// New status.
        to: RoomStatus,
    },

    /// Slow mode interval changed.
    SlowModeChanged {
        /// New interval in seconds. Zero means off.
        seconds: u64,
    },

    /// Participant count changed.
    ParticipantsChanged {
        /// New count.
        count: u64,
    },

    /// History was cleared.
    HistoryCleared,
}

/// Running counters for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Messages appended, including system announcements.
    pub total_messages: u64,
    /// Messages removed by a moderator.
    pub deleted_messages: u64,
    /// Block actions taken.
    pub blocked_users: u64,
    /// Current participant count.
    pub participant_count: u64,
}

/// Live state of one chat room.
///
/// Generic over the environment so tests drive it with virtual time.
pub struct ChatSession<E: Environment> {
    /// Time and randomness
    env: E,
    /// Room identity
    room_id: RoomId,
    /// General or creator-only
    kind: RoomKind,
    /// Display title
    title: String,
    /// Limits and placeholder texts
    config: SessionConfig,
    /// Lifecycle status
    status: RoomStatus,
    /// Message history
    store: MessageStore,
    /// Active reactions per viewer
    reactions: ReactionLedger,
    /// Pause, slow mode, cooldowns, blocks
    restrictions: RestrictionState<E::Instant>,
    /// Counters (participant count lives here)
    stats: SessionStats,
    /// Users that posted as creator; never restricted
    creators: HashSet<UserId>,
    /// Pending notifications
    events: Vec<SessionEvent>,
}

impl<E: Environment> ChatSession<E> {
    /// Create a session in `Created` status.
    pub fn new(
        env: E,
        room_id: RoomId,
        kind: RoomKind,
        title: impl Into<String>,
        config: SessionConfig,
    ) -> Self {
        let stats = SessionStats {
            participant_count: config.initial_participants,
            ..SessionStats::default()
        };
        Self {
            env,
            room_id,
            kind,
            title: title.into(),
            config,
            status: RoomStatus::Created,
            store: MessageStore::new(),
            reactions: ReactionLedger::new(),
            restrictions: RestrictionState::new(),
            stats,
            creators: HashSet::new(),
            events: Vec::new(),
        }
    }

    /// Go live: `Created → Active`. No-op if already live.
    pub fn start(&mut self) -> Result<(), SessionError> {
        match self.status {
            RoomStatus::Created => {
                self.set_status(RoomStatus::Active);
                Ok(())
            },
            RoomStatus::Active | RoomStatus::Paused => Ok(()),
            RoomStatus::Ended => Err(SessionError::SessionEnded),
        }
    }

    /// Append pre-existing history (mock data, replayed backlog) without
    /// gating. Counts toward stats like any other message.
    pub fn seed(&mut self, draft: MessageDraft) -> Result<MessageId, SessionError> {
        self.ensure_not_ended()?;
        Ok(self.append(draft))
    }

    /// Post a message as `author`.
    ///
    /// Fails with `SessionEnded` after the end regardless of role, then with
    /// `SendDenied` if the gate refuses, then with `InvalidInput` for empty
    /// or over-length content. On success the trimmed content is appended
    /// and the send is recorded for slow mode.
    pub fn send_message(
        &mut self,
        author: &Participant,
        content: &str,
    ) -> Result<MessageId, SessionError> {
        self.ensure_live()?;
        let now = self.env.now();
        self.gate(author.id, author.role, now)?;
        let content = self.validate_content(content)?;

        let id = self.append(MessageDraft::from_participant(author, content));
        self.restrictions.record_send(author.id, now);
        tracing::debug!(
            room = %format_args!("{:032x}", self.room_id),
            %id,
            author = author.id,
            "message sent"
        );
        Ok(id)
    }

    /// Inbound message from a transport or activity feed.
    ///
    /// Goes through exactly the same checks as [`Self::send_message`].
    pub fn receive_message(
        &mut self,
        author: &Participant,
        content: &str,
    ) -> Result<MessageId, SessionError> {
        self.send_message(author, content)
    }

    /// Replace one message with the removal placeholder.
    ///
    /// The original text stays available to moderators; deleting twice keeps
    /// the first original.
    pub fn delete_message(&mut self, role: Role, id: MessageId) -> Result<(), SessionError> {
        self.ensure_not_ended()?;
        require_moderator(role, "delete messages")?;

        let changed = self.store.redact(id, &self.config.removed_placeholder)?;
        if changed {
            self.stats.deleted_messages += 1;
            self.events.push(SessionEvent::MessageRedacted { id });
            tracing::info!(%id, ?role, "message deleted");
        }
        Ok(())
    }

    /// Block a user, redact everything they posted, and announce it.
    ///
    /// `duration` defaults to [`SessionConfig::default_block`]. Blocking again
    /// replaces the earlier countdown. Returns how many messages were
    /// redacted.
    ///
    /// The system author and anyone who posted as creator cannot be blocked.
    /// A moderator blocking their own ID is allowed.
    pub fn block_user(
        &mut self,
        role: Role,
        user_id: UserId,
        user_name: &str,
        duration: Option<Duration>,
    ) -> Result<usize, SessionError> {
        self.ensure_not_ended()?;
        require_moderator(role, "block users")?;
        let duration = duration.unwrap_or(self.config.default_block);
        self.validate_restriction(user_id, duration)?;

        let now = self.env.now();
        self.restrictions.apply_block(user_id, duration, self.config.block_reason.clone(), now);

        let redacted_ids: Vec<MessageId> = self
            .store
            .messages_by(user_id)
            .filter(|m| !(m.is_filtered() && m.content() == self.config.blocked_placeholder))
            .map(|m| m.id())
            .collect();
        let redacted = self.store.redact_author(user_id, &self.config.blocked_placeholder);
        for id in redacted_ids {
            self.events.push(SessionEvent::MessageRedacted { id });
        }

        self.stats.blocked_users += 1;
        self.events.push(SessionEvent::UserRestricted {
            user_id,
            kind: RestrictionType::Blocked,
            duration_secs: duration.as_secs(),
        });
        self.append(MessageDraft::system(format!(
            "{user_name} has been blocked for {}",
            format_remaining(duration.as_secs())
        )));

        tracing::info!(user_id, redacted, secs = duration.as_secs(), "user blocked");
        Ok(redacted)
    }

    /// Lift a block or cooldown early.
    pub fn unblock_user(&mut self, role: Role, user_id: UserId) -> Result<(), SessionError> {
        self.ensure_not_ended()?;
        require_moderator(role, "unblock users")?;

        if self.restrictions.lift(user_id, self.env.now()).is_none() {
            return Err(SessionError::NotFound(Target::Restriction(user_id)));
        }
        self.events.push(SessionEvent::RestrictionLifted { user_id });
        tracing::info!(user_id, "restriction lifted");
        Ok(())
    }

    /// Put a viewer in cooldown. Replaces an active block.
    pub fn apply_cooldown(
        &mut self,
        role: Role,
        viewer: UserId,
        duration: Duration,
    ) -> Result<(), SessionError> {
        self.ensure_not_ended()?;
        require_moderator(role, "apply cooldowns")?;
        self.validate_restriction(viewer, duration)?;

        let now = self.env.now();
        self.restrictions.apply_cooldown(viewer, duration, now);
        self.events.push(SessionEvent::UserRestricted {
            user_id: viewer,
            kind: RestrictionType::Cooldown,
            duration_secs: duration.as_secs(),
        });
        tracing::debug!(viewer, secs = duration.as_secs(), "cooldown applied");
        Ok(())
    }

    /// Set slow mode. Zero turns it off; at most [`MAX_SLOW_MODE`].
    pub fn set_slow_mode(&mut self, role: Role, seconds: u64) -> Result<(), SessionError> {
        self.ensure_not_ended()?;
        require_moderator(role, "change slow mode")?;
        let max_secs = MAX_SLOW_MODE.as_secs();
        if seconds > max_secs {
            return Err(InputError::DurationTooLong { secs: seconds, max_secs }.into());
        }

        self.restrictions.set_slow_mode(Duration::from_secs(seconds));
        self.events.push(SessionEvent::SlowModeChanged { seconds });
        tracing::info!(seconds, "slow mode changed");
        Ok(())
    }

    /// Flip `Active ⇄ Paused` and announce it. Returns the new status.
    pub fn toggle_pause(&mut self, role: Role) -> Result<RoomStatus, SessionError> {
        self.ensure_live()?;
        require_moderator(role, "pause the room")?;

        let (next, announcement) = match self.status {
            RoomStatus::Active => {
                self.restrictions.pause();
                (RoomStatus::Paused, "Chat has been paused by the creator")
            },
            _ => {
                self.restrictions.resume();
                (RoomStatus::Active, "Chat has resumed")
            },
        };
        self.set_status(next);
        self.append(MessageDraft::system(announcement));
        Ok(next)
    }

    /// Toggle a reaction. Never gated by pause or restrictions.
    pub fn toggle_reaction(
        &mut self,
        viewer: UserId,
        id: MessageId,
        emoji: &str,
    ) -> Result<ReactionChange, SessionError> {
        self.ensure_not_ended()?;
        if emoji.trim().is_empty() {
            return Err(InputError::Empty.into());
        }

        let message = self.store.get_mut(id).ok_or(SessionError::NotFound(Target::Message(id)))?;
        let change = self.reactions.toggle(message, viewer, emoji);
        self.events.push(SessionEvent::ReactionChanged { id, viewer, change: change.clone() });
        Ok(change)
    }

    /// End the session for good.
    pub fn end_session(&mut self, role: Role) -> Result<(), SessionError> {
        self.ensure_not_ended()?;
        require_moderator(role, "end the session")?;

        self.set_status(RoomStatus::Ended);
        tracing::info!(room = %format_args!("{:032x}", self.room_id), "session ended");
        Ok(())
    }

    /// Whether `viewer` could send right now. Pure.
    pub fn can_send(&self, viewer: UserId, role: Role) -> bool {
        self.ensure_live().is_ok() && self.gate(viewer, role, self.env.now()).is_ok()
    }

    /// What currently keeps `viewer` from sending, for a countdown.
    ///
    /// The viewer's own cooldown or block wins over a room pause. `None` if
    /// nothing applies.
    pub fn restriction_status(&self, viewer: UserId, role: Role) -> Option<RestrictionStatus> {
        if role == Role::Creator {
            return None;
        }
        self.restrictions.status_for(viewer, self.env.now()).or_else(|| {
            (self.status == RoomStatus::Paused).then(|| RestrictionStatus {
                kind: RestrictionType::Paused,
                remaining_secs: 0,
                reason: None,
                is_active: true,
            })
        })
    }

    /// Apply a presence change, clamped at zero. Returns the new count.
    pub fn update_participants(&mut self, delta: i64) -> Result<u64, SessionError> {
        self.ensure_not_ended()?;

        let current = self.stats.participant_count;
        let next = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta.unsigned_abs())
        };
        if next != current {
            self.stats.participant_count = next;
            self.events.push(SessionEvent::ParticipantsChanged { count: next });
        }
        Ok(next)
    }

    /// Drop all history and reactions.
    pub fn clear_history(&mut self, role: Role) -> Result<(), SessionError> {
        self.ensure_not_ended()?;
        require_moderator(role, "clear history")?;

        self.store.clear();
        self.reactions.clear();
        self.events.push(SessionEvent::HistoryCleared);
        tracing::info!("history cleared");
        Ok(())
    }

    /// Release viewers whose restriction deadline passed.
    ///
    /// Called once per second by the runtime. Idempotent; a no-op after the
    /// session ended. Returns how many viewers were released.
    pub fn tick(&mut self) -> usize {
        if self.status == RoomStatus::Ended {
            return 0;
        }

        let lifted = self.restrictions.tick(self.env.now());
        for (user_id, kind) in &lifted {
            tracing::debug!(user_id, ?kind, "restriction expired");
            self.events.push(SessionEvent::RestrictionLifted { user_id: *user_id });
        }
        lifted.len()
    }

    /// Messages as `viewer` should see them.
    pub fn view(&self, viewer: UserId, role: Role) -> Vec<MessageView> {
        self.store
            .iter()
            .map(|m| m.view(role, self.reactions.reaction_of(m.id(), viewer)))
            .collect()
    }

    /// Messages grouped by calendar day at `offset`.
    pub fn group_by_date(&self, offset: FixedOffset) -> Vec<DateGroup<'_>> {
        self.store.group_by_date(offset)
    }

    /// Drain pending events.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Room ID.
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Room kind.
    pub fn kind(&self) -> RoomKind {
        self.kind
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Lifecycle status.
    pub fn status(&self) -> RoomStatus {
        self.status
    }

    /// Current participant count.
    pub fn participant_count(&self) -> u64 {
        self.stats.participant_count
    }

    /// Running counters.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Message history.
    pub fn messages(&self) -> &MessageStore {
        &self.store
    }

    /// Active reactions.
    pub fn reactions(&self) -> &ReactionLedger {
        &self.reactions
    }

    /// Pause flag, slow mode, cooldowns, blocks.
    pub fn restrictions(&self) -> &RestrictionState<E::Instant> {
        &self.restrictions
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The session's environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    fn gate(&self, viewer: UserId, role: Role, now: E::Instant) -> Result<(), DenyReason> {
        if self.kind == RoomKind::CreatorOnly && role != Role::Creator {
            return Err(DenyReason::CreatorOnly);
        }
        self.restrictions.check(viewer, role, now)
    }

    fn validate_content(&self, content: &str) -> Result<String, InputError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(InputError::Empty);
        }
        let len = trimmed.chars().count();
        if len > self.config.max_message_chars {
            return Err(InputError::TooLong { len, max: self.config.max_message_chars });
        }
        Ok(trimmed.to_string())
    }

    fn validate_restriction(&self, target: UserId, duration: Duration) -> Result<(), InputError> {
        if target == SYSTEM_USER_ID || self.creators.contains(&target) {
            return Err(InputError::ProtectedTarget { user_id: target });
        }
        if duration.is_zero() {
            return Err(InputError::ZeroDuration);
        }
        if duration > MAX_RESTRICTION {
            let max_secs = MAX_RESTRICTION.as_secs();
            return Err(InputError::DurationTooLong { secs: duration.as_secs(), max_secs });
        }
        Ok(())
    }

    fn append(&mut self, draft: MessageDraft) -> MessageId {
        if draft.author_role == AuthorRole::Creator {
            self.creators.insert(draft.author_id);
        }
        let id = self.store.append(draft, self.wall_clock());
        self.stats.total_messages += 1;
        self.events.push(SessionEvent::MessageAppended { id });
        id
    }

    fn set_status(&mut self, to: RoomStatus) {
        let from = std::mem::replace(&mut self.status, to);
        if from != to {
            tracing::debug!(?from, ?to, "room status changed");
            self.events.push(SessionEvent::StatusChanged { from, to });
        }
    }

    fn wall_clock(&self) -> DateTime<Utc> {
        i64::try_from(self.env.wall_clock_secs())
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_default()
    }

    fn ensure_not_ended(&self) -> Result<(), SessionError> {
        if self.status == RoomStatus::Ended { Err(SessionError::SessionEnded) } else { Ok(()) }
    }

    fn ensure_live(&self) -> Result<(), SessionError> {
        match self.status {
            RoomStatus::Ended => Err(SessionError::SessionEnded),
            RoomStatus::Created => Err(SessionError::NotStarted),
            RoomStatus::Active | RoomStatus::Paused => Ok(()),
        }
    }
}

impl<E: Environment> std::fmt::Debug for ChatSession<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("room_id", &format_args!("{:032x}", self.room_id))
            .field("kind", &self.kind)
            .field("status", &self.status)
            .field("messages", &self.store.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

pub(crate) fn require_moderator(role: Role, action: &'static str) -> Result<(), SessionError> {
    if role.is_moderator() { Ok(()) } else { Err(SessionError::Unauthorized { action, role }) }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    };

    use super::*;
    use crate::message::MembershipTier;

    /// Minimal manual clock; the harness crate has the full simulation env.
    #[derive(Clone, Default)]
    struct ManualEnv {
        millis: Arc<AtomicU64>,
    }

    impl ManualEnv {
        fn advance(&self, secs: u64) {
            self.millis.fetch_add(secs * 1000, Ordering::SeqCst);
        }
    }

    impl Environment for ManualEnv {
        type Instant = Duration;

        fn now(&self) -> Duration {
            Duration::from_millis(self.millis.load(Ordering::SeqCst))
        }

        fn wall_clock_secs(&self) -> u64 {
            1_753_142_400 + self.millis.load(Ordering::SeqCst) / 1000
        }

        fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
            self.millis.fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
            std::future::ready(())
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            buffer.fill(7);
        }
    }

    fn live(kind: RoomKind) -> (ManualEnv, ChatSession<ManualEnv>) {
        let env = ManualEnv::default();
        let mut session =
            ChatSession::new(env.clone(), 1, kind, "live chat", SessionConfig::default());
        assert_eq!(session.start(), Ok(()));
        (env, session)
    }

    fn fan() -> Participant {
        Participant::fan(100, "kane", MembershipTier::Basic)
    }

    #[test]
    fn created_session_rejects_sends() {
        let env = ManualEnv::default();
        let mut session =
            ChatSession::new(env, 1, RoomKind::General, "t", SessionConfig::default());

        assert_eq!(session.send_message(&fan(), "hi"), Err(SessionError::NotStarted));
        assert!(session.messages().is_empty());
    }

    #[test]
    fn content_is_trimmed_and_capped() {
        let (_, mut session) = live(RoomKind::General);

        let id = session.send_message(&fan(), "  hello  ");
        let content =
            id.ok().and_then(|id| session.messages().get(id)).map(|m| m.content().to_string());
        assert_eq!(content.as_deref(), Some("hello"));

        assert_eq!(
            session.send_message(&fan(), "   "),
            Err(SessionError::InvalidInput(InputError::Empty))
        );

        let long = "가".repeat(501);
        assert_eq!(
            session.send_message(&fan(), &long),
            Err(SessionError::InvalidInput(InputError::TooLong { len: 501, max: 500 }))
        );
        assert!(session.send_message(&fan(), &"가".repeat(500)).is_ok());
    }

    #[test]
    fn creator_only_room_rejects_fans() {
        let (_, mut session) = live(RoomKind::CreatorOnly);
        let creator = Participant::creator(1, "momorina");

        assert_eq!(
            session.send_message(&fan(), "hi"),
            Err(SessionError::SendDenied(DenyReason::CreatorOnly))
        );
        let id = session.send_message(&creator, "new content next Friday");
        assert!(id.is_ok());

        // Fans still react
        if let Ok(id) = id {
            assert!(session.toggle_reaction(fan().id, id, "👏").is_ok());
        }
    }

    #[test]
    fn rejected_send_leaves_state_untouched() {
        let (_, mut session) = live(RoomKind::General);
        assert!(session.set_slow_mode(Role::Creator, 30).is_ok());
        assert!(session.send_message(&fan(), "first").is_ok());
        let _ = session.take_events();
        let before = session.stats();

        let result = session.send_message(&fan(), "second");

        assert!(matches!(result, Err(SessionError::SendDenied(DenyReason::SlowMode { .. }))));
        assert_eq!(session.stats(), before);
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn tick_releases_expired_cooldown() {
        let (env, mut session) = live(RoomKind::General);
        assert!(session.apply_cooldown(Role::Moderator, 100, Duration::from_secs(60)).is_ok());
        let _ = session.take_events();

        env.advance(59);
        assert_eq!(session.tick(), 0);
        assert!(!session.can_send(100, Role::Fan));

        env.advance(1);
        assert_eq!(session.tick(), 1);
        assert_eq!(session.take_events(), vec![SessionEvent::RestrictionLifted { user_id: 100 }]);
        assert!(session.can_send(100, Role::Fan));
    }

    #[test]
    fn participants_clamp_at_zero() {
        let (_, mut session) = live(RoomKind::General);
        assert_eq!(session.update_participants(3), Ok(3));
        assert_eq!(session.update_participants(-5), Ok(0));
    }

    #[test]
    fn pause_status_shown_to_fans_only() {
        let (_, mut session) = live(RoomKind::General);
        assert_eq!(session.toggle_pause(Role::Creator), Ok(RoomStatus::Paused));

        let status = session.restriction_status(100, Role::Fan);
        assert_eq!(status.map(|s| s.kind), Some(RestrictionType::Paused));
        assert_eq!(session.restriction_status(1, Role::Creator), None);
    }

    #[test]
    fn unblock_requires_active_restriction() {
        let (_, mut session) = live(RoomKind::General);
        assert_eq!(
            session.unblock_user(Role::Creator, 100),
            Err(SessionError::NotFound(Target::Restriction(100)))
        );
        assert!(session.block_user(Role::Creator, 100, "kane", None).is_ok());
        assert_eq!(session.unblock_user(Role::Creator, 100), Ok(()));
        assert!(session.can_send(100, Role::Fan));
    }

    #[test]
    fn unblock_after_expiry_is_not_found() {
        let (env, mut session) = live(RoomKind::General);
        assert!(session.apply_cooldown(Role::Moderator, 100, Duration::from_secs(60)).is_ok());
        let _ = session.take_events();

        env.advance(61);
        assert_eq!(
            session.unblock_user(Role::Moderator, 100),
            Err(SessionError::NotFound(Target::Restriction(100)))
        );
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn durations_over_the_ceiling_are_rejected() {
        let (_, mut session) = live(RoomKind::General);
        let huge = Duration::from_secs(u64::MAX);
        let too_long = SessionError::InvalidInput(InputError::DurationTooLong {
            secs: u64::MAX,
            max_secs: MAX_RESTRICTION.as_secs(),
        });

        let blocked = session.block_user(Role::Creator, 100, "kane", Some(huge));
        assert_eq!(blocked, Err(too_long.clone()));
        assert_eq!(session.apply_cooldown(Role::Moderator, 100, huge), Err(too_long));
        assert_eq!(
            session.set_slow_mode(Role::Creator, 3601),
            Err(SessionError::InvalidInput(InputError::DurationTooLong {
                secs: 3601,
                max_secs: 3600,
            }))
        );
        assert!(session.take_events().is_empty());
        assert!(session.can_send(100, Role::Fan));

        assert!(session.block_user(Role::Creator, 100, "kane", Some(MAX_RESTRICTION)).is_ok());
        assert!(session.set_slow_mode(Role::Creator, 3600).is_ok());
    }

    #[test]
    fn creator_and_system_cannot_be_restricted() {
        let (_, mut session) = live(RoomKind::General);
        let creator = Participant::creator(1, "momorina");
        assert!(session.send_message(&creator, "welcome").is_ok());
        let protected =
            |user_id| SessionError::InvalidInput(InputError::ProtectedTarget { user_id });

        assert_eq!(session.block_user(Role::Moderator, 1, "momorina", None), Err(protected(1)));
        assert_eq!(
            session.apply_cooldown(Role::Moderator, SYSTEM_USER_ID, Duration::from_secs(60)),
            Err(protected(SYSTEM_USER_ID))
        );
        assert!(session.can_send(1, Role::Creator));

        // A moderator may block their own ID
        assert!(session.block_user(Role::Moderator, 55, "mod", None).is_ok());
    }
}
