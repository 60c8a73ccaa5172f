//! Error types for session and directory operations.
//!
//! Every failure is an explicit outcome for the caller; nothing here panics.
//! Operations validate first and commit second, so an `Err` always means
//! state was left untouched.

use thiserror::Error;

use crate::{
    message::{MessageId, Role, UserId},
    restriction::format_remaining,
    session::RoomId,
    store::MessageNotFound,
};

/// Why a send was refused.
///
/// Carries the remaining time where one applies so the UI can render a
/// countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// Viewer is cooling down.
    Cooldown {
        /// Whole seconds left.
        remaining_secs: u64,
    },

    /// Viewer was blocked by a moderator.
    Blocked {
        /// Whole seconds left.
        remaining_secs: u64,
        /// Reason given by the moderator.
        reason: String,
    },

    /// Room is paused; only the creator can post.
    RoomPaused,

    /// Slow mode spacing not yet elapsed.
    SlowMode {
        /// Whole seconds until the next send is allowed.
        remaining_secs: u64,
    },

    /// Creator-only room; viewers may react but not post.
    CreatorOnly,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cooldown { remaining_secs } => {
                write!(f, "cooldown active, {} left", format_remaining(*remaining_secs))
            },
            Self::Blocked { remaining_secs, reason } => {
                write!(f, "blocked ({reason}), {} left", format_remaining(*remaining_secs))
            },
            Self::RoomPaused => write!(f, "room is paused"),
            Self::SlowMode { remaining_secs } => {
                let remaining = format_remaining(*remaining_secs);
                write!(f, "slow mode, next message allowed in {remaining}")
            },
            Self::CreatorOnly => write!(f, "only the creator can post in this room"),
        }
    }
}

impl std::error::Error for DenyReason {}

impl DenyReason {
    /// Seconds until the denial lifts on its own. `None` if it only lifts
    /// through a state change (resume, different room kind).
    pub fn remaining_secs(&self) -> Option<u64> {
        match self {
            Self::Cooldown { remaining_secs }
            | Self::Blocked { remaining_secs, .. }
            | Self::SlowMode { remaining_secs } => Some(*remaining_secs),
            Self::RoomPaused | Self::CreatorOnly => None,
        }
    }
}

/// Rejected message content.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// Nothing left after trimming.
    #[error("message is empty")]
    Empty,

    /// Longer than the configured ceiling.
    #[error("message has {len} characters, limit is {max}")]
    TooLong {
        /// Characters after trimming.
        len: usize,
        /// Configured ceiling.
        max: usize,
    },

    /// Restriction with a zero duration.
    #[error("duration must be positive")]
    ZeroDuration,

    /// Restriction or slow mode longer than allowed.
    #[error("duration of {secs}s exceeds the {max_secs}s limit")]
    DurationTooLong {
        /// Requested seconds.
        secs: u64,
        /// Allowed ceiling in seconds.
        max_secs: u64,
    },

    /// The creator and the system author cannot be restricted.
    #[error("user {user_id} cannot be restricted")]
    ProtectedTarget {
        /// Rejected target.
        user_id: UserId,
    },
}

/// What an operation referenced but could not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A message.
    Message(MessageId),
    /// A viewer restriction.
    Restriction(UserId),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(id) => write!(f, "message {id}"),
            Self::Restriction(user_id) => write!(f, "restriction for user {user_id}"),
        }
    }
}

/// Errors from [`crate::ChatSession`] operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Send refused by the gate.
    #[error("send denied: {0}")]
    SendDenied(DenyReason),

    /// Non-moderator attempted a moderator action.
    #[error("{role:?} is not allowed to {action}")]
    Unauthorized {
        /// Action that was attempted.
        action: &'static str,
        /// Caller's role.
        role: Role,
    },

    /// Referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(Target),

    /// Session has ended; no further changes are accepted.
    #[error("session has ended")]
    SessionEnded,

    /// Session was created but not started yet.
    #[error("session has not started")]
    NotStarted,

    /// Invalid content or parameters.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
}

impl From<MessageNotFound> for SessionError {
    fn from(err: MessageNotFound) -> Self {
        Self::NotFound(Target::Message(err.0))
    }
}

impl From<DenyReason> for SessionError {
    fn from(reason: DenyReason) -> Self {
        Self::SendDenied(reason)
    }
}

/// Errors from [`crate::RoomDirectory`] operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// Room does not exist
    #[error("room not found: {0:032x}")]
    RoomNotFound(RoomId),

    /// A creator-only room is already running
    #[error("a creator-only room already exists")]
    CreatorOnlyExists,

    /// A general room is already live
    #[error("a general room is already active")]
    GeneralAlreadyActive,

    /// Title over the length limit
    #[error("title has {len} characters, limit is {max}")]
    TitleTooLong {
        /// Characters in the title.
        len: usize,
        /// Configured ceiling.
        max: usize,
    },

    /// Session-level failure
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deny_reasons_expose_countdown() {
        assert_eq!(DenyReason::Cooldown { remaining_secs: 60 }.remaining_secs(), Some(60));
        assert_eq!(
            DenyReason::Blocked { remaining_secs: 2843, reason: "spam".into() }.remaining_secs(),
            Some(2843)
        );
        assert_eq!(DenyReason::RoomPaused.remaining_secs(), None);
        assert_eq!(DenyReason::CreatorOnly.remaining_secs(), None);
    }

    #[test]
    fn messages_render_remaining_time() {
        let err = SessionError::SendDenied(DenyReason::Blocked {
            remaining_secs: 2843,
            reason: "inappropriate language".into(),
        });
        insta::assert_snapshot!(
            err.to_string(),
            @"send denied: blocked (inappropriate language), 47m 23s left"
        );
    }

    #[test]
    fn missing_message_converts_to_not_found() {
        let err: SessionError = MessageNotFound(MessageId::new(3)).into();
        assert_eq!(err, SessionError::NotFound(Target::Message(MessageId::new(3))));
    }
}
