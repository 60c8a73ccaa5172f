//! Runtime error types.

use creator_chat_core::SessionError;
use thiserror::Error;

/// Errors from [`crate::RoomHandle`] calls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The session rejected the operation.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// The room task has stopped (session ended or runtime shut down).
    #[error("room runtime is no longer running")]
    RoomClosed,
}
