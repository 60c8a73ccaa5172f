//! Operations for model-based testing.
//!
//! Operations represent every action a UI, moderator, or activity feed can
//! take on one room. They are generated by proptest or libfuzzer and applied
//! to a [`crate::SimSession`].

use arbitrary::Arbitrary;

/// Participant slot. Slot 0 is the creator, slot 1 a moderator, the rest
/// are fans.
pub type Slot = u8;

/// Message selector, resolved against the current history.
pub type MessagePick = u8;

/// Message content kept small so generated cases stay readable.
#[derive(Debug, Clone, Copy, Arbitrary)]
pub enum SmallContent {
    /// A short word, repeated `n % 8 + 1` times.
    Words(u8),
    /// Whitespace only.
    Blank,
    /// One character over the limit.
    Oversized,
}

impl SmallContent {
    /// Render into the text that gets sent.
    pub fn render(self, max_chars: usize) -> String {
        match self {
            Self::Words(n) => vec!["hello"; usize::from(n % 8) + 1].join(" "),
            Self::Blank => "   ".to_string(),
            Self::Oversized => "a".repeat(max_chars + 1),
        }
    }
}

/// Operations that can be applied to a session.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Participant posts a message.
    Send {
        /// Author.
        author: Slot,
        /// Content.
        content: SmallContent,
    },

    /// Moderator action: replace a message with the removal placeholder.
    Delete {
        /// Acting participant.
        actor: Slot,
        /// Target message.
        message: MessagePick,
    },

    /// Moderator action: timed block plus mass redaction.
    Block {
        /// Acting participant.
        actor: Slot,
        /// Blocked participant.
        target: Slot,
        /// Block length in seconds. Zero means the default.
        secs: u16,
    },

    /// Moderator action: lift a restriction early.
    Unblock {
        /// Acting participant.
        actor: Slot,
        /// Released participant.
        target: Slot,
    },

    /// Moderator action: short cooldown.
    Cooldown {
        /// Acting participant.
        actor: Slot,
        /// Cooled-down participant.
        target: Slot,
        /// Cooldown length in seconds.
        secs: u8,
    },

    /// Moderator action: change slow mode.
    SlowMode {
        /// Acting participant.
        actor: Slot,
        /// Interval in seconds. Zero turns it off.
        secs: u8,
    },

    /// Moderator action: flip pause.
    TogglePause {
        /// Acting participant.
        actor: Slot,
    },

    /// Viewer toggles a reaction.
    React {
        /// Reacting participant.
        viewer: Slot,
        /// Target message.
        message: MessagePick,
        /// Emoji selector.
        emoji: u8,
    },

    /// Presence drift from the activity feed.
    Participants {
        /// Signed change.
        delta: i8,
    },

    /// Moderator action: drop all history.
    ClearHistory {
        /// Acting participant.
        actor: Slot,
    },

    /// Advance simulation time.
    AdvanceTime {
        /// Milliseconds to advance.
        millis: u16,
    },

    /// Runtime tick.
    Tick,

    /// Moderator action: end the session.
    End {
        /// Acting participant.
        actor: Slot,
    },
}
