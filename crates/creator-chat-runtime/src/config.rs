//! Runtime and mock activity configuration.

use std::time::Duration;

/// Room runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Countdown tick period.
    pub tick_interval: Duration,
    /// Pending commands before `RoomHandle` calls wait.
    pub command_buffer: usize,
    /// Session events kept for slow subscribers before they lag.
    pub event_buffer: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { tick_interval: Duration::from_secs(1), command_buffer: 64, event_buffer: 256 }
    }
}

/// Randomized live-activity feed configuration.
#[derive(Debug, Clone)]
pub struct MockActivityConfig {
    /// Period of participant drift.
    pub presence_interval: Duration,
    /// Largest drift per period, in either direction.
    pub max_participant_delta: i64,
    /// Period of inbound chatter.
    pub chatter_interval: Duration,
    /// Chance that a chatter period produces a message.
    pub message_probability: f64,
    /// Period of reaction bursts.
    pub reaction_interval: Duration,
    /// Chance that a reaction period produces a reaction.
    pub reaction_probability: f64,
}

impl Default for MockActivityConfig {
    fn default() -> Self {
        Self {
            presence_interval: Duration::from_secs(5),
            max_participant_delta: 2,
            chatter_interval: Duration::from_secs(8),
            message_probability: 0.3,
            reaction_interval: Duration::from_secs(3),
            reaction_probability: 0.3,
        }
    }
}
