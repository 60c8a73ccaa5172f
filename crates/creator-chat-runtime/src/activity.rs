//! Inbound activity feeding a room.
//!
//! The runtime does not know whether events come from a live transport or a
//! simulation; both sit behind [`ActivitySource`]. [`MockActivity`] stands in
//! for a busy room with seeded random timers, [`ChannelActivity`] is the
//! boundary a real transport pushes into.

use std::{future::Future, time::Duration};

use creator_chat_core::{MembershipTier, Participant};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::{
    sync::mpsc,
    time::{Instant, Interval, MissedTickBehavior},
};

use crate::config::MockActivityConfig;

/// Canned fan chatter for the mock feed.
pub const CANNED_MESSAGES: [&str; 5] = [
    "So excited for this!",
    "When does it come out?",
    "Always rooting for you 💪",
    "Can't wait for the new content",
    "You got this! 👍",
];

/// Emoji the mock feed reacts with.
pub const CANNED_EMOJI: [&str; 4] = ["❤", "👍", "🔥", "😍"];

/// First user ID handed to mock fans.
pub const MOCK_FAN_BASE_ID: u64 = 10_000;

/// One inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEvent {
    /// Participants joined (positive) or left (negative).
    ParticipantDelta(i64),

    /// A viewer posted.
    InboundMessage {
        /// Who posted.
        author: Participant,
        /// Raw content, validated by the session.
        content: String,
    },

    /// A viewer toggled a reaction on the latest message.
    InboundReaction {
        /// Reacting viewer.
        viewer: u64,
        /// Emoji toggled.
        emoji: String,
    },
}

/// Stream of inbound events for one room.
///
/// `next_event` must be cancel-safe: the runtime polls it inside
/// `tokio::select!` and drops the future whenever another branch wins.
pub trait ActivitySource: Send + 'static {
    /// Wait for the next event. `None` means the source is exhausted and
    /// will not be polled again.
    fn next_event(&mut self) -> impl Future<Output = Option<ActivityEvent>> + Send;
}

/// Randomized feed simulating a live audience.
///
/// Every `presence_interval` the participant count drifts by up to
/// `max_participant_delta`; every `chatter_interval` a canned fan message
/// arrives with `message_probability`; every `reaction_interval` a fan
/// reacts with `reaction_probability`. Timers that fire together are served
/// in that order, so the same seed yields the same events.
pub struct MockActivity {
    rng: ChaCha8Rng,
    config: MockActivityConfig,
    presence: Interval,
    chatter: Interval,
    reactions: Interval,
}

impl MockActivity {
    /// Create a feed with default timing.
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, MockActivityConfig::default())
    }

    /// Create a feed with explicit timing.
    ///
    /// Timers start one period from now, so nothing fires on creation.
    ///
    /// # Panics
    ///
    /// Panics outside a tokio runtime with the time driver enabled.
    pub fn with_config(seed: u64, config: MockActivityConfig) -> Self {
        let now = Instant::now();
        let timer = |period: Duration| {
            let mut interval = tokio::time::interval_at(now + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        };
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            presence: timer(config.presence_interval),
            chatter: timer(config.chatter_interval),
            reactions: timer(config.reaction_interval),
            config,
        }
    }

    fn random_fan(&mut self) -> Participant {
        let n = self.rng.gen_range(0..1000u64);
        let tier =
            if self.rng.gen_bool(0.3) { MembershipTier::Premium } else { MembershipTier::Basic };
        Participant::fan(MOCK_FAN_BASE_ID + n, format!("fan{n}"), tier)
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[self.rng.gen_range(0..options.len())]
    }
}

impl ActivitySource for MockActivity {
    fn next_event(&mut self) -> impl Future<Output = Option<ActivityEvent>> + Send {
        async move {
            loop {
                tokio::select! {
                    biased;

                    _ = self.presence.tick() => {
                        let max = self.config.max_participant_delta;
                        let delta = self.rng.gen_range(-max..=max);
                        if delta != 0 {
                            return Some(ActivityEvent::ParticipantDelta(delta));
                        }
                    }
                    _ = self.chatter.tick() => {
                        if self.rng.gen_bool(self.config.message_probability.clamp(0.0, 1.0)) {
                            let author = self.random_fan();
                            let content = self.pick(&CANNED_MESSAGES).to_string();
                            return Some(ActivityEvent::InboundMessage { author, content });
                        }
                    }
                    _ = self.reactions.tick() => {
                        if self.rng.gen_bool(self.config.reaction_probability.clamp(0.0, 1.0)) {
                            let viewer = self.random_fan().id;
                            let emoji = self.pick(&CANNED_EMOJI).to_string();
                            return Some(ActivityEvent::InboundReaction { viewer, emoji });
                        }
                    }
                }
            }
        }
    }
}

/// Feed backed by a bounded channel.
///
/// A transport task owns the [`mpsc::Sender`]; when the channel is full the
/// transport waits, which is where backpressure lives. Dropping every sender
/// exhausts the source.
pub struct ChannelActivity {
    inbound: mpsc::Receiver<ActivityEvent>,
}

impl ChannelActivity {
    /// Create a source and the sender a transport pushes into.
    pub fn new(buffer: usize) -> (mpsc::Sender<ActivityEvent>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self { inbound: rx })
    }
}

impl ActivitySource for ChannelActivity {
    fn next_event(&mut self) -> impl Future<Output = Option<ActivityEvent>> + Send {
        self.inbound.recv()
    }
}
