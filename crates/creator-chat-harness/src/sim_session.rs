//! Simulation driver for one chat room.
//!
//! [`SimSession`] owns a [`ChatSession`] over a [`SimEnv`], maps generated
//! [`Operation`]s onto session calls, and keeps the status history that the
//! invariant snapshot needs.

use std::time::Duration;

use creator_chat_core::{
    ChatSession, MembershipTier, MessageDraft, MessageId, Participant, ReactionChange, RoomKind,
    RoomStatus, SessionConfig, SessionError, SessionEvent,
};

use crate::{
    invariants::SessionSnapshot,
    operation::{MessagePick, Operation, Slot},
    sim_env::SimEnv,
};

/// Number of distinct participants operations can address.
pub const PARTICIPANT_SLOTS: u8 = 6;

/// Emoji palette reactions are picked from.
pub const EMOJI: [&str; 4] = ["❤", "👍", "🔥", "😍"];

/// Creator's user ID.
pub const CREATOR_ID: u64 = 1;

/// Moderator's user ID.
pub const MODERATOR_ID: u64 = 2;

/// Simulated room driven by generated operations.
pub struct SimSession {
    env: SimEnv,
    session: ChatSession<SimEnv>,
    status_history: Vec<RoomStatus>,
    events: Vec<SessionEvent>,
}

impl SimSession {
    /// Create a live general room seeded with a little history.
    pub fn new(seed: u64) -> Self {
        Self::with_kind(seed, RoomKind::General)
    }

    /// Create a live room of `kind` seeded with a little history.
    pub fn with_kind(seed: u64, kind: RoomKind) -> Self {
        let env = SimEnv::with_seed(seed);
        let session = ChatSession::new(env.clone(), 1, kind, "sim room", SessionConfig::default());
        let mut sim =
            Self { env, session, status_history: vec![RoomStatus::Created], events: Vec::new() };

        let creator = Self::participant(0);
        let fan = Self::participant(2);
        let seeded = [
            MessageDraft::from_participant(&creator, "welcome to the live chat")
                .with_reaction("❤", 45),
            MessageDraft::from_participant(&fan, "hello").with_reaction("👍", 12),
            MessageDraft::from_participant(&fan, "rude words").filtered("***"),
        ];
        for draft in seeded {
            let _ = sim.session.seed(draft);
        }
        let _ = sim.session.start();
        sim.collect_events();
        sim
    }

    /// Participant behind a slot.
    pub fn participant(slot: Slot) -> Participant {
        match slot % PARTICIPANT_SLOTS {
            0 => Participant::creator(CREATOR_ID, "momorina"),
            1 => Participant::moderator(MODERATOR_ID, "mod"),
            n => {
                let tier = match n % 3 {
                    0 => MembershipTier::Basic,
                    1 => MembershipTier::Premium,
                    _ => MembershipTier::Vip,
                };
                Participant::fan(100 + u64::from(n), format!("fan{n}"), tier)
            },
        }
    }

    /// Apply one operation.
    ///
    /// Returns the session's verdict; rejected operations are part of the
    /// model, not a harness failure.
    pub fn apply(&mut self, op: &Operation) -> Result<(), SessionError> {
        let result = self.dispatch(op);
        tracing::trace!(?op, ?result, "applied");
        self.collect_events();
        result
    }

    fn dispatch(&mut self, op: &Operation) -> Result<(), SessionError> {
        match *op {
            Operation::Send { author, content } => {
                let author = Self::participant(author);
                let text = content.render(self.session.config().max_message_chars);
                self.session.send_message(&author, &text).map(drop)
            },
            Operation::Delete { actor, message } => {
                let id = self.pick_message(message);
                self.session.delete_message(Self::participant(actor).role, id)
            },
            Operation::Block { actor, target, secs } => {
                let target = Self::participant(target);
                let duration = (secs > 0).then(|| Duration::from_secs(u64::from(secs)));
                self.session
                    .block_user(Self::participant(actor).role, target.id, &target.name, duration)
                    .map(drop)
            },
            Operation::Unblock { actor, target } => {
                let target = Self::participant(target).id;
                self.session.unblock_user(Self::participant(actor).role, target)
            },
            Operation::Cooldown { actor, target, secs } => self.session.apply_cooldown(
                Self::participant(actor).role,
                Self::participant(target).id,
                Duration::from_secs(u64::from(secs)),
            ),
            Operation::SlowMode { actor, secs } => {
                self.session.set_slow_mode(Self::participant(actor).role, u64::from(secs))
            },
            Operation::TogglePause { actor } => {
                self.session.toggle_pause(Self::participant(actor).role).map(drop)
            },
            Operation::React { viewer, message, emoji } => {
                let id = self.pick_message(message);
                let emoji = EMOJI[usize::from(emoji) % EMOJI.len()];
                self.session.toggle_reaction(Self::participant(viewer).id, id, emoji).map(drop)
            },
            Operation::Participants { delta } => {
                self.session.update_participants(i64::from(delta)).map(drop)
            },
            Operation::ClearHistory { actor } => {
                self.session.clear_history(Self::participant(actor).role)
            },
            Operation::AdvanceTime { millis } => {
                self.env.advance(Duration::from_millis(u64::from(millis)));
                Ok(())
            },
            Operation::Tick => {
                self.session.tick();
                Ok(())
            },
            Operation::End { actor } => self.session.end_session(Self::participant(actor).role),
        }
    }

    /// Resolve a selector to a message ID. Out-of-range picks produce an ID
    /// that does not exist, to exercise the not-found paths.
    fn pick_message(&self, pick: MessagePick) -> MessageId {
        let messages = self.session.messages();
        let index = usize::from(pick);
        if index < messages.len() * 2
            && let Some(message) = messages.iter().nth(index % messages.len())
        {
            return message.id();
        }
        MessageId::new(u64::MAX - u64::from(pick))
    }

    fn collect_events(&mut self) {
        for event in self.session.take_events() {
            if let SessionEvent::StatusChanged { to, .. } = event {
                self.status_history.push(to);
            }
            self.events.push(event);
        }
    }

    /// Snapshot for invariant checks.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&self.session, &self.status_history)
    }

    /// Toggle a reaction and return the change.
    pub fn react(
        &mut self,
        viewer: Slot,
        id: MessageId,
        emoji: &str,
    ) -> Result<ReactionChange, SessionError> {
        let result = self.session.toggle_reaction(Self::participant(viewer).id, id, emoji);
        self.collect_events();
        result
    }

    /// The simulated session.
    pub fn session(&self) -> &ChatSession<SimEnv> {
        &self.session
    }

    /// The simulated session, mutable.
    pub fn session_mut(&mut self) -> &mut ChatSession<SimEnv> {
        &mut self.session
    }

    /// The simulation environment.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }

    /// Every event observed so far.
    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }
}
