//! Room runtime actor.
//!
//! One tokio task owns a [`ChatSession`] and is the only place timers live.
//! It multiplexes three inputs:
//!
//! - a ticker that advances restriction countdowns
//! - the room's [`ActivitySource`]
//! - commands from [`RoomHandle`]s
//!
//! Every input is processed to completion before the next one is taken, so
//! the session never sees interleaved operations. Session events are
//! published on a broadcast channel after each step.
//!
//! The loop stops when the session ends, when every handle is dropped, or on
//! [`RoomHandle::shutdown`]. Stopping drops the ticker and the activity
//! source, which cancels all of their timers on every exit path.

use std::time::Duration;

use creator_chat_core::{
    ChatSession, MessageId, MessageView, Participant, ReactionChange, RestrictionStatus, Role,
    RoomStatus, SessionError, SessionEvent, SessionStats, UserId, env::Environment,
};
use tokio::{
    sync::{broadcast, mpsc, oneshot},
    task::JoinHandle,
    time::MissedTickBehavior,
};

use crate::{
    activity::{ActivityEvent, ActivitySource},
    config::RuntimeConfig,
    error::RuntimeError,
};

type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

/// Requests a [`RoomHandle`] sends to the room task.
#[derive(Debug)]
enum Command {
    Send { author: Participant, content: String, reply: Reply<MessageId> },
    Delete { role: Role, id: MessageId, reply: Reply<()> },
    Block {
        role: Role,
        user_id: UserId,
        user_name: String,
        duration: Option<Duration>,
        reply: Reply<usize>,
    },
    Unblock { role: Role, user_id: UserId, reply: Reply<()> },
    Cooldown { role: Role, viewer: UserId, duration: Duration, reply: Reply<()> },
    SlowMode { role: Role, seconds: u64, reply: Reply<()> },
    TogglePause { role: Role, reply: Reply<RoomStatus> },
    React { viewer: UserId, id: MessageId, emoji: String, reply: Reply<ReactionChange> },
    ClearHistory { role: Role, reply: Reply<()> },
    End { role: Role, reply: Reply<()> },
    View { viewer: UserId, role: Role, reply: oneshot::Sender<Vec<MessageView>> },
    Status { viewer: UserId, role: Role, reply: oneshot::Sender<Option<RestrictionStatus>> },
    Stats { reply: oneshot::Sender<(RoomStatus, SessionStats)> },
    Shutdown,
}

/// Owner of one room's session.
pub struct RoomRuntime<E: Environment, A: ActivitySource> {
    session: ChatSession<E>,
    activity: A,
    commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<SessionEvent>,
    config: RuntimeConfig,
}

impl<E: Environment, A: ActivitySource> RoomRuntime<E, A> {
    /// Spawn the room task.
    ///
    /// Returns a handle for issuing commands and the task's join handle,
    /// which yields the session once the loop stops.
    pub fn spawn(
        session: ChatSession<E>,
        activity: A,
        config: RuntimeConfig,
    ) -> (RoomHandle, JoinHandle<ChatSession<E>>) {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer.max(1));
        let (event_tx, _) = broadcast::channel(config.event_buffer.max(1));

        let handle = RoomHandle { commands: command_tx, events: event_tx.clone() };
        let runtime = Self { session, activity, commands: command_rx, events: event_tx, config };

        (handle, tokio::spawn(runtime.run()))
    }

    async fn run(mut self) -> ChatSession<E> {
        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + self.config.tick_interval,
            self.config.tick_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut activity_open = true;

        let room_id = self.session.room_id();
        tracing::debug!(room = %format_args!("{room_id:032x}"), "room runtime started");

        loop {
            let stop = tokio::select! {
                _ = ticker.tick() => {
                    self.session.tick();
                    false
                }
                event = self.activity.next_event(), if activity_open => {
                    match event {
                        Some(event) => self.apply_activity(event),
                        None => {
                            tracing::debug!("activity source exhausted");
                            activity_open = false;
                        },
                    }
                    false
                }
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => true,
                    Some(command) => {
                        self.handle_command(command);
                        false
                    },
                },
            };

            self.publish();

            if stop || self.session.status() == RoomStatus::Ended {
                break;
            }
        }

        tracing::info!(
            room = %format_args!("{:032x}", self.session.room_id()),
            status = ?self.session.status(),
            "room runtime stopped"
        );
        self.session
    }

    fn apply_activity(&mut self, event: ActivityEvent) {
        match event {
            ActivityEvent::ParticipantDelta(delta) => {
                let _ = self.session.update_participants(delta);
            },
            ActivityEvent::InboundMessage { author, content } => {
                if let Err(e) = self.session.receive_message(&author, &content) {
                    tracing::debug!(author = author.id, "inbound message rejected: {e}");
                }
            },
            ActivityEvent::InboundReaction { viewer, emoji } => {
                let Some(id) = self.session.messages().last().map(|m| m.id()) else {
                    return;
                };
                if let Err(e) = self.session.toggle_reaction(viewer, id, &emoji) {
                    tracing::debug!(viewer, %id, "inbound reaction rejected: {e}");
                }
            },
        }
    }

    fn handle_command(&mut self, command: Command) {
        let s = &mut self.session;
        // A dropped reply receiver means the caller gave up; the operation
        // still took effect.
        match command {
            Command::Send { author, content, reply } => {
                let _ = reply.send(s.send_message(&author, &content));
            },
            Command::Delete { role, id, reply } => {
                let _ = reply.send(s.delete_message(role, id));
            },
            Command::Block { role, user_id, user_name, duration, reply } => {
                let _ = reply.send(s.block_user(role, user_id, &user_name, duration));
            },
            Command::Unblock { role, user_id, reply } => {
                let _ = reply.send(s.unblock_user(role, user_id));
            },
            Command::Cooldown { role, viewer, duration, reply } => {
                let _ = reply.send(s.apply_cooldown(role, viewer, duration));
            },
            Command::SlowMode { role, seconds, reply } => {
                let _ = reply.send(s.set_slow_mode(role, seconds));
            },
            Command::TogglePause { role, reply } => {
                let _ = reply.send(s.toggle_pause(role));
            },
            Command::React { viewer, id, emoji, reply } => {
                let _ = reply.send(s.toggle_reaction(viewer, id, &emoji));
            },
            Command::ClearHistory { role, reply } => {
                let _ = reply.send(s.clear_history(role));
            },
            Command::End { role, reply } => {
                let _ = reply.send(s.end_session(role));
            },
            Command::View { viewer, role, reply } => {
                let _ = reply.send(s.view(viewer, role));
            },
            Command::Status { viewer, role, reply } => {
                let _ = reply.send(s.restriction_status(viewer, role));
            },
            Command::Stats { reply } => {
                let _ = reply.send((s.status(), s.stats()));
            },
            Command::Shutdown => {},
        }
    }

    fn publish(&mut self) {
        for event in self.session.take_events() {
            // No subscribers is fine
            let _ = self.events.send(event);
        }
    }
}

/// Cloneable handle to a running room.
///
/// Every call fails with [`RuntimeError::RoomClosed`] once the room task
/// has stopped.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<SessionEvent>,
}

impl RoomHandle {
    /// Subscribe to session events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Post a message.
    pub async fn send_message(
        &self,
        author: Participant,
        content: impl Into<String>,
    ) -> Result<MessageId, RuntimeError> {
        let content = content.into();
        Ok(self.request(|reply| Command::Send { author, content, reply }).await??)
    }

    /// Delete a message.
    pub async fn delete_message(&self, role: Role, id: MessageId) -> Result<(), RuntimeError> {
        Ok(self.request(|reply| Command::Delete { role, id, reply }).await??)
    }

    /// Block a user. Returns how many messages were redacted.
    pub async fn block_user(
        &self,
        role: Role,
        user_id: UserId,
        user_name: impl Into<String>,
        duration: Option<Duration>,
    ) -> Result<usize, RuntimeError> {
        let user_name = user_name.into();
        Ok(self
            .request(|reply| Command::Block { role, user_id, user_name, duration, reply })
            .await??)
    }

    /// Lift a restriction early.
    pub async fn unblock_user(&self, role: Role, user_id: UserId) -> Result<(), RuntimeError> {
        Ok(self.request(|reply| Command::Unblock { role, user_id, reply }).await??)
    }

    /// Put a viewer in cooldown.
    pub async fn apply_cooldown(
        &self,
        role: Role,
        viewer: UserId,
        duration: Duration,
    ) -> Result<(), RuntimeError> {
        Ok(self.request(|reply| Command::Cooldown { role, viewer, duration, reply }).await??)
    }

    /// Set slow mode. Zero turns it off.
    pub async fn set_slow_mode(&self, role: Role, seconds: u64) -> Result<(), RuntimeError> {
        Ok(self.request(|reply| Command::SlowMode { role, seconds, reply }).await??)
    }

    /// Flip pause. Returns the new status.
    pub async fn toggle_pause(&self, role: Role) -> Result<RoomStatus, RuntimeError> {
        Ok(self.request(|reply| Command::TogglePause { role, reply }).await??)
    }

    /// Toggle a reaction.
    pub async fn toggle_reaction(
        &self,
        viewer: UserId,
        id: MessageId,
        emoji: impl Into<String>,
    ) -> Result<ReactionChange, RuntimeError> {
        let emoji = emoji.into();
        Ok(self.request(|reply| Command::React { viewer, id, emoji, reply }).await??)
    }

    /// Drop all history.
    pub async fn clear_history(&self, role: Role) -> Result<(), RuntimeError> {
        Ok(self.request(|reply| Command::ClearHistory { role, reply }).await??)
    }

    /// End the session. The room task stops right after.
    pub async fn end_session(&self, role: Role) -> Result<(), RuntimeError> {
        Ok(self.request(|reply| Command::End { role, reply }).await??)
    }

    /// Messages as `viewer` sees them.
    pub async fn view(&self, viewer: UserId, role: Role) -> Result<Vec<MessageView>, RuntimeError> {
        self.request(|reply| Command::View { viewer, role, reply }).await
    }

    /// What keeps `viewer` from sending, if anything.
    pub async fn restriction_status(
        &self,
        viewer: UserId,
        role: Role,
    ) -> Result<Option<RestrictionStatus>, RuntimeError> {
        self.request(|reply| Command::Status { viewer, role, reply }).await
    }

    /// Room status and counters.
    pub async fn stats(&self) -> Result<(RoomStatus, SessionStats), RuntimeError> {
        self.request(|reply| Command::Stats { reply }).await
    }

    /// Stop the room task without ending the session.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.commands.send(Command::Shutdown).await.map_err(|_| RuntimeError::RoomClosed)
    }

    /// Room task has stopped.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(make(tx)).await.map_err(|_| RuntimeError::RoomClosed)?;
        rx.await.map_err(|_| RuntimeError::RoomClosed)
    }
}
