//! Room runtime behavior on tokio's paused clock.
//!
//! `start_paused` makes the runtime auto-advance virtual time whenever every
//! task is idle, so hour-long blocks run instantly and deterministically.

use std::time::Duration;

use creator_chat_core::{
    ChatSession, DenyReason, InputError, MembershipTier, Participant, RestrictionType, Role,
    RoomKind, RoomStatus, SessionConfig, SessionError, SessionEvent,
};
use creator_chat_runtime::{
    ActivityEvent, ChannelActivity, MockActivity, RoomHandle, RoomRuntime, RuntimeConfig,
    RuntimeError, SystemEnv,
};
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};

fn kane() -> Participant {
    Participant::fan(100, "kane", MembershipTier::Basic)
}

fn session(kind: RoomKind) -> ChatSession<SystemEnv> {
    let mut session =
        ChatSession::new(SystemEnv::new(), 1, kind, "live chat", SessionConfig::default());
    session.start().unwrap();
    session
}

fn spawn_with_channel(
    kind: RoomKind,
) -> (RoomHandle, JoinHandle<ChatSession<SystemEnv>>, mpsc::Sender<ActivityEvent>) {
    let (inbound, activity) = ChannelActivity::new(16);
    let (handle, task) = RoomRuntime::spawn(session(kind), activity, RuntimeConfig::default());
    (handle, task, inbound)
}

async fn next_matching(
    events: &mut broadcast::Receiver<SessionEvent>,
    pred: impl Fn(&SessionEvent) -> bool,
) -> SessionEvent {
    loop {
        let event = events.recv().await.unwrap();
        if pred(&event) {
            return event;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn block_counts_down_and_lifts() {
    let (handle, _task, _inbound) = spawn_with_channel(RoomKind::General);
    let mut events = handle.subscribe();
    let fan = kane();

    handle.send_message(fan.clone(), "hello").await.unwrap();
    let hour = Some(Duration::from_secs(3600));
    handle.block_user(Role::Moderator, fan.id, "kane", hour).await.unwrap();

    let err = handle.send_message(fan.clone(), "again").await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Session(SessionError::SendDenied(DenyReason::Blocked {
            remaining_secs: 3600,
            ..
        }))
    ));

    tokio::time::sleep(Duration::from_secs(1800)).await;
    let status = handle.restriction_status(fan.id, Role::Fan).await.unwrap().unwrap();
    assert_eq!(status.kind, RestrictionType::Blocked);
    assert_eq!(status.remaining_secs, 1800);

    let lifted =
        next_matching(&mut events, |e| matches!(e, SessionEvent::RestrictionLifted { .. })).await;
    assert_eq!(lifted, SessionEvent::RestrictionLifted { user_id: fan.id });
    assert!(handle.send_message(fan, "I'm back").await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn ending_stops_the_room_task() {
    let (handle, task, _inbound) = spawn_with_channel(RoomKind::General);
    handle.send_message(kane(), "bye").await.unwrap();

    handle.end_session(Role::Creator).await.unwrap();
    let session = task.await.unwrap();

    assert_eq!(session.status(), RoomStatus::Ended);
    assert_eq!(handle.send_message(kane(), "anyone?").await, Err(RuntimeError::RoomClosed));
    assert!(handle.is_closed());
}

#[tokio::test(start_paused = true)]
async fn dropping_handles_stops_the_room_task() {
    let (handle, task, _inbound) = spawn_with_channel(RoomKind::General);
    let second = handle.clone();
    drop(handle);
    assert_eq!(second.stats().await.unwrap().0, RoomStatus::Active);
    drop(second);

    let session = task.await.unwrap();
    assert_eq!(session.status(), RoomStatus::Active);
}

#[tokio::test(start_paused = true)]
async fn shutdown_keeps_session_live() {
    let (handle, task, _inbound) = spawn_with_channel(RoomKind::General);
    handle.shutdown().await.unwrap();

    let session = task.await.unwrap();
    assert_eq!(session.status(), RoomStatus::Active);
    assert_eq!(handle.stats().await, Err(RuntimeError::RoomClosed));
}

#[tokio::test(start_paused = true)]
async fn inbound_activity_reaches_session() {
    let (handle, _task, inbound) = spawn_with_channel(RoomKind::General);
    let mut events = handle.subscribe();

    inbound.send(ActivityEvent::ParticipantDelta(5)).await.unwrap();
    inbound
        .send(ActivityEvent::InboundMessage { author: kane(), content: "hi from the feed".into() })
        .await
        .unwrap();
    inbound.send(ActivityEvent::InboundReaction { viewer: 7, emoji: "🔥".into() }).await.unwrap();

    next_matching(&mut events, |e| matches!(e, SessionEvent::ReactionChanged { .. })).await;

    let (_, stats) = handle.stats().await.unwrap();
    assert_eq!(stats.participant_count, 5);
    let view = handle.view(7, Role::Fan).await.unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].content, "hi from the feed");
    assert_eq!(view[0].viewer_reaction.as_deref(), Some("🔥"));
}

#[tokio::test(start_paused = true)]
async fn inbound_messages_respect_moderation() {
    let (handle, _task, inbound) = spawn_with_channel(RoomKind::General);
    handle.toggle_pause(Role::Creator).await.unwrap();

    let message = ActivityEvent::InboundMessage { author: kane(), content: "let me in".into() };
    inbound.send(message).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    let view = handle.view(1, Role::Creator).await.unwrap();
    assert!(view.iter().all(|m| m.content != "let me in"));
}

#[tokio::test(start_paused = true)]
async fn closed_activity_source_keeps_room_running() {
    let (handle, _task, inbound) = spawn_with_channel(RoomKind::General);
    drop(inbound);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(handle.send_message(kane(), "still here").await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn mock_feed_drives_a_creator_only_room() {
    let (handle, task) = RoomRuntime::spawn(
        session(RoomKind::CreatorOnly),
        MockActivity::new(9),
        RuntimeConfig::default(),
    );
    let creator = Participant::creator(1, "momorina");
    handle.send_message(creator, "new content next Friday").await.unwrap();

    tokio::time::sleep(Duration::from_secs(120)).await;
    handle.end_session(Role::Creator).await.unwrap();
    let session = task.await.unwrap();

    // Fans cannot post here; only the creator's message survives
    assert_eq!(session.messages().len(), 1);
    assert_eq!(session.stats().total_messages, 1);
}

#[tokio::test(start_paused = true)]
async fn oversized_block_leaves_room_running() {
    let (handle, _task, _inbound) = spawn_with_channel(RoomKind::General);
    let fan = kane();
    tokio::time::sleep(Duration::from_secs(1)).await;

    let forever = Some(Duration::from_secs(u64::MAX));
    let err = handle.block_user(Role::Creator, fan.id, "kane", forever).await;
    assert!(matches!(
        err,
        Err(RuntimeError::Session(SessionError::InvalidInput(InputError::DurationTooLong { .. })))
    ));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(handle.send_message(fan.clone(), "still here").await.is_ok());
    assert_eq!(handle.restriction_status(fan.id, Role::Fan).await.unwrap(), None);
}
