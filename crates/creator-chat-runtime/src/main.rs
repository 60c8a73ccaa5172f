//! Creator chat simulation binary.
//!
//! Runs one room fed by the mock activity feed and logs every session event.
//!
//! # Usage
//!
//! ```bash
//! # One minute of a busy general room
//! creator-chat-sim --duration 60
//!
//! # Reproducible run with slow mode on
//! creator-chat-sim --seed 42 --slow-mode 30 --log-level debug
//! ```

use std::time::Duration;

use clap::Parser;
use creator_chat_core::{ChatSession, Participant, Role, RoomKind, SessionConfig, env::Environment};
use creator_chat_runtime::{MockActivity, RoomRuntime, RuntimeConfig, SystemEnv};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Creator chat room simulator
#[derive(Parser, Debug)]
#[command(name = "creator-chat-sim")]
#[command(about = "Simulate a live creator chat room")]
#[command(version)]
struct Args {
    /// RNG seed for the activity feed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Seconds to run before the creator ends the session
    #[arg(short, long, default_value = "60")]
    duration: u64,

    /// Slow mode interval in seconds (0 = off)
    #[arg(long, default_value = "0")]
    slow_mode: u64,

    /// Channel name used for the default room title
    #[arg(long, default_value = "momorina")]
    channel: String,

    /// Run a creator-only room instead of a general one
    #[arg(long)]
    creator_only: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let env = SystemEnv::new();
    let seed = args.seed.unwrap_or_else(|| env.random_u64());
    let kind = if args.creator_only { RoomKind::CreatorOnly } else { RoomKind::General };
    let creator = Participant::creator(1, args.channel.clone());

    let mut session = ChatSession::new(
        env.clone(),
        env.random_u128(),
        kind,
        format!("{}'s live chat", args.channel),
        SessionConfig::default(),
    );
    session.start()?;
    session.send_message(&creator, "Welcome! Say hi 👋")?;
    if args.slow_mode > 0 {
        session.set_slow_mode(Role::Creator, args.slow_mode)?;
    }

    tracing::info!(seed, ?kind, duration = args.duration, "creator chat simulation starting");

    let (handle, room) =
        RoomRuntime::spawn(session, MockActivity::new(seed), RuntimeConfig::default());

    let mut events = handle.subscribe();
    let logger = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::info!(?event, "session event"),
                Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "event log fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    tokio::select! {
        () = tokio::time::sleep(Duration::from_secs(args.duration)) => {},
        _ = tokio::signal::ctrl_c() => tracing::info!("interrupted"),
    }

    handle.end_session(Role::Creator).await?;
    drop(handle);

    let session = room.await?;
    logger.await?;

    let stats = session.stats();
    tracing::info!(
        messages = stats.total_messages,
        deleted = stats.deleted_messages,
        blocked = stats.blocked_users,
        participants = stats.participant_count,
        "simulation finished"
    );

    Ok(())
}
