//! Creator chat runtime
//!
//! Async shell around the sans-IO session from `creator-chat-core`. A
//! [`RoomRuntime`] task owns one room, ticks its countdowns, feeds it from an
//! [`ActivitySource`], and serves [`RoomHandle`] commands. [`SystemEnv`]
//! supplies the tokio clock and OS randomness.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod activity;
pub mod config;
pub mod error;
pub mod runtime;
pub mod system_env;

pub use activity::{ActivityEvent, ActivitySource, ChannelActivity, MockActivity};
pub use config::{MockActivityConfig, RuntimeConfig};
pub use error::RuntimeError;
pub use runtime::{RoomHandle, RoomRuntime};
pub use system_env::SystemEnv;
