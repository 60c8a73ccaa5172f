//! Send gate: room pause, slow mode, and per-viewer timed restrictions.
//!
//! Restrictions are deadline-based. A cooldown or block stores the instant it
//! expires; the remaining time is derived from the caller's `now`, so
//! querying never moves state and a countdown can never drift or go negative.
//! [`RestrictionState::tick`] only prunes entries whose deadline has passed
//! and is a no-op once they are gone.
//!
//! # State machine (per viewer)
//!
//! ```text
//! Allowed ──apply_cooldown──► Cooldown ──deadline──► Allowed
//! Allowed ──apply_block─────► Blocked  ──deadline──► Allowed
//! ```
//!
//! Cooldown and Blocked are mutually exclusive; applying either replaces the
//! other. Room pause is orthogonal and overrides every viewer except the
//! creator.

use std::{collections::HashMap, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    env::MonotonicInstant,
    error::DenyReason,
    message::{Role, UserId},
};

/// Longest cooldown or block. Longer requests are clamped here and rejected
/// by the session.
pub const MAX_RESTRICTION: Duration = Duration::from_secs(30 * 24 * 3600);

/// Longest slow mode interval. Send instants older than this are pruned.
pub const MAX_SLOW_MODE: Duration = Duration::from_secs(3600);

/// Kind of per-viewer restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestrictionKind {
    /// Short cooldown after e.g. flooding.
    Cooldown,
    /// Timed block placed by a moderator.
    Blocked {
        /// Reason shown to the blocked viewer.
        reason: String,
    },
}

/// Restriction category as shown to a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionType {
    /// Per-viewer cooldown.
    Cooldown,
    /// Per-viewer block.
    Blocked,
    /// Room-wide pause.
    Paused,
}

/// Restriction currently affecting a viewer, for a UI countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictionStatus {
    /// Restriction category.
    pub kind: RestrictionType,
    /// Whole seconds left, rounded up. Zero for a pause (no deadline).
    pub remaining_secs: u64,
    /// Reason, if one was given.
    pub reason: Option<String>,
    /// Restriction currently blocks sending.
    pub is_active: bool,
}

#[derive(Debug, Clone)]
struct ViewerRestriction<I> {
    kind: RestrictionKind,
    expires_at: I,
}

/// Room-level flags and per-viewer restrictions.
///
/// Generic over `I` (Instant type) to support virtual time in tests.
#[derive(Debug, Clone)]
pub struct RestrictionState<I> {
    /// Room-wide pause
    paused: bool,
    /// Minimum spacing between a fan's sends. Zero disables.
    slow_mode: Duration,
    /// Active cooldowns and blocks, at most one per viewer
    viewers: HashMap<UserId, ViewerRestriction<I>>,
    /// Last successful send per viewer (slow mode)
    last_send: HashMap<UserId, I>,
}

impl<I: MonotonicInstant> Default for RestrictionState<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MonotonicInstant> RestrictionState<I> {
    /// Create an unrestricted state.
    pub fn new() -> Self {
        Self {
            paused: false,
            slow_mode: Duration::ZERO,
            viewers: HashMap::new(),
            last_send: HashMap::new(),
        }
    }

    /// Put `viewer` in cooldown until `now + duration`, replacing any block.
    ///
    /// `duration` is clamped to [`MAX_RESTRICTION`].
    pub fn apply_cooldown(&mut self, viewer: UserId, duration: Duration, now: I) {
        self.viewers.insert(viewer, ViewerRestriction {
            kind: RestrictionKind::Cooldown,
            expires_at: now + duration.min(MAX_RESTRICTION),
        });
    }

    /// Block `viewer` until `now + duration`, replacing any earlier cooldown
    /// or block. Blocks never stack. `duration` is clamped to
    /// [`MAX_RESTRICTION`].
    pub fn apply_block(
        &mut self,
        viewer: UserId,
        duration: Duration,
        reason: impl Into<String>,
        now: I,
    ) {
        self.viewers.insert(viewer, ViewerRestriction {
            kind: RestrictionKind::Blocked { reason: reason.into() },
            expires_at: now + duration.min(MAX_RESTRICTION),
        });
    }

    /// Remove `viewer`'s restriction early. Returns the removed kind.
    ///
    /// `None` if nothing is active at `now`. An expired entry is left for
    /// [`Self::tick`] to release.
    pub fn lift(&mut self, viewer: UserId, now: I) -> Option<RestrictionKind> {
        self.active(viewer, now)?;
        self.viewers.remove(&viewer).map(|r| r.kind)
    }

    /// Pause the room for everyone but the creator.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume a paused room.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Room is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Set slow mode. `Duration::ZERO` disables it.
    ///
    /// Spacing is measured from each viewer's last send whenever it happened,
    /// so enabling or lengthening the interval applies to recent senders
    /// right away. `interval` is clamped to [`MAX_SLOW_MODE`].
    pub fn set_slow_mode(&mut self, interval: Duration) {
        self.slow_mode = interval.min(MAX_SLOW_MODE);
    }

    /// Slow mode interval. Zero when disabled.
    pub fn slow_mode(&self) -> Duration {
        self.slow_mode
    }

    /// Decide whether `viewer` may send at `now`.
    ///
    /// Pure. Order: creator always passes; then the viewer's own cooldown or
    /// block; then room pause; then slow mode (fans only).
    pub fn check(&self, viewer: UserId, role: Role, now: I) -> Result<(), DenyReason> {
        if role == Role::Creator {
            return Ok(());
        }

        if let Some(restriction) = self.active(viewer, now) {
            let remaining_secs = remaining_secs(restriction.expires_at, now);
            return Err(match &restriction.kind {
                RestrictionKind::Cooldown => DenyReason::Cooldown { remaining_secs },
                RestrictionKind::Blocked { reason } => {
                    DenyReason::Blocked { remaining_secs, reason: reason.clone() }
                },
            });
        }

        if self.paused {
            return Err(DenyReason::RoomPaused);
        }

        if role == Role::Fan
            && !self.slow_mode.is_zero()
            && let Some(&last) = self.last_send.get(&viewer)
        {
            let next_allowed = last + self.slow_mode;
            if now < next_allowed {
                let remaining_secs = remaining_secs(next_allowed, now);
                return Err(DenyReason::SlowMode { remaining_secs });
            }
        }

        Ok(())
    }

    /// Convenience form of [`Self::check`].
    pub fn can_send(&self, viewer: UserId, role: Role, now: I) -> bool {
        self.check(viewer, role, now).is_ok()
    }

    /// Record a successful send for slow mode, also while it is off.
    pub fn record_send(&mut self, viewer: UserId, now: I) {
        self.last_send.insert(viewer, now);
    }

    /// Prune restrictions whose deadline is at or before `now`.
    ///
    /// Returns the viewers released by this call. Calling it again with the
    /// same `now` returns nothing.
    pub fn tick(&mut self, now: I) -> Vec<(UserId, RestrictionKind)> {
        let expired: Vec<UserId> = self
            .viewers
            .iter()
            .filter(|(_, r)| r.expires_at <= now)
            .map(|(viewer, _)| *viewer)
            .collect();

        let mut lifted: Vec<(UserId, RestrictionKind)> = expired
            .into_iter()
            .filter_map(|viewer| self.viewers.remove(&viewer).map(|r| (viewer, r.kind)))
            .collect();
        lifted.sort_by_key(|(viewer, _)| *viewer);

        self.last_send.retain(|_, last| *last + MAX_SLOW_MODE > now);

        lifted
    }

    /// The viewer's own restriction, ignoring room pause. `None` if allowed.
    pub fn status_for(&self, viewer: UserId, now: I) -> Option<RestrictionStatus> {
        let restriction = self.active(viewer, now)?;
        let remaining_secs = remaining_secs(restriction.expires_at, now);

        Some(match &restriction.kind {
            RestrictionKind::Cooldown => RestrictionStatus {
                kind: RestrictionType::Cooldown,
                remaining_secs,
                reason: None,
                is_active: true,
            },
            RestrictionKind::Blocked { reason } => RestrictionStatus {
                kind: RestrictionType::Blocked,
                remaining_secs,
                reason: Some(reason.clone()),
                is_active: true,
            },
        })
    }

    /// Viewers with a live block at `now`.
    pub fn blocked_users(&self, now: I) -> impl Iterator<Item = UserId> + '_ {
        self.viewers
            .iter()
            .filter(move |(_, r)| {
                r.expires_at > now && matches!(r.kind, RestrictionKind::Blocked { .. })
            })
            .map(|(viewer, _)| *viewer)
    }

    fn active(&self, viewer: UserId, now: I) -> Option<&ViewerRestriction<I>> {
        self.viewers.get(&viewer).filter(|r| r.expires_at > now)
    }
}

/// Whole seconds from `now` until `deadline`, rounded up. Zero once passed.
pub fn remaining_secs<I: MonotonicInstant>(deadline: I, now: I) -> u64 {
    if deadline <= now {
        return 0;
    }
    let left = deadline - now;
    left.as_secs() + u64::from(left.subsec_nanos() > 0)
}

/// Human-readable countdown: `1h 2m 3s`, `2m 3s`, or `3s`.
pub fn format_remaining(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
