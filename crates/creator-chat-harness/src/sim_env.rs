//! Simulation environment with a virtual clock and seeded RNG.
//!
//! Time only moves when the test says so ([`SimEnv::advance`] or an awaited
//! [`Environment::sleep`]), so countdowns can be checked second by second.
//! Clones share the clock and the RNG, the way every component of one
//! simulated room would share a single world.

use std::{
    ops::{Add, Sub},
    sync::{Arc, Mutex},
    time::Duration,
};

use creator_chat_core::env::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Wall clock at simulation start: 2025-07-22 00:00:00 UTC.
pub const SIM_EPOCH_SECS: u64 = 1_753_142_400;

/// Virtual instant: time elapsed since the simulation started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimInstant(Duration);

impl SimInstant {
    /// Time since simulation start.
    pub fn elapsed_since_start(self) -> Duration {
        self.0
    }
}

impl Add<Duration> for SimInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs)
    }
}

impl Sub for SimInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.0.saturating_sub(rhs.0)
    }
}

#[derive(Debug)]
struct SimState {
    now: SimInstant,
    rng: ChaCha8Rng,
}

/// Deterministic environment for simulation tests.
#[derive(Debug, Clone)]
pub struct SimEnv {
    state: Arc<Mutex<SimState>>,
}

impl SimEnv {
    /// Create an environment seeded with `0`.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Create an environment with an explicit RNG seed.
    pub fn with_seed(seed: u64) -> Self {
        let state = SimState { now: SimInstant::default(), rng: ChaCha8Rng::seed_from_u64(seed) };
        Self { state: Arc::new(Mutex::new(state)) }
    }

    /// Move the virtual clock forward.
    pub fn advance(&self, duration: Duration) {
        self.with_state(|s| s.now = s.now + duration);
    }

    /// Move the virtual clock forward by whole seconds.
    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    /// Time since simulation start.
    pub fn elapsed(&self) -> Duration {
        self.with_state(|s| s.now.elapsed_since_start())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut SimState) -> T) -> T {
        // A poisoned lock only means another test thread panicked mid-update;
        // the clock and RNG are still usable.
        let mut guard = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        self.with_state(|s| s.now)
    }

    fn wall_clock_secs(&self) -> u64 {
        SIM_EPOCH_SECS + self.elapsed().as_secs()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        self.advance(duration);
        std::future::ready(())
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.with_state(|s| s.rng.fill_bytes(buffer));
    }
}
