//! Environment abstraction for deterministic testing.
//!
//! Decouples session logic from system resources (time, randomness). Enables
//! deterministic simulation with a virtual clock and seeded RNG, and
//! production use with real system resources.

use std::{
    fmt::Debug,
    ops::{Add, Sub},
    time::Duration,
};

/// Monotonic instant usable as a restriction deadline.
///
/// Blanket-implemented for every type with the required arithmetic, so
/// `std::time::Instant`, `tokio::time::Instant` and virtual simulation
/// instants all qualify.
pub trait MonotonicInstant:
    Copy + Ord + Debug + Send + Sync + Sub<Output = Duration> + Add<Duration, Output = Self>
{
}

impl<T> MonotonicInstant for T where
    T: Copy + Ord + Debug + Send + Sync + Sub<Output = Duration> + Add<Duration, Output = T>
{
}

/// Abstract environment providing time, randomness, and async primitives.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `now()` never goes backwards
/// - Methods are infallible except in exceptional circumstances (e.g., OS
///   entropy exhaustion, incorrect simulation setup)
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type used by this environment.
    ///
    /// Production environments use a real monotonic clock, while simulation
    /// environments use virtual time that only moves when the test says so.
    type Instant: MonotonicInstant;

    /// Current time (monotonic).
    ///
    /// # Invariants
    ///
    /// - This method MUST return values that never decrease within a single
    ///   execution context.
    fn now(&self) -> Self::Instant;

    /// Seconds since the Unix epoch. Used for message timestamps only, never
    /// for deadlines.
    fn wall_clock_secs(&self) -> u64;

    /// Sleeps for the specified duration.
    ///
    /// This is the ONLY async method in the trait, and it should only be used
    /// by runtime code (not session logic).
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Given the same RNG seed, this produces the same sequence of bytes
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }

    /// Generates a random `u128`.
    ///
    /// Useful for room IDs.
    fn random_u128(&self) -> u128 {
        let mut bytes = [0u8; 16];
        self.random_bytes(&mut bytes);
        u128::from_be_bytes(bytes)
    }
}
