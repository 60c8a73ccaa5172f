//! Fuzz target for restriction countdowns.
//!
//! # Strategy
//!
//! - Arbitrary cooldowns and blocks for a handful of viewers
//! - Arbitrary clock steps, ticks, and early lifts in between
//!
//! # Invariants
//!
//! - Remaining time never increases without a new restriction
//! - A viewer is denied exactly while `remaining_secs > 0`
//! - `tick` releases each expired viewer once and is then a no-op

#![no_main]

use std::{collections::HashMap, time::Duration};

use arbitrary::Arbitrary;
use creator_chat_core::{RestrictionState, Role, env::Environment};
use creator_chat_harness::SimEnv;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum Step {
    Cooldown { viewer: u8, secs: u16 },
    Block { viewer: u8, secs: u16 },
    Lift { viewer: u8 },
    Advance { millis: u16 },
    Tick,
}

fuzz_target!(|steps: Vec<Step>| {
    let env = SimEnv::new();
    let mut state = RestrictionState::new();
    let mut last_remaining: HashMap<u64, u64> = HashMap::new();

    for step in steps.iter().take(512) {
        let now = env.now();
        match *step {
            Step::Cooldown { viewer, secs } if secs > 0 => {
                let viewer = u64::from(viewer % 4);
                state.apply_cooldown(viewer, Duration::from_secs(u64::from(secs)), now);
                last_remaining.insert(viewer, u64::from(secs));
            },
            Step::Block { viewer, secs } if secs > 0 => {
                let viewer = u64::from(viewer % 4);
                state.apply_block(viewer, Duration::from_secs(u64::from(secs)), "fuzz", now);
                last_remaining.insert(viewer, u64::from(secs));
            },
            Step::Lift { viewer } => {
                let viewer = u64::from(viewer % 4);
                state.lift(viewer, now);
                last_remaining.remove(&viewer);
            },
            Step::Advance { millis } => env.advance(Duration::from_millis(u64::from(millis))),
            Step::Tick => {
                let lifted = state.tick(now);
                for (viewer, _) in &lifted {
                    last_remaining.remove(viewer);
                }
                assert!(state.tick(now).is_empty(), "second tick released viewers again");
            },
            Step::Cooldown { .. } | Step::Block { .. } => {},
        }

        let now = env.now();
        for viewer in 0..4u64 {
            let remaining = state.status_for(viewer, now).map_or(0, |s| s.remaining_secs);
            if let Some(previous) = last_remaining.get(&viewer) {
                assert!(
                    remaining <= *previous,
                    "viewer {viewer}: {previous}s grew to {remaining}s"
                );
            }
            assert_eq!(state.can_send(viewer, Role::Fan, now), remaining == 0);
            if remaining > 0 {
                last_remaining.insert(viewer, remaining);
            }
        }
    }
});
