//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use std::collections::{BTreeMap, HashSet};

use creator_chat_core::RoomStatus;

use super::{Invariant, InvariantResult, SessionSnapshot, Violation};

/// Message IDs are unique and strictly increasing in store order.
pub struct UniqueMessageIds;

impl Invariant for UniqueMessageIds {
    fn name(&self) -> &'static str {
        "unique_message_ids"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        for window in state.messages.windows(2) {
            if window[1].id <= window[0].id {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("{} follows {} in store order", window[1].id, window[0].id),
                });
            }
        }
        Ok(())
    }
}

/// A message carries an original iff it was filtered.
///
/// Redaction stores the pre-filter text exactly once; a filtered message
/// without it, or an unfiltered one with it, means the redaction bookkeeping
/// broke.
pub struct FilteredKeepsOriginal;

impl Invariant for FilteredKeepsOriginal {
    fn name(&self) -> &'static str {
        "filtered_keeps_original"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        for msg in &state.messages {
            if msg.is_filtered != msg.original_content.is_some() {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "{}: is_filtered={} but original_content={:?}",
                        msg.id, msg.is_filtered, msg.original_content
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Every tally covers the viewers who hold that emoji, and no tally is zero.
///
/// Seeded history may carry counts with no recorded viewer, so the count can
/// exceed the ledger but never fall below it.
pub struct ReactionCountsCoverLedger;

impl Invariant for ReactionCountsCoverLedger {
    fn name(&self) -> &'static str {
        "reaction_counts_cover_ledger"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let mut holders: BTreeMap<_, u32> = BTreeMap::new();
        for ((message_id, _), emoji) in &state.reactions {
            *holders.entry((*message_id, emoji.as_str())).or_default() += 1;
        }

        for ((message_id, emoji), held) in holders {
            let Some(msg) = state.message(message_id) else {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("ledger references missing {message_id}"),
                });
            };
            let count = msg.reactions.get(emoji).copied().unwrap_or(0);
            if count < held {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("{message_id} {emoji}: count {count} < {held} active viewers"),
                });
            }
        }

        for msg in &state.messages {
            if let Some((emoji, _)) = msg.reactions.iter().find(|(_, count)| **count == 0) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("{}: zero tally kept for {emoji}", msg.id),
                });
            }
        }
        Ok(())
    }
}

/// `Ended` is terminal.
pub struct EndedIsTerminal;

impl Invariant for EndedIsTerminal {
    fn name(&self) -> &'static str {
        "ended_is_terminal"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        if let Some(pos) = state.status_history.iter().position(|s| *s == RoomStatus::Ended)
            && let Some(after) = state.status_history[pos + 1..].first()
        {
            return Err(Violation {
                invariant: self.name(),
                message: format!("status moved from Ended to {after:?}"),
            });
        }
        Ok(())
    }
}

/// Room pause flag matches the `Paused` status.
pub struct PauseMatchesStatus;

impl Invariant for PauseMatchesStatus {
    fn name(&self) -> &'static str {
        "pause_matches_status"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        // Ending a paused room keeps the flag; only live rooms must agree
        if state.status == RoomStatus::Ended {
            return Ok(());
        }
        if state.paused != (state.status == RoomStatus::Paused) {
            return Err(Violation {
                invariant: self.name(),
                message: format!("paused={} with status {:?}", state.paused, state.status),
            });
        }
        Ok(())
    }
}

/// Counters never undercount what is visible.
pub struct StatsCoverHistory;

impl Invariant for StatsCoverHistory {
    fn name(&self) -> &'static str {
        "stats_cover_history"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let visible = state.messages.len() as u64;
        if state.stats.total_messages < visible {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "total_messages {} < {visible} stored",
                    state.stats.total_messages
                ),
            });
        }

        let ids: HashSet<_> = state.messages.iter().map(|m| m.id).collect();
        if ids.len() != state.messages.len() {
            return Err(Violation {
                invariant: self.name(),
                message: "duplicate message IDs in history".to_string(),
            });
        }
        Ok(())
    }
}
