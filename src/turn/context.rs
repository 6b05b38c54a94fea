//! Turn-scoped bookkeeping.
//!
//! Everything here used to be ambient state in sprawling game objects;
//! collecting it in one owned struct makes the per-turn lifetime and the
//! latches explicit. The orchestrator resets it at turn boundaries.

use serde::{Deserialize, Serialize};

/// Scalars and latches that live for exactly one turn (plus the
/// level-complete latch, which lives until the next level starts).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TurnContext {
    /// Accumulated, unbanked score this turn.
    pub turn_score: i64,

    /// A lock happened since the last roll; gates the next roll.
    pub locked_since_roll: bool,

    /// Pending points were already drained for this turn's bust.
    /// Prevents a double drain when a forced end precedes next-turn.
    pub bust_resolved: bool,

    /// The bank cycle detected level completion; emit at turn end.
    pub level_complete_pending: bool,

    /// Level completion was already announced this level.
    pub level_complete_emitted: bool,

    /// Goals still to acknowledge during the bank handshake.
    pub bank_acks_outstanding: u32,
}

impl TurnContext {
    /// Reset the per-turn fields at a turn boundary.
    ///
    /// The level-complete latch survives; it resets with the level.
    pub fn reset_for_new_turn(&mut self) {
        self.turn_score = 0;
        self.locked_since_roll = false;
        self.bust_resolved = false;
        self.level_complete_pending = false;
        self.bank_acks_outstanding = 0;
    }

    /// Reset everything at a level boundary.
    pub fn reset_for_new_level(&mut self) {
        self.reset_for_new_turn();
        self.level_complete_emitted = false;
    }
}
