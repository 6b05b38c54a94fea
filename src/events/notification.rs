//! Notification types.
//!
//! Notifications are the core's only outbound surface: every observable
//! thing that happens during a turn is published as a `Notification` on
//! the [`NotificationBus`](super::NotificationBus). UI, statistics, and
//! persistence collaborators subscribe; the core never calls them
//! directly.
//!
//! Ordering is part of the contract: `PreRoll` always precedes any
//! `DieRolled`, which always precedes the `PostRoll` summary.

use serde::{Deserialize, Serialize};

use crate::rules::RuleKey;
use crate::turn::TurnPhase;

/// Identifier of a registered ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbilityId(pub u32);

impl AbilityId {
    /// Create a new ability ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for AbilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ability({})", self.0)
    }
}

/// Why a turn ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEndReason {
    /// The player banked their turn score.
    Banked,
    /// The hand busted and no rescue was possible.
    Busted,
}

/// A notification published by the core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    /// A roll is about to happen.
    PreRoll,
    /// One die changed value during a roll or reroll.
    DieRolled { index: usize, old: u8, new: u8 },
    /// Roll finished; full face list in index order, held dice included.
    PostRoll { values: Vec<u8> },
    /// A selected die became held.
    DieHeld { index: usize, value: u8 },
    /// A die was selected as a lock candidate.
    DieSelected { index: usize },
    /// A die was deselected.
    DieDeselected { index: usize },
    /// The turn state machine moved.
    StateChanged { from: TurnPhase, to: TurnPhase },
    /// A selection was locked for points.
    LockAdded { rule: RuleKey, points: i64 },
    /// The unheld dice score zero.
    Bust,
    /// A reroll turned a busted hand back into a scoring one.
    BustRescued,
    /// The turn score was banked.
    TurnBanked { total: i64 },
    /// The turn is over.
    TurnEnded { reason: TurnEndReason },
    /// Banked points were applied to a goal.
    GoalProgress {
        goal: usize,
        delta: i64,
        remaining: i64,
    },
    /// A goal's remaining target reached zero.
    GoalFulfilled { goal: usize },
    /// All mandatory goals are fulfilled.
    LevelComplete,
    /// The turn budget ran out with mandatory goals unfulfilled.
    LevelFailed,
    /// An ability resolved.
    AbilityExecuted { id: AbilityId },
    /// An ability started accumulating targets.
    TargetSelectionStarted { id: AbilityId },
    /// Target selection ended (executed or cancelled).
    TargetSelectionFinished { id: AbilityId },
}
