//! Turn state machine.
//!
//! Exactly one phase is active at a time and the transition table is
//! fixed. Anything not in the table is rejected without mutation; the
//! orchestrator turns the rejection into a user-facing denial.
//!
//! The SelectingTarget excursion remembers the play phase it interrupted
//! in an `Option<TurnPhase>` and restores it on exit. A rescue overrides
//! the restore target (Busted comes back as Rolling).

use serde::{Deserialize, Serialize};

use crate::error::{ActionError, ActionResult};
use crate::events::Notification;

/// The phases a turn moves through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Turn has not started; first roll pending.
    PreRoll,
    /// Dice are live; lock/bank/roll decisions happen here.
    Rolling,
    /// The unheld dice score zero; waiting for rescue or next-turn.
    Busted,
    /// Turn score committed; waiting for next-turn.
    Banked,
    /// An ability is accumulating targets.
    SelectingTarget,
    /// Between levels; shop collaborator is in control.
    InShop,
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TurnPhase::PreRoll => "pre-roll",
            TurnPhase::Rolling => "rolling",
            TurnPhase::Busted => "busted",
            TurnPhase::Banked => "banked",
            TurnPhase::SelectingTarget => "selecting-target",
            TurnPhase::InShop => "in-shop",
        };
        f.write_str(name)
    }
}

/// Holder of the active phase and the saved prior phase during a
/// targeting excursion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TurnStateMachine {
    phase: TurnPhase,
    prior: Option<TurnPhase>,
}

impl Default for TurnStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnStateMachine {
    /// Start at pre-roll.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: TurnPhase::PreRoll,
            prior: None,
        }
    }

    /// The active phase.
    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// The phase a targeting excursion will restore to, if one is open.
    #[must_use]
    pub fn saved_prior(&self) -> Option<TurnPhase> {
        self.prior
    }

    /// Whether `from -> to` is in the fixed transition table.
    #[must_use]
    pub fn is_legal(from: TurnPhase, to: TurnPhase) -> bool {
        use TurnPhase::*;
        matches!(
            (from, to),
            (PreRoll, Rolling)
                | (Rolling, Busted)
                | (Rolling, Banked)
                | (Rolling, SelectingTarget)
                | (SelectingTarget, Rolling)
                | (Busted, SelectingTarget)
                | (SelectingTarget, Busted)
                | (Busted, PreRoll)
                | (Banked, PreRoll)
                | (PreRoll, InShop)
                | (Banked, InShop)
                | (Busted, InShop)
                | (InShop, PreRoll)
        )
    }

    /// Move to `to`, returning the state-change notification to publish.
    ///
    /// Denied (no mutation) if the table has no such transition.
    pub fn transition(&mut self, to: TurnPhase, intent: &'static str) -> ActionResult<Notification> {
        if !Self::is_legal(self.phase, to) {
            return Err(ActionError::NotAllowed {
                intent,
                phase: self.phase,
            });
        }
        let from = self.phase;
        self.phase = to;
        log::debug!("turn state: {} -> {}", from, to);
        Ok(Notification::StateChanged { from, to })
    }

    /// Enter SelectingTarget, remembering the interrupted play phase.
    pub fn enter_targeting(&mut self, intent: &'static str) -> ActionResult<Notification> {
        let prior = self.phase;
        let note = self.transition(TurnPhase::SelectingTarget, intent)?;
        self.prior = Some(prior);
        Ok(note)
    }

    /// Leave SelectingTarget, restoring the saved phase.
    ///
    /// `rescued` restores Busted as Rolling; otherwise the interrupted
    /// phase comes back unchanged.
    pub fn exit_targeting(&mut self, rescued: bool, intent: &'static str) -> ActionResult<Notification> {
        let Some(prior) = self.prior else {
            return Err(ActionError::NotSelectingTargets);
        };
        let restore = if rescued { TurnPhase::Rolling } else { prior };
        let note = self.transition(restore, intent)?;
        self.prior = None;
        Ok(note)
    }
}
