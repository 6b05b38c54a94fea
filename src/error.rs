//! Error types for action denial.
//!
//! Every inbound intent returns `Result<_, ActionError>`. A denial is
//! always recoverable: the message is meant for the player, and the core
//! guarantees no state mutation happened on the denied path.

use thiserror::Error;

use crate::turn::TurnPhase;

/// Why an intent was refused.
///
/// These are user-facing messages, not programming errors. Invariant
/// violations (a die claimed twice, negative remaining) must never occur
/// and are covered by tests, not by this type.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ActionError {
    #[error("{intent} is not allowed while {phase}")]
    NotAllowed {
        intent: &'static str,
        phase: TurnPhase,
    },

    #[error("lock a scoring combo before rolling again")]
    RollRequiresLock,

    #[error("no dice are selected")]
    NothingSelected,

    #[error("the selected dice do not score")]
    SelectionNotScoring,

    #[error("the selected dice are not a single combo")]
    AmbiguousSelection,

    #[error("there is nothing to bank")]
    NothingToBank,

    #[error("resolve the selected dice before banking")]
    SelectionOutstanding,

    #[error("no charges remaining")]
    NoCharges,

    #[error("no such ability")]
    UnknownAbility,

    #[error("no ability is selecting targets")]
    NotSelectingTargets,

    #[error("held dice cannot be rerolled")]
    TargetNotRerollable,

    #[error("choose at least one die to reroll")]
    NoTargetsChosen,
}

/// Result type alias for intent handlers.
pub type ActionResult<T> = Result<T, ActionError>;
