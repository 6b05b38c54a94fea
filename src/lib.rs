//! # greed-core
//!
//! The rules core of a push-your-luck dice game: on every player action
//! it decides whether a roll is legal, what a selection of dice is
//! worth, whether the turn has busted, how accumulated points commit to
//! goals, and how charge-limited player powers (the reroll rescue)
//! interact with that accounting.
//!
//! Rendering, input handling, persistence, and audio are external
//! collaborators: they feed intents into [`Game`] and observe the typed
//! [`Notification`] stream on the bus.
//!
//! ## Design Principles
//!
//! 1. **Single-threaded, run-to-completion**: every intent is processed
//!    to completion, including all chained notifications, before the
//!    next is accepted. No locks, no suspension.
//!
//! 2. **Denial over mutation**: an illegal intent returns an
//!    [`ActionError`] with a user-facing message and changes nothing.
//!
//! 3. **Ordering as contract**: notification order is test-enforced
//!    (pre-roll before per-die rolls before the post-roll summary; a
//!    handler's follow-ups after the current delivery).
//!
//! ## Modules
//!
//! - `events`: notification bus and notification types
//! - `rules`: rule catalog and the claim-based evaluator
//! - `dice`: the dice set and per-die flags
//! - `turn`: state machine, turn context, and the orchestrator
//! - `score`: pending contributions and the bank-time modifier chain
//! - `goals`: goal/level ledger and the turn budget
//! - `abilities`: charge-limited powers and target accumulation

pub mod abilities;
pub mod dice;
pub mod error;
pub mod events;
pub mod goals;
pub mod rng;
pub mod rules;
pub mod score;
pub mod turn;

// Re-export commonly used types
pub use crate::abilities::{AbilityDef, AbilityKind, AbilityManager, AbilitySlot, TargetProgress};
pub use crate::dice::{DiceSet, Die, DICE_COUNT};
pub use crate::error::{ActionError, ActionResult};
pub use crate::events::{
    AbilityId, Handler, HandlerId, Notification, NotificationBus, TurnEndReason,
};
pub use crate::goals::{ApplyOutcome, Goal, LevelLedger, Reward};
pub use crate::rng::{GameRng, GameRngState};
pub use crate::rules::{
    Evaluation, Evaluator, Rule, RuleCatalog, RuleCategory, RuleKey, RuleKind, RuleMatch,
    RuleValue,
};
pub use crate::score::{
    apply_modifiers, Contribution, GlobalModifier, ScoreModifiers, SelectiveModifier,
};
pub use crate::turn::{Game, ScorePreview, TurnContext, TurnPhase, TurnStateMachine};
