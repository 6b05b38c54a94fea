//! Goal/level ledger: targets, pending ownership, turn budget, and the
//! latched completed/failed terminal flags.

mod ledger;

pub use ledger::{ApplyOutcome, Goal, LevelLedger, Reward};
