//! Ability/targeting subsystem: charge-limited player powers and their
//! target accumulation. Reroll is the reference instance.

mod ability;
mod manager;

pub use ability::{AbilityDef, AbilityKind};
pub use manager::{AbilityManager, AbilitySlot, TargetProgress};
