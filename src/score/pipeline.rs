//! Pending contributions and bank-time score application.
//!
//! A lock produces one [`Contribution`] against the active goal. Locks
//! of the same rule stay separate occurrences so selective modifiers can
//! apply per-occurrence. At bank time [`apply_modifiers`] turns a goal's
//! accumulated contributions into the adjusted delta that is subtracted
//! from the goal's remaining target.

use serde::{Deserialize, Serialize};

use crate::rules::{RuleCatalog, RuleKey};

use super::modifiers::ScoreModifiers;

/// Points locked against a goal but not yet banked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    /// The rule the lock fired.
    pub rule: RuleKey,

    /// Raw points at lock time, before any modifier.
    pub raw: i64,
}

impl Contribution {
    /// Create a new contribution.
    #[must_use]
    pub fn new(rule: RuleKey, raw: i64) -> Self {
        Self { rule, raw }
    }
}

/// Convert contributions into an adjusted, bankable delta.
///
/// Selective modifiers apply to each contribution individually (keyed on
/// the rule's category), the parts are summed, then global multipliers
/// scale the sum. Contributions whose rule key is no longer in the
/// catalog pass through unmodified - a stale key must not lose points.
#[must_use]
pub fn apply_modifiers(
    contributions: &[Contribution],
    catalog: &RuleCatalog,
    modifiers: &ScoreModifiers,
) -> i64 {
    let sum: i64 = contributions
        .iter()
        .map(|c| match catalog.get(c.rule) {
            Some(rule) => modifiers.adjust_part(rule.category(), c.raw),
            None => c.raw,
        })
        .sum();

    modifiers.adjust_total(sum)
}
