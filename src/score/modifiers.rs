//! Score modifiers.
//!
//! Modifiers belong to meta-progression actors (shop purchases,
//! abilities) and adjust banked scores. Selective modifiers apply to
//! each contributing part individually by rule category; global
//! multipliers apply to the summed result. All math is integer percent
//! math, floored.

use serde::{Deserialize, Serialize};

use crate::rules::RuleCategory;

/// A per-part modifier keyed on rule category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectiveModifier {
    /// Which rule family this modifier touches.
    pub category: RuleCategory,

    /// Percent factor applied first (100 = unchanged).
    pub percent: i64,

    /// Flat bonus added after the factor.
    pub flat_bonus: i64,
}

impl SelectiveModifier {
    /// A pure percent boost for a category.
    #[must_use]
    pub fn percent(category: RuleCategory, percent: i64) -> Self {
        Self {
            category,
            percent,
            flat_bonus: 0,
        }
    }

    /// A pure flat bonus for a category.
    #[must_use]
    pub fn flat(category: RuleCategory, flat_bonus: i64) -> Self {
        Self {
            category,
            percent: 100,
            flat_bonus,
        }
    }
}

/// A whole-sum percent multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalModifier {
    /// Percent factor (100 = unchanged, 150 = +50%).
    pub percent: i64,
}

/// The modifier chain applied at bank time.
///
/// Application order is fixed: every selective modifier adjusts each
/// part, parts are summed, then every global multiplier scales the sum.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreModifiers {
    selective: Vec<SelectiveModifier>,
    global: Vec<GlobalModifier>,
}

impl ScoreModifiers {
    /// No modifiers: banked scores pass through raw.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a selective modifier.
    pub fn add_selective(&mut self, modifier: SelectiveModifier) {
        self.selective.push(modifier);
    }

    /// Register a global multiplier.
    pub fn add_global(&mut self, modifier: GlobalModifier) {
        self.global.push(modifier);
    }

    /// Adjust one contributing part.
    #[must_use]
    pub fn adjust_part(&self, category: RuleCategory, raw: i64) -> i64 {
        let mut part = raw;
        for m in self.selective.iter().filter(|m| m.category == category) {
            part = part * m.percent / 100 + m.flat_bonus;
        }
        part
    }

    /// Scale a summed result by the global chain.
    #[must_use]
    pub fn adjust_total(&self, sum: i64) -> i64 {
        let mut total = sum;
        for g in &self.global {
            total = total * g.percent / 100;
        }
        total
    }

    /// Whether any modifier is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selective.is_empty() && self.global.is_empty()
    }
}
