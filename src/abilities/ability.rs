//! Ability definitions.
//!
//! Abilities are a closed variant set sharing one activate/execute
//! contract. `Reroll` is the reference instance: charge-limited,
//! multi-target, able to rescue a bust or to create one. `Sanctify`
//! demonstrates the no-target path: it executes immediately and installs
//! a selective score modifier that persists for the rest of the run.

use serde::{Deserialize, Serialize};

use crate::events::AbilityId;
use crate::rules::RuleCategory;
use crate::turn::TurnPhase;

/// What an ability does when it executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Reroll up to `dice` chosen unheld dice.
    Reroll { dice: usize },
    /// Boost a rule category's banked score by `percent` from then on.
    Sanctify {
        category: RuleCategory,
        percent: i64,
    },
}

impl AbilityKind {
    /// How many targets must be accumulated before execution.
    ///
    /// Zero means the ability executes immediately on activation.
    #[must_use]
    pub fn targets_required(&self) -> usize {
        match self {
            AbilityKind::Reroll { dice } => *dice,
            AbilityKind::Sanctify { .. } => 0,
        }
    }

    /// Whether the ability may be activated in a phase.
    ///
    /// Never in pre-roll: there is nothing on the table yet.
    #[must_use]
    pub fn usable_in(&self, phase: TurnPhase) -> bool {
        match self {
            AbilityKind::Reroll { .. } => {
                matches!(phase, TurnPhase::Rolling | TurnPhase::Busted)
            }
            AbilityKind::Sanctify { .. } => matches!(phase, TurnPhase::Rolling),
        }
    }

    /// Whether executing this ability can rescue a bust.
    #[must_use]
    pub fn can_rescue(&self) -> bool {
        matches!(self, AbilityKind::Reroll { .. })
    }
}

/// A registered ability: identity, behavior, charge budget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityDef {
    /// Unique identifier.
    pub id: AbilityId,

    /// Display name.
    pub name: String,

    /// Behavior variant.
    pub kind: AbilityKind,

    /// Charges granted at the start of each level.
    pub charges_per_level: u32,
}

impl AbilityDef {
    /// Create an ability definition.
    pub fn new(
        id: AbilityId,
        name: impl Into<String>,
        kind: AbilityKind,
        charges_per_level: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            charges_per_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_required() {
        assert_eq!(AbilityKind::Reroll { dice: 2 }.targets_required(), 2);
        let sanctify = AbilityKind::Sanctify {
            category: RuleCategory::Single,
            percent: 150,
        };
        assert_eq!(sanctify.targets_required(), 0);
    }

    #[test]
    fn test_reroll_usable_phases() {
        let reroll = AbilityKind::Reroll { dice: 1 };
        assert!(reroll.usable_in(TurnPhase::Rolling));
        assert!(reroll.usable_in(TurnPhase::Busted));
        assert!(!reroll.usable_in(TurnPhase::PreRoll));
        assert!(!reroll.usable_in(TurnPhase::Banked));
        assert!(!reroll.usable_in(TurnPhase::InShop));
        assert!(reroll.can_rescue());
    }

    #[test]
    fn test_sanctify_usable_phases() {
        let sanctify = AbilityKind::Sanctify {
            category: RuleCategory::Straight,
            percent: 150,
        };
        assert!(sanctify.usable_in(TurnPhase::Rolling));
        assert!(!sanctify.usable_in(TurnPhase::Busted));
        assert!(!sanctify.can_rescue());
    }

    #[test]
    fn test_def_serde() {
        let def = AbilityDef::new(
            AbilityId::new(1),
            "Second Chance",
            AbilityKind::Reroll { dice: 2 },
            1,
        );
        let json = serde_json::to_string(&def).unwrap();
        let back: AbilityDef = serde_json::from_str(&json).unwrap();
        assert_eq!(def, back);
    }
}
