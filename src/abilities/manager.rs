//! Ability charge and target-accumulation state.
//!
//! The manager owns everything ability-scoped: charges, the selecting
//! flag, and the target accumulator. It does not touch dice or goals -
//! execution effects belong to the orchestrator, which asks the manager
//! what to execute and with which targets.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{ActionError, ActionResult};
use crate::events::AbilityId;
use crate::turn::TurnPhase;

use super::ability::{AbilityDef, AbilityKind};

/// Progress of multi-target accumulation after one target click.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetProgress {
    /// Membership toggled; more targets are awaited.
    Awaiting { chosen: usize, required: usize },
    /// The required count is reached; execute with these targets.
    Ready(SmallVec<[usize; 6]>),
}

/// One registered ability plus its per-level state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AbilitySlot {
    /// The immutable definition.
    pub def: AbilityDef,

    charges_used: u32,
    selecting: bool,
    targets: SmallVec<[usize; 6]>,
}

impl AbilitySlot {
    fn new(def: AbilityDef) -> Self {
        Self {
            def,
            charges_used: 0,
            selecting: false,
            targets: SmallVec::new(),
        }
    }

    /// Charges still available this level.
    #[must_use]
    pub fn available(&self) -> u32 {
        self.def.charges_per_level.saturating_sub(self.charges_used)
    }

    /// Whether this ability is currently accumulating targets.
    #[must_use]
    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    /// Targets accumulated so far.
    #[must_use]
    pub fn targets(&self) -> &[usize] {
        &self.targets
    }
}

/// Registry of abilities for one game.
///
/// Abilities are registered once per game; charges reset per level. At
/// most one ability is selecting targets at a time, mirroring the
/// single SelectingTarget phase in the state machine.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AbilityManager {
    slots: Vec<AbilitySlot>,
}

impl AbilityManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an ability.
    pub fn register(&mut self, def: AbilityDef) {
        self.slots.push(AbilitySlot::new(def));
    }

    /// All slots, in registration order.
    #[must_use]
    pub fn slots(&self) -> &[AbilitySlot] {
        &self.slots
    }

    /// Look up a slot by ID.
    #[must_use]
    pub fn get(&self, id: AbilityId) -> Option<&AbilitySlot> {
        self.slots.iter().find(|s| s.def.id == id)
    }

    fn get_mut(&mut self, id: AbilityId) -> ActionResult<&mut AbilitySlot> {
        self.slots
            .iter_mut()
            .find(|s| s.def.id == id)
            .ok_or(ActionError::UnknownAbility)
    }

    /// The ability currently accumulating targets, if any.
    #[must_use]
    pub fn selecting(&self) -> Option<AbilityId> {
        self.slots
            .iter()
            .find(|s| s.selecting)
            .map(|s| s.def.id)
    }

    /// Reset every ability's charges (start of level).
    pub fn reset_charges(&mut self) {
        for slot in &mut self.slots {
            slot.charges_used = 0;
            slot.selecting = false;
            slot.targets.clear();
        }
    }

    /// Whether any charge-bearing rescue ability could still fire.
    ///
    /// Decides if a bust is final or waits for a possible rescue.
    #[must_use]
    pub fn rescue_available(&self) -> bool {
        self.slots
            .iter()
            .any(|s| s.def.kind.can_rescue() && s.available() > 0)
    }

    /// Check charges and phase for an activation.
    pub fn can_activate(&self, id: AbilityId, phase: TurnPhase) -> ActionResult<&AbilitySlot> {
        let slot = self.get(id).ok_or(ActionError::UnknownAbility)?;
        if slot.available() == 0 {
            return Err(ActionError::NoCharges);
        }
        if !slot.def.kind.usable_in(phase) {
            return Err(ActionError::NotAllowed {
                intent: "activate ability",
                phase,
            });
        }
        Ok(slot)
    }

    /// Open target selection for an ability, clearing any partial
    /// accumulation.
    pub fn begin_selection(&mut self, id: AbilityId) -> ActionResult<()> {
        let slot = self.get_mut(id)?;
        slot.selecting = true;
        slot.targets.clear();
        Ok(())
    }

    /// Toggle a target's membership in the open accumulator.
    ///
    /// Reaching the required count reports `Ready` with the full list;
    /// the accumulator stays intact until [`take_targets`] or
    /// [`cancel_selection`].
    ///
    /// [`take_targets`]: Self::take_targets
    /// [`cancel_selection`]: Self::cancel_selection
    pub fn toggle_target(&mut self, index: usize) -> ActionResult<TargetProgress> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.selecting)
            .ok_or(ActionError::NotSelectingTargets)?;

        if let Some(pos) = slot.targets.iter().position(|&t| t == index) {
            slot.targets.remove(pos);
        } else if slot.targets.len() < slot.def.kind.targets_required() {
            slot.targets.push(index);
        }

        let required = slot.def.kind.targets_required();
        if slot.targets.len() == required {
            Ok(TargetProgress::Ready(slot.targets.clone()))
        } else {
            Ok(TargetProgress::Awaiting {
                chosen: slot.targets.len(),
                required,
            })
        }
    }

    /// Close selection and take the accumulated targets for execution.
    pub fn take_targets(&mut self, id: AbilityId) -> ActionResult<SmallVec<[usize; 6]>> {
        let slot = self.get_mut(id)?;
        slot.selecting = false;
        Ok(std::mem::take(&mut slot.targets))
    }

    /// Abort selection, clearing the accumulator.
    pub fn cancel_selection(&mut self, id: AbilityId) -> ActionResult<()> {
        let slot = self.get_mut(id)?;
        slot.selecting = false;
        slot.targets.clear();
        Ok(())
    }

    /// Spend one charge.
    pub fn consume_charge(&mut self, id: AbilityId) -> ActionResult<()> {
        let slot = self.get_mut(id)?;
        if slot.available() == 0 {
            return Err(ActionError::NoCharges);
        }
        slot.charges_used += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleCategory;

    const REROLL: AbilityId = AbilityId::new(1);
    const SANCTIFY: AbilityId = AbilityId::new(2);

    fn manager() -> AbilityManager {
        let mut m = AbilityManager::new();
        m.register(AbilityDef::new(
            REROLL,
            "Second Chance",
            AbilityKind::Reroll { dice: 2 },
            1,
        ));
        m.register(AbilityDef::new(
            SANCTIFY,
            "Sanctify",
            AbilityKind::Sanctify {
                category: RuleCategory::Single,
                percent: 150,
            },
            2,
        ));
        m
    }

    #[test]
    fn test_charges_available() {
        let mut m = manager();
        assert_eq!(m.get(REROLL).unwrap().available(), 1);

        m.consume_charge(REROLL).unwrap();
        assert_eq!(m.get(REROLL).unwrap().available(), 0);
        assert_eq!(m.consume_charge(REROLL), Err(ActionError::NoCharges));
    }

    #[test]
    fn test_reset_charges() {
        let mut m = manager();
        m.consume_charge(REROLL).unwrap();
        m.reset_charges();
        assert_eq!(m.get(REROLL).unwrap().available(), 1);
    }

    #[test]
    fn test_can_activate_checks_phase_and_charges() {
        let mut m = manager();

        assert!(m.can_activate(REROLL, TurnPhase::Rolling).is_ok());
        assert!(m.can_activate(REROLL, TurnPhase::Busted).is_ok());
        assert_eq!(
            m.can_activate(REROLL, TurnPhase::PreRoll).unwrap_err(),
            ActionError::NotAllowed {
                intent: "activate ability",
                phase: TurnPhase::PreRoll,
            }
        );

        m.consume_charge(REROLL).unwrap();
        assert_eq!(
            m.can_activate(REROLL, TurnPhase::Rolling).unwrap_err(),
            ActionError::NoCharges
        );

        assert_eq!(
            m.can_activate(AbilityId::new(99), TurnPhase::Rolling)
                .unwrap_err(),
            ActionError::UnknownAbility
        );
    }

    #[test]
    fn test_target_accumulation() {
        let mut m = manager();
        m.begin_selection(REROLL).unwrap();
        assert_eq!(m.selecting(), Some(REROLL));

        let progress = m.toggle_target(0).unwrap();
        assert_eq!(
            progress,
            TargetProgress::Awaiting {
                chosen: 1,
                required: 2,
            }
        );

        let progress = m.toggle_target(3).unwrap();
        let TargetProgress::Ready(targets) = progress else {
            panic!("expected ready");
        };
        assert_eq!(targets.as_slice(), &[0, 3]);
    }

    #[test]
    fn test_target_toggle_removes() {
        let mut m = manager();
        m.begin_selection(REROLL).unwrap();

        m.toggle_target(0).unwrap();
        let progress = m.toggle_target(0).unwrap();
        assert_eq!(
            progress,
            TargetProgress::Awaiting {
                chosen: 0,
                required: 2,
            }
        );
    }

    #[test]
    fn test_begin_clears_partial_accumulation() {
        let mut m = manager();
        m.begin_selection(REROLL).unwrap();
        m.toggle_target(0).unwrap();

        m.begin_selection(REROLL).unwrap();
        assert!(m.get(REROLL).unwrap().targets().is_empty());
    }

    #[test]
    fn test_take_targets_closes_selection() {
        let mut m = manager();
        m.begin_selection(REROLL).unwrap();
        m.toggle_target(4).unwrap();

        let targets = m.take_targets(REROLL).unwrap();
        assert_eq!(targets.as_slice(), &[4]);
        assert_eq!(m.selecting(), None);
        assert!(m.get(REROLL).unwrap().targets().is_empty());
    }

    #[test]
    fn test_cancel_selection() {
        let mut m = manager();
        m.begin_selection(REROLL).unwrap();
        m.toggle_target(1).unwrap();

        m.cancel_selection(REROLL).unwrap();
        assert_eq!(m.selecting(), None);
        assert!(m.get(REROLL).unwrap().targets().is_empty());
        // No charge consumed on cancel.
        assert_eq!(m.get(REROLL).unwrap().available(), 1);
    }

    #[test]
    fn test_toggle_without_selection_denied() {
        let mut m = manager();
        assert_eq!(
            m.toggle_target(0).unwrap_err(),
            ActionError::NotSelectingTargets
        );
    }

    #[test]
    fn test_rescue_available() {
        let mut m = manager();
        assert!(m.rescue_available());

        m.consume_charge(REROLL).unwrap();
        // Sanctify has charges but cannot rescue.
        assert!(!m.rescue_available());
    }
}
