//! The physical dice and their per-die flags.
//!
//! The dice set is the only component that mutates die fields. Mutating
//! operations return the notifications they produced, in emission order,
//! for the orchestrator to publish; queries never allocate notifications.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::events::Notification;
use crate::rng::GameRng;
use crate::rules::{Evaluator, RuleCatalog};

/// Number of dice in a standard set.
pub const DICE_COUNT: usize = 6;

/// One physical die.
///
/// Invariants: a held die is never selected; `scoring` is only
/// meaningful for unheld dice and is recomputed by
/// [`DiceSet::mark_scoring`] after every roll and reroll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Die {
    /// Current face, 1..=6.
    pub value: u8,

    /// Removed from play for the rest of the turn.
    pub held: bool,

    /// Candidate for the next lock.
    pub selected: bool,

    /// Cached result of the last scoring evaluation.
    pub scoring: bool,
}

impl Die {
    fn new(value: u8) -> Self {
        Self {
            value,
            held: false,
            selected: false,
            scoring: false,
        }
    }
}

/// The set of dice owned by a game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiceSet {
    dice: Vec<Die>,
}

impl Default for DiceSet {
    fn default() -> Self {
        Self::new(DICE_COUNT)
    }
}

impl DiceSet {
    /// Create a set of `count` dice, all showing 1, all in play.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            dice: vec![Die::new(1); count],
        }
    }

    /// Number of dice.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dice.len()
    }

    /// Check if the set has no dice.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }

    /// Read a die.
    #[must_use]
    pub fn die(&self, index: usize) -> Option<&Die> {
        self.dice.get(index)
    }

    /// All faces in index order, held dice included.
    #[must_use]
    pub fn values(&self) -> Vec<u8> {
        self.dice.iter().map(|d| d.value).collect()
    }

    /// Faces of the dice still in play.
    #[must_use]
    pub fn unheld_values(&self) -> Vec<u8> {
        self.dice
            .iter()
            .filter(|d| !d.held)
            .map(|d| d.value)
            .collect()
    }

    /// Indices of the dice still in play.
    #[must_use]
    pub fn unheld_indices(&self) -> SmallVec<[usize; 6]> {
        self.dice
            .iter()
            .enumerate()
            .filter_map(|(i, d)| (!d.held).then_some(i))
            .collect()
    }

    /// Faces of the currently selected dice.
    #[must_use]
    pub fn selected_values(&self) -> Vec<u8> {
        self.dice
            .iter()
            .filter(|d| d.selected)
            .map(|d| d.value)
            .collect()
    }

    /// Indices of the currently selected dice.
    #[must_use]
    pub fn selected_indices(&self) -> SmallVec<[usize; 6]> {
        self.dice
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.selected.then_some(i))
            .collect()
    }

    /// Whether any die is selected.
    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.dice.iter().any(|d| d.selected)
    }

    /// Hot-dice condition: every die is held.
    #[must_use]
    pub fn all_held(&self) -> bool {
        self.dice.iter().all(|d| d.held)
    }

    /// Bust test: the dice still in play score zero.
    ///
    /// Vacuously false when every die is held (that is hot dice, not a
    /// bust).
    #[must_use]
    pub fn unheld_score_is_zero(&self, catalog: &RuleCatalog) -> bool {
        let unheld = self.unheld_values();
        !unheld.is_empty() && !Evaluator::new(catalog).evaluate(&unheld).is_scoring()
    }

    /// Roll every unheld die, clearing its selection.
    ///
    /// Notification order is strict: `PreRoll`, then one `DieRolled` per
    /// die whose face actually changed, then the `PostRoll` summary with
    /// the full face list.
    pub fn roll(&mut self, rng: &mut GameRng) -> Vec<Notification> {
        let mut out = vec![Notification::PreRoll];

        for (index, die) in self.dice.iter_mut().enumerate() {
            if die.held {
                continue;
            }
            die.selected = false;
            let old = die.value;
            let new = rng.die();
            die.value = new;
            if new != old {
                out.push(Notification::DieRolled { index, old, new });
            }
        }

        out.push(Notification::PostRoll {
            values: self.values(),
        });
        out
    }

    /// Reroll specific dice (ability path). Held dice are skipped.
    ///
    /// Emits the same strict ordering as [`roll`](Self::roll), limited to
    /// the targeted dice.
    pub fn reroll(&mut self, targets: &[usize], rng: &mut GameRng) -> Vec<Notification> {
        let mut out = vec![Notification::PreRoll];

        for &index in targets {
            let Some(die) = self.dice.get_mut(index) else {
                continue;
            };
            if die.held {
                continue;
            }
            die.selected = false;
            let old = die.value;
            let new = rng.die();
            die.value = new;
            if new != old {
                out.push(Notification::DieRolled { index, old, new });
            }
        }

        out.push(Notification::PostRoll {
            values: self.values(),
        });
        out
    }

    /// Recompute scoring eligibility for the dice still in play.
    ///
    /// Pure recomputation, emits nothing. Held dice keep `scoring`
    /// false.
    pub fn mark_scoring(&mut self, catalog: &RuleCatalog) {
        for die in &mut self.dice {
            die.scoring = false;
        }

        let unheld = self.unheld_indices();
        let values: Vec<u8> = unheld.iter().map(|&i| self.dice[i].value).collect();
        let evaluation = Evaluator::new(catalog).evaluate(&values);

        for &pos in &evaluation.contributing {
            self.dice[unheld[pos]].scoring = true;
        }
    }

    /// Select or deselect a die. Held dice cannot be selected.
    pub fn toggle_selected(&mut self, index: usize) -> Vec<Notification> {
        let Some(die) = self.dice.get_mut(index) else {
            return Vec::new();
        };
        if die.held {
            return Vec::new();
        }

        die.selected = !die.selected;
        if die.selected {
            vec![Notification::DieSelected { index }]
        } else {
            vec![Notification::DieDeselected { index }]
        }
    }

    /// Transition every selected die to held.
    pub fn hold_selected(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        for (index, die) in self.dice.iter_mut().enumerate() {
            if die.selected {
                die.selected = false;
                die.held = true;
                out.push(Notification::DieHeld {
                    index,
                    value: die.value,
                });
            }
        }
        out
    }

    /// Put every die back in play with flags cleared (hot-dice reset and
    /// new-turn reset).
    pub fn release_all(&mut self) {
        for die in &mut self.dice {
            die.held = false;
            die.selected = false;
            die.scoring = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> RuleCatalog {
        RuleCatalog::standard()
    }

    fn set_values(dice: &mut DiceSet, values: &[u8]) {
        for (i, &v) in values.iter().enumerate() {
            dice.dice[i].value = v;
        }
    }

    #[test]
    fn test_new_set() {
        let dice = DiceSet::default();
        assert_eq!(dice.len(), DICE_COUNT);
        assert!(!dice.all_held());
        assert!(!dice.has_selection());
    }

    #[test]
    fn test_roll_notification_order() {
        let mut dice = DiceSet::default();
        let mut rng = GameRng::new(42);

        let notes = dice.roll(&mut rng);

        assert_eq!(notes.first(), Some(&Notification::PreRoll));
        let Some(Notification::PostRoll { values }) = notes.last() else {
            panic!("missing post-roll summary");
        };
        assert_eq!(values, &dice.values());

        // Everything between is a DieRolled in index order.
        let mut last_index = None;
        for n in &notes[1..notes.len() - 1] {
            let Notification::DieRolled { index, old, new } = n else {
                panic!("unexpected notification {:?}", n);
            };
            assert_ne!(old, new);
            assert!(last_index < Some(*index));
            last_index = Some(*index);
        }
    }

    #[test]
    fn test_roll_skips_held_dice() {
        let mut dice = DiceSet::default();
        let mut rng = GameRng::new(42);
        dice.roll(&mut rng);

        let held_value = dice.die(0).unwrap().value;
        dice.dice[0].held = true;

        for _ in 0..10 {
            dice.roll(&mut rng);
            assert_eq!(dice.die(0).unwrap().value, held_value);
        }
    }

    #[test]
    fn test_roll_clears_selection() {
        let mut dice = DiceSet::default();
        let mut rng = GameRng::new(42);

        dice.toggle_selected(2);
        assert!(dice.has_selection());

        dice.roll(&mut rng);
        assert!(!dice.has_selection());
    }

    #[test]
    fn test_die_rolled_only_for_changed_faces() {
        let mut dice = DiceSet::default();
        let mut rng = GameRng::new(42);

        let before = dice.values();
        let notes = dice.roll(&mut rng);
        let after = dice.values();

        let changed = before
            .iter()
            .zip(&after)
            .filter(|(old, new)| old != new)
            .count();
        let rolled = notes
            .iter()
            .filter(|n| matches!(n, Notification::DieRolled { .. }))
            .count();
        assert_eq!(changed, rolled);
    }

    #[test]
    fn test_mark_scoring() {
        let mut dice = DiceSet::default();
        set_values(&mut dice, &[1, 5, 2, 3, 4, 6]);
        // Full straight: every die contributes.
        dice.mark_scoring(&catalog());
        assert!(dice.dice.iter().all(|d| d.scoring));

        set_values(&mut dice, &[1, 5, 2, 2, 3, 6]);
        dice.mark_scoring(&catalog());
        let scoring: Vec<bool> = dice.dice.iter().map(|d| d.scoring).collect();
        assert_eq!(scoring, vec![true, true, false, false, false, false]);
    }

    #[test]
    fn test_mark_scoring_ignores_held() {
        let mut dice = DiceSet::default();
        set_values(&mut dice, &[1, 1, 1, 2, 3, 6]);
        dice.dice[0].held = true;
        dice.dice[1].held = true;

        // Unheld hand is [1,2,3,6]: only the lone 1 scores.
        dice.mark_scoring(&catalog());
        let scoring: Vec<bool> = dice.dice.iter().map(|d| d.scoring).collect();
        assert_eq!(scoring, vec![false, false, true, false, false, false]);
    }

    #[test]
    fn test_toggle_selected_rejects_held() {
        let mut dice = DiceSet::default();
        dice.dice[3].held = true;

        assert!(dice.toggle_selected(3).is_empty());
        assert!(!dice.dice[3].selected);

        let notes = dice.toggle_selected(1);
        assert_eq!(notes, vec![Notification::DieSelected { index: 1 }]);
        let notes = dice.toggle_selected(1);
        assert_eq!(notes, vec![Notification::DieDeselected { index: 1 }]);
    }

    #[test]
    fn test_hold_selected() {
        let mut dice = DiceSet::default();
        set_values(&mut dice, &[1, 1, 3, 4, 5, 6]);
        dice.toggle_selected(0);
        dice.toggle_selected(1);

        let notes = dice.hold_selected();
        assert_eq!(
            notes,
            vec![
                Notification::DieHeld { index: 0, value: 1 },
                Notification::DieHeld { index: 1, value: 1 },
            ]
        );
        assert!(dice.dice[0].held && dice.dice[1].held);
        assert!(!dice.has_selection());
        assert_eq!(dice.unheld_values().len(), 4);
    }

    #[test]
    fn test_bust_detection() {
        let mut dice = DiceSet::default();
        set_values(&mut dice, &[2, 2, 3, 4, 6, 6]);
        assert!(dice.unheld_score_is_zero(&catalog()));

        set_values(&mut dice, &[1, 2, 3, 4, 6, 6]);
        assert!(!dice.unheld_score_is_zero(&catalog()));
    }

    #[test]
    fn test_all_held_is_not_a_bust() {
        let mut dice = DiceSet::default();
        for die in &mut dice.dice {
            die.held = true;
        }
        assert!(dice.all_held());
        assert!(!dice.unheld_score_is_zero(&catalog()));
    }

    #[test]
    fn test_release_all() {
        let mut dice = DiceSet::default();
        dice.dice[0].held = true;
        dice.dice[1].selected = true;
        dice.dice[2].scoring = true;

        dice.release_all();
        assert!(!dice.all_held());
        assert!(!dice.has_selection());
        assert!(dice.dice.iter().all(|d| !d.scoring));
    }

    #[test]
    fn test_reroll_targets_only() {
        let mut dice = DiceSet::default();
        let mut rng = GameRng::new(1);
        dice.roll(&mut rng);

        let before = dice.values();
        let notes = dice.reroll(&[2], &mut rng);

        for n in &notes {
            if let Notification::DieRolled { index, .. } = n {
                assert_eq!(*index, 2);
            }
        }
        for i in (0..6).filter(|&i| i != 2) {
            assert_eq!(dice.values()[i], before[i]);
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let mut dice = DiceSet::default();
        dice.dice[0].held = true;
        dice.dice[1].selected = true;

        let json = serde_json::to_string(&dice).unwrap();
        let back: DiceSet = serde_json::from_str(&json).unwrap();
        assert_eq!(dice.values(), back.values());
        assert!(back.die(0).unwrap().held);
        assert!(back.die(1).unwrap().selected);
    }
}
