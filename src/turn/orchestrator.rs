//! The turn orchestrator.
//!
//! [`Game`] owns every component and is the single entry point for
//! player intents. Each intent validates its preconditions against the
//! state machine, mutates exactly the components it owns, and publishes
//! the resulting notifications on the bus. A denied intent mutates
//! nothing.
//!
//! Processing is single-threaded and run-to-completion: an intent and
//! every notification it triggers finish before the next intent is
//! accepted.

use crate::abilities::{AbilityDef, AbilityKind, AbilityManager, TargetProgress};
use crate::dice::DiceSet;
use crate::error::{ActionError, ActionResult};
use crate::events::{AbilityId, Notification, NotificationBus, TurnEndReason};
use crate::goals::{Goal, LevelLedger};
use crate::rng::GameRng;
use crate::rules::{Evaluator, RuleCatalog};
use crate::score::{apply_modifiers, Contribution, ScoreModifiers, SelectiveModifier};

use super::context::TurnContext;
use super::state::{TurnPhase, TurnStateMachine};

/// Raw and modifier-adjusted worth of the current selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScorePreview {
    /// Points the selection evaluates to.
    pub raw: i64,
    /// The same points after the bank-time modifier chain.
    pub adjusted: i64,
}

/// The rules core of one game.
pub struct Game {
    rng: GameRng,
    dice: DiceSet,
    catalog: RuleCatalog,
    machine: TurnStateMachine,
    ledger: LevelLedger,
    abilities: AbilityManager,
    modifiers: ScoreModifiers,
    bus: NotificationBus,
    ctx: TurnContext,
    active_goal: usize,
}

impl Game {
    /// Create a game with the standard catalog and no goals.
    ///
    /// Call [`start_level`](Self::start_level) before playing.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
            dice: DiceSet::default(),
            catalog: RuleCatalog::standard(),
            machine: TurnStateMachine::new(),
            ledger: LevelLedger::default(),
            abilities: AbilityManager::new(),
            modifiers: ScoreModifiers::new(),
            bus: NotificationBus::new(),
            ctx: TurnContext::default(),
            active_goal: 0,
        }
    }

    /// Replace the rule catalog (builder pattern).
    #[must_use]
    pub fn with_catalog(mut self, catalog: RuleCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Register an ability. Abilities register once per game.
    pub fn register_ability(&mut self, def: AbilityDef) {
        self.abilities.register(def);
    }

    /// Install goals and a turn budget for a new level.
    ///
    /// Resets ability charges, per-turn state, and the level-complete
    /// latch. Legal from any phase: the embedding layer drives level
    /// boundaries.
    pub fn start_level(&mut self, goals: Vec<Goal>, turns: u32) {
        self.ledger = LevelLedger::new(goals, turns);
        self.abilities.reset_charges();
        self.dice.release_all();
        self.ctx.reset_for_new_level();
        self.active_goal = 0;
        self.machine = TurnStateMachine::new();
        log::info!(
            "level started: {} goals, {} turns",
            self.ledger.len(),
            turns
        );
    }

    // === Queries ===

    /// The active turn phase.
    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.machine.phase()
    }

    /// Accumulated, unbanked score this turn.
    #[must_use]
    pub fn turn_score(&self) -> i64 {
        self.ctx.turn_score
    }

    /// The dice and their visual flags.
    #[must_use]
    pub fn dice(&self) -> &DiceSet {
        &self.dice
    }

    /// The goal ledger.
    #[must_use]
    pub fn ledger(&self) -> &LevelLedger {
        &self.ledger
    }

    /// Ability charge counts and selection status.
    #[must_use]
    pub fn abilities(&self) -> &AbilityManager {
        &self.abilities
    }

    /// The modifier chain (for meta-progression actors to extend).
    pub fn modifiers_mut(&mut self) -> &mut ScoreModifiers {
        &mut self.modifiers
    }

    /// The bus, for subscribing observers.
    pub fn bus_mut(&mut self) -> &mut NotificationBus {
        &mut self.bus
    }

    /// The goal locks currently accrue against.
    #[must_use]
    pub fn active_goal(&self) -> usize {
        self.active_goal
    }

    /// Point future locks at a different goal.
    pub fn set_active_goal(&mut self, index: usize) -> ActionResult<()> {
        if index >= self.ledger.len() {
            return Err(ActionError::NotAllowed {
                intent: "set active goal",
                phase: self.machine.phase(),
            });
        }
        self.active_goal = index;
        Ok(())
    }

    /// What the current selection would be worth.
    ///
    /// `None` when nothing is selected. `raw` is the selection's
    /// evaluation; `adjusted` runs the same parts through the modifier
    /// chain, matching what a bank would pay.
    #[must_use]
    pub fn selection_preview(&self) -> Option<ScorePreview> {
        let selection = self.dice.selected_values();
        if selection.is_empty() {
            return None;
        }
        let evaluation = Evaluator::new(&self.catalog).evaluate(&selection);
        let contributions: Vec<Contribution> = evaluation
            .breakdown
            .iter()
            .map(|m| Contribution::new(m.key, m.points))
            .collect();
        Some(ScorePreview {
            raw: evaluation.total,
            adjusted: apply_modifiers(&contributions, &self.catalog, &self.modifiers),
        })
    }

    // === Intents ===

    /// Select or deselect a die as a lock candidate.
    pub fn toggle_die(&mut self, index: usize) -> ActionResult<()> {
        if self.machine.phase() != TurnPhase::Rolling {
            return Err(self.denied("select die"));
        }
        let notes = self.dice.toggle_selected(index);
        self.publish_all(notes);
        Ok(())
    }

    /// Roll the dice.
    ///
    /// The first roll of a turn is always legal. After that, a roll
    /// needs a lock since the previous roll - unless every die is held,
    /// which triggers the hot-dice reset and a fresh roll of all dice.
    pub fn roll(&mut self) -> ActionResult<()> {
        match self.machine.phase() {
            TurnPhase::PreRoll => {
                let note = self.machine.transition(TurnPhase::Rolling, "roll")?;
                self.bus.publish(note);
            }
            TurnPhase::Rolling => {
                if self.dice.all_held() {
                    log::debug!("hot dice: releasing all dice for a full reroll");
                    self.dice.release_all();
                } else if !self.ctx.locked_since_roll {
                    log::debug!("roll denied: no lock since last roll");
                    return Err(ActionError::RollRequiresLock);
                }
            }
            _ => return Err(self.denied("roll")),
        }

        let notes = self.dice.roll(&mut self.rng);
        self.ctx.locked_since_roll = false;
        self.dice.mark_scoring(&self.catalog);
        self.publish_all(notes);

        self.resolve_roll_outcome(false, "roll")
    }

    /// Lock the current selection for points.
    ///
    /// The selection must score and must be a single unambiguous combo.
    pub fn lock(&mut self) -> ActionResult<()> {
        if self.machine.phase() != TurnPhase::Rolling {
            return Err(self.denied("lock"));
        }
        let selection = self.dice.selected_values();
        if selection.is_empty() {
            return Err(ActionError::NothingSelected);
        }

        let evaluator = Evaluator::new(&self.catalog);
        if !evaluator.evaluate(&selection).is_scoring() {
            return Err(ActionError::SelectionNotScoring);
        }
        let Some(combo) = evaluator.single_combo(&selection) else {
            return Err(ActionError::AmbiguousSelection);
        };

        self.ctx.turn_score += combo.points;
        self.ctx.locked_since_roll = true;
        if let Some(goal) = self.ledger.goal_mut(self.active_goal) {
            goal.add_pending(Contribution::new(combo.key, combo.points));
        }

        let notes = self.dice.hold_selected();
        self.dice.mark_scoring(&self.catalog);
        self.publish_all(notes);
        self.bus.publish(Notification::LockAdded {
            rule: combo.key,
            points: combo.points,
        });
        log::debug!("locked {} for {} points", combo.key, combo.points);
        Ok(())
    }

    /// Bank the turn score.
    ///
    /// Every goal with pending points gets a score application; the turn
    /// ends only after all of them have acknowledged (counted
    /// handshake). A second bank is a guarded no-op: the turn score is
    /// zeroed synchronously and the phase has left Rolling.
    pub fn bank(&mut self) -> ActionResult<()> {
        if self.machine.phase() != TurnPhase::Rolling {
            return Err(self.denied("bank"));
        }
        if self.ctx.turn_score == 0 {
            return Err(ActionError::NothingToBank);
        }
        if self.dice.has_selection() {
            let selection = self.dice.selected_values();
            if !Evaluator::new(&self.catalog).is_single_combo(&selection) {
                return Err(ActionError::SelectionOutstanding);
            }
            // A lockable selection left on the table is the player's to
            // lose; it simply does not score.
        }

        let pending_goals: Vec<usize> = (0..self.ledger.len())
            .filter(|&i| self.ledger.goal(i).is_some_and(|g| g.pending_raw() > 0))
            .collect();
        self.ctx.bank_acks_outstanding = pending_goals.len() as u32;

        for index in pending_goals {
            let Some(goal) = self.ledger.goal_mut(index) else {
                continue;
            };
            let contributions = goal.drain_pending();
            let adjusted = apply_modifiers(&contributions, &self.catalog, &self.modifiers);

            if let Some(outcome) = self.ledger.apply(index, adjusted) {
                self.bus.publish(Notification::GoalProgress {
                    goal: index,
                    delta: outcome.delta,
                    remaining: outcome.remaining,
                });
                if outcome.newly_fulfilled {
                    self.bus.publish(Notification::GoalFulfilled { goal: index });
                }
                if outcome.level_completed {
                    self.ctx.level_complete_pending = true;
                }
            }
            self.ctx.bank_acks_outstanding -= 1;
        }
        debug_assert_eq!(self.ctx.bank_acks_outstanding, 0);

        let total = self.ctx.turn_score;
        self.ctx.turn_score = 0;
        let note = self.machine.transition(TurnPhase::Banked, "bank")?;
        self.bus.publish(note);
        self.bus.publish(Notification::TurnBanked { total });
        self.bus.publish(Notification::TurnEnded {
            reason: TurnEndReason::Banked,
        });
        log::info!("banked {} points", total);

        if self.ctx.level_complete_pending && !self.ctx.level_complete_emitted {
            self.ctx.level_complete_emitted = true;
            self.bus.publish(Notification::LevelComplete);
        }
        Ok(())
    }

    /// Finish a busted or banked turn and begin the next one.
    pub fn next_turn(&mut self) -> ActionResult<()> {
        let phase = self.machine.phase();
        if !matches!(phase, TurnPhase::Busted | TurnPhase::Banked) {
            return Err(self.denied("next turn"));
        }

        if phase == TurnPhase::Busted {
            // Un-rescued bust: pending drains exactly once.
            self.resolve_bust_pending();
        }

        let failed = self.ledger.consume_turn();
        let note = self.machine.transition(TurnPhase::PreRoll, "next turn")?;
        self.bus.publish(note);
        if failed {
            self.bus.publish(Notification::LevelFailed);
        }

        self.dice.release_all();
        self.ctx.reset_for_new_turn();
        Ok(())
    }

    /// Enter the shop (level-advance-finished signal).
    pub fn enter_shop(&mut self) -> ActionResult<()> {
        if self.machine.phase() == TurnPhase::Busted {
            self.resolve_bust_pending();
        }
        let note = self.machine.transition(TurnPhase::InShop, "enter shop")?;
        self.bus.publish(note);
        Ok(())
    }

    /// Leave the shop and start the next turn fresh.
    pub fn close_shop(&mut self) -> ActionResult<()> {
        let note = self.machine.transition(TurnPhase::PreRoll, "close shop")?;
        self.bus.publish(note);
        self.dice.release_all();
        self.ctx.reset_for_new_turn();
        Ok(())
    }

    /// Activate an ability.
    ///
    /// Target-taking abilities open target selection; the rest execute
    /// immediately.
    pub fn activate_ability(&mut self, id: AbilityId) -> ActionResult<()> {
        let phase = self.machine.phase();
        let slot = self.abilities.can_activate(id, phase)?;
        let kind = slot.def.kind;

        if kind.targets_required() > 0 {
            let note = self.machine.enter_targeting("activate ability")?;
            self.abilities.begin_selection(id)?;
            self.bus.publish(note);
            self.bus
                .publish(Notification::TargetSelectionStarted { id });
            Ok(())
        } else {
            self.execute_untargeted(id, kind)
        }
    }

    /// Toggle a die's membership in the open target accumulation.
    ///
    /// Reaching the required count executes the ability immediately.
    pub fn select_target(&mut self, index: usize) -> ActionResult<()> {
        if self.machine.phase() != TurnPhase::SelectingTarget {
            return Err(self.denied("select target"));
        }
        if self.dice.die(index).is_none_or(|d| d.held) {
            return Err(ActionError::TargetNotRerollable);
        }

        match self.abilities.toggle_target(index)? {
            TargetProgress::Awaiting { chosen, required } => {
                log::debug!("target selection: {} of {} chosen", chosen, required);
                Ok(())
            }
            TargetProgress::Ready(_) => self.finalize_selection(),
        }
    }

    /// Execute the selecting ability with whatever targets are
    /// accumulated.
    pub fn finalize_selection(&mut self) -> ActionResult<()> {
        if self.machine.phase() != TurnPhase::SelectingTarget {
            return Err(self.denied("finalize selection"));
        }
        let id = self
            .abilities
            .selecting()
            .ok_or(ActionError::NotSelectingTargets)?;
        if self
            .abilities
            .get(id)
            .is_some_and(|s| s.targets().is_empty())
        {
            return Err(ActionError::NoTargetsChosen);
        }

        let targets = self.abilities.take_targets(id)?;
        self.execute_reroll(id, &targets)
    }

    /// Abort target selection. No charge is consumed.
    pub fn cancel_selection(&mut self) -> ActionResult<()> {
        if self.machine.phase() != TurnPhase::SelectingTarget {
            return Err(self.denied("cancel selection"));
        }
        let id = self
            .abilities
            .selecting()
            .ok_or(ActionError::NotSelectingTargets)?;

        self.abilities.cancel_selection(id)?;
        let note = self.machine.exit_targeting(false, "cancel selection")?;
        self.bus
            .publish(Notification::TargetSelectionFinished { id });
        self.bus.publish(note);
        Ok(())
    }

    // === Internals ===

    fn denied(&self, intent: &'static str) -> ActionError {
        let err = ActionError::NotAllowed {
            intent,
            phase: self.machine.phase(),
        };
        log::debug!("denied: {}", err);
        err
    }

    fn publish_all(&mut self, notes: Vec<Notification>) {
        self.bus.publish_all(notes);
    }

    /// Execute a no-target ability (Sanctify path).
    fn execute_untargeted(&mut self, id: AbilityId, kind: AbilityKind) -> ActionResult<()> {
        match kind {
            AbilityKind::Sanctify { category, percent } => {
                self.abilities.consume_charge(id)?;
                self.modifiers
                    .add_selective(SelectiveModifier::percent(category, percent));
                self.bus.publish(Notification::AbilityExecuted { id });
                log::info!("sanctified {:?} at {}%", category, percent);
                Ok(())
            }
            AbilityKind::Reroll { .. } => {
                // Target-taking; activation routes through selection.
                Err(ActionError::NoTargetsChosen)
            }
        }
    }

    /// Execute a reroll with accumulated targets and resolve the
    /// outcome.
    fn execute_reroll(&mut self, id: AbilityId, targets: &[usize]) -> ActionResult<()> {
        self.abilities.consume_charge(id)?;

        let was_busted = self.machine.saved_prior() == Some(TurnPhase::Busted);

        let notes = self.dice.reroll(targets, &mut self.rng);
        self.dice.mark_scoring(&self.catalog);
        self.publish_all(notes);
        self.bus.publish(Notification::AbilityExecuted { id });
        self.bus
            .publish(Notification::TargetSelectionFinished { id });

        let rescued = was_busted && !self.dice.unheld_score_is_zero(&self.catalog);
        let note = self.machine.exit_targeting(rescued, "reroll")?;
        self.bus.publish(note);

        self.resolve_roll_outcome(was_busted, "reroll")
    }

    /// Shared bust/rescue detection for every path that changes die
    /// faces: the plain roll and both reroll call sites.
    fn resolve_roll_outcome(
        &mut self,
        was_busted: bool,
        intent: &'static str,
    ) -> ActionResult<()> {
        let busted_now = self.dice.unheld_score_is_zero(&self.catalog);

        if was_busted && !busted_now {
            // Rescue: the state machine already restored to Rolling;
            // pending scores are preserved untouched.
            log::info!("bust rescued");
            self.bus.publish(Notification::BustRescued);
            return Ok(());
        }

        if !was_busted && busted_now {
            let note = self.machine.transition(TurnPhase::Busted, intent)?;
            self.ctx.turn_score = 0;
            self.bus.publish(note);
            self.bus.publish(Notification::Bust);
            log::info!("bust: unheld dice score zero");
        }

        if busted_now && !self.abilities.rescue_available() {
            // No rescue possible: the turn is forced to end now.
            self.resolve_bust_pending();
            self.bus.publish(Notification::TurnEnded {
                reason: TurnEndReason::Busted,
            });
        }
        Ok(())
    }

    /// Drain pending points after an un-rescued bust. Latched so the
    /// forced-end path and a later next-turn cannot drain twice.
    fn resolve_bust_pending(&mut self) {
        if self.ctx.bust_resolved {
            return;
        }
        self.ctx.bust_resolved = true;
        for index in 0..self.ledger.len() {
            if let Some(goal) = self.ledger.goal_mut(index) {
                let dropped = goal.drain_pending();
                if !dropped.is_empty() {
                    log::debug!(
                        "bust dropped {} pending points from goal {}",
                        dropped.iter().map(|c| c.raw).sum::<i64>(),
                        index
                    );
                }
            }
        }
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("phase", &self.machine.phase())
            .field("turn_score", &self.ctx.turn_score)
            .field("dice", &self.dice.values())
            .field("goals", &self.ledger.len())
            .finish()
    }
}
