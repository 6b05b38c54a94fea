//! Goals and the level ledger.
//!
//! A goal owns its own pending contributions and remaining target;
//! nothing else mutates them. The ledger tracks the turn budget and the
//! latched completed/failed terminal flags, which the orchestrator
//! checks only at well-defined points (end of bank cycle, end of bust
//! resolution) - never mid-turn.

use serde::{Deserialize, Serialize};

use crate::score::Contribution;

/// Reward granted when a goal is fulfilled.
///
/// Data only; the shop collaborator applies it. Serialized with the
/// goal so persistence sees the whole reward descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    /// Currency paid out.
    pub coins: i64,
    /// Extra ability charges granted for the next level.
    pub ability_charges: u32,
}

/// A target that consumes applied score.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// Display name.
    pub name: String,

    /// The score this goal demands.
    pub target: i64,

    /// Points still needed. Monotonically non-increasing once applied,
    /// never negative.
    remaining: i64,

    /// Whether the level requires this goal.
    pub mandatory: bool,

    /// Paid out on fulfillment.
    pub reward: Reward,

    /// Locked-but-not-banked points, one entry per lock occurrence.
    pending: Vec<Contribution>,

    /// Latched on the first time remaining reaches zero.
    fulfilled: bool,
}

impl Goal {
    /// Create a mandatory goal.
    pub fn mandatory(name: impl Into<String>, target: i64) -> Self {
        Self {
            name: name.into(),
            target,
            remaining: target,
            mandatory: true,
            reward: Reward::default(),
            pending: Vec::new(),
            fulfilled: false,
        }
    }

    /// Create an optional goal.
    pub fn optional(name: impl Into<String>, target: i64) -> Self {
        Self {
            mandatory: false,
            ..Self::mandatory(name, target)
        }
    }

    /// Attach a reward (builder pattern).
    #[must_use]
    pub fn with_reward(mut self, reward: Reward) -> Self {
        self.reward = reward;
        self
    }

    /// Points still needed.
    #[must_use]
    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    /// Whether the goal has been fulfilled.
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        self.fulfilled
    }

    /// Sum of pending raw points.
    #[must_use]
    pub fn pending_raw(&self) -> i64 {
        self.pending.iter().map(|c| c.raw).sum()
    }

    /// The pending contributions, in lock order.
    #[must_use]
    pub fn pending(&self) -> &[Contribution] {
        &self.pending
    }

    /// Record a lock against this goal.
    pub fn add_pending(&mut self, contribution: Contribution) {
        self.pending.push(contribution);
    }

    /// Take all pending contributions, leaving none.
    ///
    /// Called exactly once per bank or bust resolution.
    pub fn drain_pending(&mut self) -> Vec<Contribution> {
        std::mem::take(&mut self.pending)
    }
}

/// Outcome of applying points to a goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Points actually applied.
    pub delta: i64,
    /// Remaining after application.
    pub remaining: i64,
    /// True the first (and only) time this application fulfilled the goal.
    pub newly_fulfilled: bool,
    /// True the first time all mandatory goals became fulfilled.
    pub level_completed: bool,
}

/// An ordered collection of goals plus the turn budget.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LevelLedger {
    goals: Vec<Goal>,
    turns_remaining: u32,
    completed: bool,
    failed: bool,
}

impl LevelLedger {
    /// Create a ledger over goals with a turn budget.
    #[must_use]
    pub fn new(goals: Vec<Goal>, turns: u32) -> Self {
        Self {
            goals,
            turns_remaining: turns,
            completed: false,
            failed: false,
        }
    }

    /// The goals, in order.
    #[must_use]
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Mutable access to one goal.
    pub fn goal_mut(&mut self, index: usize) -> Option<&mut Goal> {
        self.goals.get_mut(index)
    }

    /// Read one goal.
    #[must_use]
    pub fn goal(&self, index: usize) -> Option<&Goal> {
        self.goals.get(index)
    }

    /// Number of goals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.goals.len()
    }

    /// Check if there are no goals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// Turns left in the level.
    #[must_use]
    pub fn turns_remaining(&self) -> u32 {
        self.turns_remaining
    }

    /// Latched completion flag.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Latched failure flag.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Whether every mandatory goal is fulfilled.
    #[must_use]
    pub fn mandatory_fulfilled(&self) -> bool {
        self.goals
            .iter()
            .filter(|g| g.mandatory)
            .all(Goal::is_fulfilled)
    }

    /// Apply points to a goal, flooring remaining at zero.
    ///
    /// No-op (returns `None`) on non-positive points or a bad index.
    /// Fulfillment and level completion latch on their first detection
    /// and are reported exactly once through the outcome.
    pub fn apply(&mut self, index: usize, points: i64) -> Option<ApplyOutcome> {
        if points <= 0 {
            return None;
        }
        let was_completed = self.completed;
        let goal = self.goals.get_mut(index)?;

        let before = goal.remaining;
        goal.remaining = (goal.remaining - points).max(0);
        let delta = before - goal.remaining;

        let newly_fulfilled = !goal.fulfilled && goal.remaining == 0;
        if newly_fulfilled {
            goal.fulfilled = true;
            log::info!("goal '{}' fulfilled", goal.name);
        }
        let remaining = goal.remaining;

        if !self.completed && !self.failed && self.mandatory_fulfilled() {
            self.completed = true;
        }

        Some(ApplyOutcome {
            delta,
            remaining,
            newly_fulfilled,
            level_completed: self.completed && !was_completed,
        })
    }

    /// Consume one turn from the budget.
    ///
    /// Returns true if this consumption failed the level (budget hit
    /// zero with mandatory goals unfulfilled). Completion and failure
    /// are mutually exclusive.
    pub fn consume_turn(&mut self) -> bool {
        self.turns_remaining = self.turns_remaining.saturating_sub(1);
        if self.turns_remaining == 0
            && !self.completed
            && !self.failed
            && !self.mandatory_fulfilled()
        {
            self.failed = true;
            log::info!("level failed: turn budget exhausted");
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleKey;

    fn ledger() -> LevelLedger {
        LevelLedger::new(
            vec![
                Goal::mandatory("first", 300),
                Goal::optional("bonus", 500),
            ],
            3,
        )
    }

    #[test]
    fn test_apply_floors_at_zero() {
        let mut ledger = ledger();
        let outcome = ledger.apply(0, 1000).unwrap();

        assert_eq!(outcome.delta, 300);
        assert_eq!(outcome.remaining, 0);
        assert!(outcome.newly_fulfilled);
        assert_eq!(ledger.goal(0).unwrap().remaining(), 0);
    }

    #[test]
    fn test_apply_rejects_non_positive_and_bad_index() {
        let mut ledger = ledger();
        assert!(ledger.apply(0, 0).is_none());
        assert!(ledger.apply(0, -50).is_none());
        assert!(ledger.apply(9, 100).is_none());
        assert_eq!(ledger.goal(0).unwrap().remaining(), 300);
    }

    #[test]
    fn test_partial_application() {
        let mut ledger = ledger();
        let outcome = ledger.apply(0, 100).unwrap();

        assert_eq!(outcome.delta, 100);
        assert_eq!(outcome.remaining, 200);
        assert!(!outcome.newly_fulfilled);
        assert!(!outcome.level_completed);
    }

    #[test]
    fn test_fulfillment_reported_once() {
        let mut ledger = ledger();
        let first = ledger.apply(0, 300).unwrap();
        assert!(first.newly_fulfilled);

        // Further applications are no-ops at the goal level: remaining is
        // already zero and fulfillment does not re-latch.
        let second = ledger.apply(0, 100).unwrap();
        assert_eq!(second.delta, 0);
        assert!(!second.newly_fulfilled);
    }

    #[test]
    fn test_optional_goal_does_not_gate_completion() {
        let mut ledger = ledger();
        let outcome = ledger.apply(0, 300).unwrap();

        assert!(outcome.level_completed);
        assert!(ledger.is_completed());
        assert!(!ledger.goal(1).unwrap().is_fulfilled());
    }

    #[test]
    fn test_completion_latches_once() {
        let mut ledger = ledger();
        assert!(ledger.apply(0, 300).unwrap().level_completed);
        assert!(!ledger.apply(1, 500).unwrap().level_completed);
        assert!(ledger.is_completed());
    }

    #[test]
    fn test_two_mandatory_goals() {
        let mut ledger = LevelLedger::new(
            vec![Goal::mandatory("a", 100), Goal::mandatory("b", 100)],
            3,
        );

        assert!(!ledger.apply(0, 100).unwrap().level_completed);
        assert!(ledger.apply(1, 100).unwrap().level_completed);
    }

    #[test]
    fn test_consume_turn_failure() {
        let mut ledger = ledger();
        assert!(!ledger.consume_turn());
        assert!(!ledger.consume_turn());
        assert!(ledger.consume_turn());
        assert!(ledger.is_failed());
        assert!(!ledger.is_completed());

        // Already failed: does not report again.
        assert!(!ledger.consume_turn());
    }

    #[test]
    fn test_completed_level_cannot_fail() {
        let mut ledger = ledger();
        ledger.apply(0, 300);
        for _ in 0..5 {
            assert!(!ledger.consume_turn());
        }
        assert!(ledger.is_completed());
        assert!(!ledger.is_failed());
    }

    #[test]
    fn test_pending_accumulates_per_occurrence() {
        let mut ledger = ledger();
        let goal = ledger.goal_mut(0).unwrap();

        goal.add_pending(Contribution::new(RuleKey::new(8), 100));
        goal.add_pending(Contribution::new(RuleKey::new(8), 100));

        assert_eq!(goal.pending_raw(), 200);
        assert_eq!(goal.pending().len(), 2);

        let drained = goal.drain_pending();
        assert_eq!(drained.len(), 2);
        assert_eq!(goal.pending_raw(), 0);
    }

    #[test]
    fn test_goal_serde() {
        let goal = Goal::mandatory("serde", 300).with_reward(Reward {
            coins: 5,
            ability_charges: 1,
        });
        let json = serde_json::to_string(&goal).unwrap();
        let back: Goal = serde_json::from_str(&json).unwrap();
        assert_eq!(goal, back);
    }
}
