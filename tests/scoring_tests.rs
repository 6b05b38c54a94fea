//! Evaluator integration tests.
//!
//! These pin down the claim-order semantics the rest of the core relies
//! on: no die scores twice, bigger patterns suppress the smaller ones
//! they contain, and the single-combo test rejects every ambiguous
//! selection.

use proptest::prelude::*;

use greed_core::{Evaluator, RuleCatalog, RuleKey};

fn evaluate(values: &[u8]) -> greed_core::Evaluation {
    let catalog = RuleCatalog::standard();
    Evaluator::new(&catalog).evaluate(values)
}

fn is_single_combo(values: &[u8]) -> bool {
    let catalog = RuleCatalog::standard();
    Evaluator::new(&catalog).is_single_combo(values)
}

#[test]
fn test_two_triples_score_disjointly() {
    // Three 1s at 1000 plus three 2s at 200.
    let result = evaluate(&[1, 1, 1, 2, 2, 2]);
    assert_eq!(result.total, 1200);
    assert_eq!(result.contributing.len(), 6);
}

#[test]
fn test_partial_straights_score_independently() {
    assert_eq!(evaluate(&[1, 2, 3, 4, 5]).total, 500);
    assert_eq!(evaluate(&[2, 3, 4, 5, 6]).total, 750);
}

#[test]
fn test_full_straight_is_not_a_sum_of_partials() {
    let result = evaluate(&[1, 2, 3, 4, 5, 6]);
    assert_eq!(result.total, 1500);
    // One match only: the partial-straight rules found nothing left.
    assert_eq!(result.breakdown.len(), 1);
    assert_eq!(result.breakdown[0].key, RuleKey::new(1));
}

#[test]
fn test_mixed_atomic_singles_are_not_one_combo() {
    // A lone 1 and a lone 5 each score, but never as one lock.
    assert!(is_single_combo(&[1]));
    assert!(is_single_combo(&[5]));
    assert!(!is_single_combo(&[1, 5]));
}

#[test]
fn test_single_plus_triple_is_not_one_combo() {
    assert!(is_single_combo(&[2, 2, 2]));
    assert!(!is_single_combo(&[2, 2, 2, 1]));
    assert!(!is_single_combo(&[2, 2, 2, 5]));
}

#[test]
fn test_of_a_kind_ladder() {
    assert_eq!(evaluate(&[3, 3, 3]).total, 300);
    assert_eq!(evaluate(&[3, 3, 3, 3]).total, 600);
    assert_eq!(evaluate(&[3, 3, 3, 3, 3]).total, 900);
    assert_eq!(evaluate(&[3, 3, 3, 3, 3, 3]).total, 1200);
}

#[test]
fn test_ones_table() {
    assert_eq!(evaluate(&[1]).total, 100);
    assert_eq!(evaluate(&[1, 1]).total, 200);
    assert_eq!(evaluate(&[1, 1, 1]).total, 1000);
    assert_eq!(evaluate(&[1, 1, 1, 1]).total, 2000);
}

#[test]
fn test_dead_hands() {
    assert_eq!(evaluate(&[]).total, 0);
    assert_eq!(evaluate(&[2]).total, 0);
    assert_eq!(evaluate(&[2, 3, 4, 6]).total, 0);
    assert_eq!(evaluate(&[2, 2, 4, 4, 6, 6]).total, 0);
}

proptest! {
    /// No die index is ever assigned to two different matches.
    #[test]
    fn prop_no_die_claimed_twice(values in proptest::collection::vec(1u8..=6, 0..=6)) {
        let result = evaluate(&values);

        let mut seen = vec![false; values.len()];
        for m in &result.breakdown {
            for &i in &m.indices {
                prop_assert!(!seen[i], "index {} claimed twice", i);
                seen[i] = true;
            }
        }
        // Contributing is exactly the claimed set.
        let claimed: Vec<usize> =
            seen.iter().enumerate().filter_map(|(i, &c)| c.then_some(i)).collect();
        prop_assert_eq!(result.contributing.to_vec(), claimed);
    }

    /// The total is always the sum of the breakdown.
    #[test]
    fn prop_total_matches_breakdown(values in proptest::collection::vec(1u8..=6, 0..=6)) {
        let result = evaluate(&values);
        let sum: i64 = result.breakdown.iter().map(|m| m.points).sum();
        prop_assert_eq!(result.total, sum);
    }

    /// Any permutation of 1-6 scores exactly the full straight, and the
    /// full straight suppresses every partial-straight match.
    #[test]
    fn prop_full_straight_dominates(seed in 0u64..1000) {
        let mut values = [1u8, 2, 3, 4, 5, 6];
        // Cheap deterministic shuffle.
        for i in (1..6).rev() {
            let j = ((seed >> i) as usize) % (i + 1);
            values.swap(i, j);
        }

        let result = evaluate(&values);
        prop_assert_eq!(result.total, 1500);
        prop_assert_eq!(result.breakdown.len(), 1);
    }

    /// Hands of at most two dice score only their loose 1s and 5s.
    #[test]
    fn prop_small_hands_score_singles(values in proptest::collection::vec(1u8..=6, 0..=2)) {
        let ones = values.iter().filter(|&&v| v == 1).count() as i64;
        let fives = values.iter().filter(|&&v| v == 5).count() as i64;
        prop_assert_eq!(evaluate(&values).total, ones * 100 + fives * 50);
    }
}
