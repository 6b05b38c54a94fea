//! The rule evaluator.
//!
//! Two queries over a multiset of die faces:
//!
//! - [`Evaluator::evaluate`] scores a hand. Rules claim dice greedily in
//!   descending combo-size order, so no die ever scores twice and larger
//!   patterns suppress the smaller patterns they contain (a full straight
//!   suppresses partial straights, a four-of-a-kind is never also counted
//!   as a three-of-a-kind).
//! - [`Evaluator::evaluate_matches`] lists every independent rule match
//!   without claiming. [`Evaluator::is_single_combo`] uses it to decide
//!   whether a selection is exactly one unambiguous scoring combination.

use smallvec::SmallVec;

use super::catalog::{Rule, RuleCatalog, RuleKey, RuleKind};

/// One rule firing against specific dice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleMatch {
    /// The rule that fired.
    pub key: RuleKey,

    /// The rule's combo size (cached for ambiguity resolution).
    pub combo_size: usize,

    /// Positions (into the evaluated value slice) this match consumed.
    pub indices: SmallVec<[usize; 6]>,

    /// Points this match is worth.
    pub points: i64,
}

/// Result of scoring a hand.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Total points across all accepted matches.
    pub total: i64,

    /// Every position that contributed to the total, ascending.
    pub contributing: SmallVec<[usize; 6]>,

    /// Accepted matches in claim order.
    pub breakdown: Vec<RuleMatch>,
}

impl Evaluation {
    /// Check if the hand scored at all.
    #[must_use]
    pub fn is_scoring(&self) -> bool {
        self.total > 0
    }
}

/// Pure scoring queries over a rule catalog.
#[derive(Clone, Debug)]
pub struct Evaluator<'a> {
    catalog: &'a RuleCatalog,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator over a catalog.
    #[must_use]
    pub fn new(catalog: &'a RuleCatalog) -> Self {
        Self { catalog }
    }

    /// Score a hand of die faces.
    ///
    /// Each rule is retried until it stops matching, so disjoint
    /// occurrences of the same rule (two triples, several singles) all
    /// score. Claimed positions are never offered to later rules.
    #[must_use]
    pub fn evaluate(&self, values: &[u8]) -> Evaluation {
        let mut claimed = vec![false; values.len()];
        let mut result = Evaluation::default();

        for rule in self.catalog.iter() {
            while let Some(m) = match_rule(rule, values, &claimed) {
                if m.points <= 0 {
                    break;
                }
                for &i in &m.indices {
                    claimed[i] = true;
                }
                result.total += m.points;
                result.breakdown.push(m);
            }
        }

        result.contributing = claimed
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| c.then_some(i))
            .collect();
        result
    }

    /// List every independent rule match, without claiming.
    ///
    /// Used for ambiguity analysis; the same die may appear in several
    /// matches here.
    #[must_use]
    pub fn evaluate_matches(&self, values: &[u8]) -> Vec<RuleMatch> {
        let unclaimed = vec![false; values.len()];
        let mut matches = Vec::new();

        for rule in self.catalog.iter() {
            match rule.kind {
                RuleKind::OfAKind { count } => {
                    // One independent match per face with enough dice.
                    for face in 1..=6u8 {
                        let indices: SmallVec<[usize; 6]> = positions_of(values, face)
                            .take(count)
                            .collect();
                        if indices.len() == count {
                            matches.push(RuleMatch {
                                key: rule.key,
                                combo_size: count,
                                points: rule.points_for_face(face),
                                indices,
                            });
                        }
                    }
                }
                _ => {
                    if let Some(m) = match_rule(rule, values, &unclaimed) {
                        if m.points > 0 {
                            matches.push(m);
                        }
                    }
                }
            }
        }

        matches
    }

    /// Decide whether a selection is exactly one unambiguous combo.
    ///
    /// Among matches that cover the entire selection, only the
    /// maximal-combo-size ones are kept; the selection is valid iff
    /// exactly one remains and its combo size equals the selection size.
    /// A selection mixing a scoring single with anything else fails this
    /// test even though every part scores on its own.
    #[must_use]
    pub fn is_single_combo(&self, selection: &[u8]) -> bool {
        if selection.is_empty() {
            return false;
        }

        let covering: Vec<RuleMatch> = self
            .evaluate_matches(selection)
            .into_iter()
            .filter(|m| m.indices.len() == selection.len())
            .collect();

        let Some(max_size) = covering.iter().map(|m| m.combo_size).max() else {
            return false;
        };

        let maximal: Vec<&RuleMatch> = covering
            .iter()
            .filter(|m| m.combo_size == max_size)
            .collect();

        maximal.len() == 1 && maximal[0].combo_size == selection.len()
    }

    /// The single-combo match for a selection, if there is exactly one.
    ///
    /// This is what a lock records: the rule key and raw points of the
    /// combo the selection represents.
    #[must_use]
    pub fn single_combo(&self, selection: &[u8]) -> Option<RuleMatch> {
        if !self.is_single_combo(selection) {
            return None;
        }
        self.evaluate_matches(selection)
            .into_iter()
            .filter(|m| m.indices.len() == selection.len())
            .max_by_key(|m| m.combo_size)
    }
}

/// Iterate positions of `face` within `values`.
fn positions_of(values: &[u8], face: u8) -> impl Iterator<Item = usize> + '_ {
    values
        .iter()
        .enumerate()
        .filter_map(move |(i, &v)| (v == face).then_some(i))
}

/// Try to match a rule against the unclaimed positions only.
///
/// Single-value rules consume every unclaimed die of their face in one
/// match; multi-die rules require their exact combo size.
fn match_rule(rule: &Rule, values: &[u8], claimed: &[bool]) -> Option<RuleMatch> {
    match rule.kind {
        RuleKind::Single { face } => {
            let indices: SmallVec<[usize; 6]> = positions_of(values, face)
                .filter(|&i| !claimed[i])
                .collect();
            if indices.is_empty() {
                return None;
            }
            let points = rule.points_for_face(face) * indices.len() as i64;
            Some(RuleMatch {
                key: rule.key,
                combo_size: rule.combo_size(),
                indices,
                points,
            })
        }
        RuleKind::OfAKind { count } => {
            // Prefer the highest-scoring face when several qualify.
            let mut best: Option<(i64, SmallVec<[usize; 6]>, u8)> = None;
            for face in 1..=6u8 {
                let indices: SmallVec<[usize; 6]> = positions_of(values, face)
                    .filter(|&i| !claimed[i])
                    .take(count)
                    .collect();
                if indices.len() == count {
                    let points = rule.points_for_face(face);
                    if best.as_ref().is_none_or(|(p, _, _)| points > *p) {
                        best = Some((points, indices, face));
                    }
                }
            }
            best.map(|(points, indices, _)| RuleMatch {
                key: rule.key,
                combo_size: count,
                indices,
                points,
            })
        }
        RuleKind::Straight { low, high } => {
            let mut indices: SmallVec<[usize; 6]> = SmallVec::new();
            for face in low..=high {
                let found = positions_of(values, face)
                    .find(|&i| !claimed[i] && !indices.contains(&i))?;
                indices.push(found);
            }
            Some(RuleMatch {
                key: rule.key,
                combo_size: rule.combo_size(),
                points: rule.points_for_face(low),
                indices,
            })
        }
    }
}
