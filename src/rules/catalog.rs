//! Scoring rule definitions.
//!
//! Rules are stateless data: a stable key, the pattern they match, and
//! their point value. The evaluator never hardcodes point values - they
//! all live in the catalog, so reward tuning is a data change.

use serde::{Deserialize, Serialize};

/// Stable identifier for a scoring rule.
///
/// Keys survive catalog reordering; pending contributions and modifiers
/// refer to rules by key, never by catalog position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleKey(pub u32);

impl RuleKey {
    /// Create a new rule key.
    #[must_use]
    pub const fn new(key: u32) -> Self {
        Self(key)
    }

    /// Get the raw key value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for RuleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rule({})", self.0)
    }
}

/// Broad rule family, used by selective modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleCategory {
    /// A lone scoring face (1s and 5s in the standard table).
    Single,
    /// N dice showing the same face.
    OfAKind,
    /// A run of consecutive faces.
    Straight,
}

/// The pattern a rule matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleKind {
    /// A single die showing `face`. Each matching die scores once.
    Single { face: u8 },
    /// Exactly `count` dice showing the same face.
    OfAKind { count: usize },
    /// One die of every face in `low..=high`.
    Straight { low: u8, high: u8 },
}

/// Point value of a rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleValue {
    /// Fixed points regardless of face.
    Flat(i64),
    /// Points indexed by face (index 0 = face 1).
    PerFace([i64; 6]),
}

/// An atomic scoring pattern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Stable identifier.
    pub key: RuleKey,

    /// Human-readable name (for debugging/display).
    pub name: String,

    /// The pattern this rule matches.
    pub kind: RuleKind,

    /// Point value or per-face value table.
    pub value: RuleValue,
}

impl Rule {
    /// Create a new rule.
    pub fn new(key: RuleKey, name: impl Into<String>, kind: RuleKind, value: RuleValue) -> Self {
        Self {
            key,
            name: name.into(),
            kind,
            value,
        }
    }

    /// The exact number of dice this rule consumes when it fires.
    ///
    /// Single-value rules consume one die per occurrence.
    #[must_use]
    pub fn combo_size(&self) -> usize {
        match self.kind {
            RuleKind::Single { .. } => 1,
            RuleKind::OfAKind { count } => count,
            RuleKind::Straight { low, high } => (high - low + 1) as usize,
        }
    }

    /// The rule's family.
    #[must_use]
    pub fn category(&self) -> RuleCategory {
        match self.kind {
            RuleKind::Single { .. } => RuleCategory::Single,
            RuleKind::OfAKind { .. } => RuleCategory::OfAKind,
            RuleKind::Straight { .. } => RuleCategory::Straight,
        }
    }

    /// Points for one firing on the given face.
    #[must_use]
    pub fn points_for_face(&self, face: u8) -> i64 {
        match self.value {
            RuleValue::Flat(points) => points,
            RuleValue::PerFace(table) => table[(face - 1) as usize],
        }
    }
}

/// The set of rules in play, ordered by descending combo size.
///
/// The ordering is load-bearing: the evaluator claims dice greedily in
/// catalog order, which is what lets a full straight suppress partial
/// straights and a four-of-a-kind suppress its three-of-a-kind subset.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
}

impl RuleCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The conventional push-your-luck table.
    ///
    /// Singles: 1 = 100, 5 = 50. Three-of-a-kind: face x 100 with
    /// 1s = 1000; four/five/six-of-a-kind at 2x/3x/4x the triple.
    /// Straights: 1-5 = 500, 2-6 = 750, 1-6 = 1500.
    #[must_use]
    pub fn standard() -> Self {
        let mut catalog = Self::new();

        catalog.add(Rule::new(
            RuleKey::new(1),
            "Full straight",
            RuleKind::Straight { low: 1, high: 6 },
            RuleValue::Flat(1500),
        ));
        catalog.add(Rule::new(
            RuleKey::new(2),
            "High straight",
            RuleKind::Straight { low: 2, high: 6 },
            RuleValue::Flat(750),
        ));
        catalog.add(Rule::new(
            RuleKey::new(3),
            "Low straight",
            RuleKind::Straight { low: 1, high: 5 },
            RuleValue::Flat(500),
        ));
        catalog.add(Rule::new(
            RuleKey::new(4),
            "Six of a kind",
            RuleKind::OfAKind { count: 6 },
            RuleValue::PerFace([4000, 800, 1200, 1600, 2000, 2400]),
        ));
        catalog.add(Rule::new(
            RuleKey::new(5),
            "Five of a kind",
            RuleKind::OfAKind { count: 5 },
            RuleValue::PerFace([3000, 600, 900, 1200, 1500, 1800]),
        ));
        catalog.add(Rule::new(
            RuleKey::new(6),
            "Four of a kind",
            RuleKind::OfAKind { count: 4 },
            RuleValue::PerFace([2000, 400, 600, 800, 1000, 1200]),
        ));
        catalog.add(Rule::new(
            RuleKey::new(7),
            "Three of a kind",
            RuleKind::OfAKind { count: 3 },
            RuleValue::PerFace([1000, 200, 300, 400, 500, 600]),
        ));
        catalog.add(Rule::new(
            RuleKey::new(8),
            "Single one",
            RuleKind::Single { face: 1 },
            RuleValue::Flat(100),
        ));
        catalog.add(Rule::new(
            RuleKey::new(9),
            "Single five",
            RuleKind::Single { face: 5 },
            RuleValue::Flat(50),
        ));

        catalog
    }

    /// Add a rule, keeping the descending combo-size order.
    ///
    /// Equal combo sizes keep insertion order, so ties resolve to the
    /// earlier-added rule.
    pub fn add(&mut self, rule: Rule) {
        let pos = self
            .rules
            .iter()
            .position(|r| r.combo_size() < rule.combo_size())
            .unwrap_or(self.rules.len());
        self.rules.insert(pos, rule);
    }

    /// Look up a rule by key.
    #[must_use]
    pub fn get(&self, key: RuleKey) -> Option<&Rule> {
        self.rules.iter().find(|r| r.key == key)
    }

    /// Iterate rules in claim order (descending combo size).
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_key() {
        let key = RuleKey::new(7);
        assert_eq!(key.raw(), 7);
        assert_eq!(format!("{}", key), "Rule(7)");
    }

    #[test]
    fn test_combo_sizes() {
        let catalog = RuleCatalog::standard();

        let full = catalog.get(RuleKey::new(1)).unwrap();
        assert_eq!(full.combo_size(), 6);
        assert_eq!(full.category(), RuleCategory::Straight);

        let triple = catalog.get(RuleKey::new(7)).unwrap();
        assert_eq!(triple.combo_size(), 3);
        assert_eq!(triple.category(), RuleCategory::OfAKind);

        let one = catalog.get(RuleKey::new(8)).unwrap();
        assert_eq!(one.combo_size(), 1);
        assert_eq!(one.category(), RuleCategory::Single);
    }

    #[test]
    fn test_per_face_values() {
        let catalog = RuleCatalog::standard();
        let triple = catalog.get(RuleKey::new(7)).unwrap();

        assert_eq!(triple.points_for_face(1), 1000);
        assert_eq!(triple.points_for_face(2), 200);
        assert_eq!(triple.points_for_face(6), 600);
    }

    #[test]
    fn test_catalog_ordered_by_descending_combo_size() {
        let catalog = RuleCatalog::standard();
        let sizes: Vec<usize> = catalog.iter().map(Rule::combo_size).collect();

        let mut sorted = sizes.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(sizes, sorted);
    }

    #[test]
    fn test_add_keeps_order() {
        let mut catalog = RuleCatalog::new();
        catalog.add(Rule::new(
            RuleKey::new(1),
            "Single",
            RuleKind::Single { face: 1 },
            RuleValue::Flat(100),
        ));
        catalog.add(Rule::new(
            RuleKey::new(2),
            "Triple",
            RuleKind::OfAKind { count: 3 },
            RuleValue::Flat(300),
        ));

        let keys: Vec<RuleKey> = catalog.iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![RuleKey::new(2), RuleKey::new(1)]);
    }

    #[test]
    fn test_catalog_serde() {
        let catalog = RuleCatalog::standard();
        let json = serde_json::to_string(&catalog).unwrap();
        let back: RuleCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(catalog.len(), back.len());
        assert_eq!(catalog.get(RuleKey::new(7)), back.get(RuleKey::new(7)));
    }
}
