//! Rule catalog and evaluator.
//!
//! - `catalog`: scoring rules as data (keys, patterns, value tables)
//! - `evaluate`: pure scoring and single-combo ambiguity queries

mod catalog;
mod evaluate;

pub use catalog::{Rule, RuleCatalog, RuleCategory, RuleKey, RuleKind, RuleValue};
pub use evaluate::{Evaluation, Evaluator, RuleMatch};
