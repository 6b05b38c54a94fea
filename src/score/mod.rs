//! Scoring/pending pipeline: contributions and the bank-time modifier
//! chain (selective per-part, then global multipliers).

mod modifiers;
mod pipeline;

pub use modifiers::{GlobalModifier, ScoreModifiers, SelectiveModifier};
pub use pipeline::{apply_modifiers, Contribution};
