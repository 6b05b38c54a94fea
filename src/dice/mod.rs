//! Dice set: the physical dice, their flags, and the roll operation.

mod set;

pub use set::{DiceSet, Die, DICE_COUNT};
