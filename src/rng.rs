//! Deterministic random number generation for dice rolls.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical roll sequence
//! - **Serializable**: O(1) state capture and restore for checkpointing
//!
//! ## Usage
//!
//! ```
//! use greed_core::GameRng;
//!
//! let mut rng = GameRng::new(42);
//! let face = rng.die();
//! assert!((1..=6).contains(&face));
//!
//! // Same seed replays the same game.
//! let mut replay = GameRng::new(42);
//! assert_eq!(replay.die(), face);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG for dice rolls.
///
/// Uses ChaCha8 for speed while maintaining high-quality randomness.
/// The full state can be captured and restored in O(1) via the ChaCha
/// word position, so checkpoints stay cheap no matter how many rolls
/// have happened.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Roll a single die face, uniform in `1..=6`.
    pub fn die(&mut self) -> u8 {
        self.inner.gen_range(1..=6)
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG state for checkpointing.
///
/// Uses the ChaCha8 word position for O(1) serialization regardless of
/// how many random numbers have been generated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}
