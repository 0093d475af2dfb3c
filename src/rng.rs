//! Random source for mine placement.
//!
//! Uses the `rand` crate with `SmallRng` (xoshiro256++). Unseeded boards draw
//! their seed from the OS, which on wasm32 goes through `getrandom`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A seedable RNG used to lay out random boards.
///
/// Seed it for reproducible boards in tests and replays.
pub struct BoardRng {
    inner: SmallRng,
}

impl BoardRng {
    /// Seed from system entropy.
    pub fn from_entropy() -> Self {
        Self {
            inner: SmallRng::from_os_rng(),
        }
    }

    /// Create with a specific seed for deterministic layouts.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    /// `from_seed` when a seed is given, `from_entropy` otherwise.
    pub fn seeded_or_random(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::from_seed)
    }

    /// Generate a random usize in [0, max).
    #[inline(always)]
    pub fn gen_range(&mut self, max: usize) -> usize {
        self.inner.random_range(0..max)
    }

    /// `amount` distinct indices from `0..length` in random order.
    ///
    /// Asking for more than `length` returns every index.
    pub fn sample_indices(&mut self, length: usize, amount: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.inner, length, amount.min(length)).into_vec()
    }
}
