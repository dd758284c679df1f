//! Reproducible primary-key assignment for stored articles
//!
//! Articles are keyed by a pseudo-random permutation of `[0, N)` so that
//! iteration order in the store is decoupled from document order in the dump,
//! while staying exactly reproducible for a given seed.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Default seed, inherited from the original corpus runs.
pub const DEFAULT_SEED: u64 = 513_598;

/// Assigns primary keys to articles via a seeded permutation
#[derive(Debug, Clone, Copy)]
pub struct KeyAssigner {
    seed: u64,
}

impl KeyAssigner {
    /// Create an assigner with an explicit seed
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Produce the permutation of `[0, n)` for this seed.
    ///
    /// The i-th encountered article receives `permutation(n)[i]` as its
    /// primary key. Same `(n, seed)` always yields the same permutation.
    pub fn permutation(&self, n: usize) -> Vec<i64> {
        let mut keys: Vec<i64> = (0..n as i64).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        keys.shuffle(&mut rng);
        keys
    }
}

impl Default for KeyAssigner {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}
