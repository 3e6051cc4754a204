//! Randomness used by study sessions, injectable for deterministic tests

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::models::StudyCard;

pub trait RandomSource: Send {
    /// Uniform integer in `0..upper`, or 0 when `upper` is 0
    fn below(&mut self, upper: usize) -> usize;

    /// Uniform random permutation
    fn shuffle(&mut self, cards: &mut [StudyCard]);
}

/// A `RandomSource` backed by any `rand` generator
pub struct RngSource<R>(R);

impl RngSource<StdRng> {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> RandomSource for RngSource<R> {
    fn below(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        self.0.gen_range(0..upper)
    }

    fn shuffle(&mut self, cards: &mut [StudyCard]) {
        cards.shuffle(&mut self.0);
    }
}
