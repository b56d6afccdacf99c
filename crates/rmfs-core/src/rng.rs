//! Deterministic simulation RNG.
//!
//! # Determinism strategy
//!
//! The run owns one root `SimRng` seeded from `SimulationConfig::seed`.  Each
//! concern (pod placement, pod contents, robot spawn points, the random order
//! stream) draws from its own child stream derived with [`SimRng::child`], so
//! adding draws to one concern never shifts the values seen by another.
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive offsets uniformly across the seed space.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Simulation-level RNG.  Only used from the single simulation thread.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` for an independent concern.
    ///
    /// Unlike drawing from the parent, the child seed depends only on the
    /// parent's seed and `offset`, never on how many values the parent has
    /// already produced.
    pub fn child(seed: u64, offset: u64) -> SimRng {
        SimRng(SmallRng::seed_from_u64(seed ^ offset.wrapping_mul(MIXING_CONSTANT)))
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }

    /// Choose `amount` distinct elements from `slice` (fewer if the slice is
    /// shorter), in random order.
    pub fn choose_multiple<'a, T>(&mut self, slice: &'a [T], amount: usize) -> Vec<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose_multiple(&mut self.0, amount).collect()
    }
}
