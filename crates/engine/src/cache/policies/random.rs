//! Random Replacement Policy.
//!
//! This policy evicts a random cache line from the set. It uses a simple
//! xorshift generator to produce pseudo-random numbers, avoiding the overhead
//! of a complex RNG. The seed comes from the configuration so a trace replayed
//! twice evicts the same lines.

use super::ReplacementPolicy;
use crate::cache::meta::LineStore;
use crate::common::Access;

/// Random Policy state.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    /// Internal state for the pseudo-random number generator.
    state: u64,
}

impl RandomPolicy {
    /// Creates a new Random policy instance.
    ///
    /// # Arguments
    ///
    /// * `seed` - Initial generator state. Zero is replaced by a fixed
    ///   non-zero constant because xorshift never leaves the zero state.
    pub const fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl ReplacementPolicy for RandomPolicy {
    /// Access patterns do not affect random replacement, so this is a no-op.
    fn update(&mut self, _lines: &mut LineStore, _access: &Access) {}

    /// Maps the next pseudo-random number to a way index.
    fn get_victim(&mut self, lines: &mut LineStore, _set: usize) -> usize {
        (self.next() % lines.ways() as u64) as usize
    }
}
