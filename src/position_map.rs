//! The non-recursive position map: a total mapping from every logical
//! address to a leaf index, held entirely in client memory.
//!
//! Recursing the position map into an ORAM of its own is explicitly out of
//! scope for this crate; at the sizes this implementation targets it is
//! simplest, and faithful to the source algorithm, to keep it as a plain
//! in-memory table.

use rand::{CryptoRng, Rng, RngCore};

/// A total mapping from `[0, N)` to leaf indices in `[0, 2^L)`.
#[derive(Debug)]
pub struct PositionMap {
    leaves: Vec<u64>,
}

impl PositionMap {
    /// Builds a position map for `n` addresses, sampling each entry
    /// uniformly at random in `[0, num_leaves)`.
    pub fn new<R: RngCore + CryptoRng>(n: u64, num_leaves: u64, rng: &mut R) -> Self {
        let leaves = (0..n).map(|_| rng.gen_range(0..num_leaves)).collect();
        Self { leaves }
    }

    /// Returns the leaf address `a` is currently mapped to.
    pub fn get(&self, a: u64) -> u64 {
        self.leaves[a as usize]
    }

    /// Overwrites the leaf address `a` is mapped to.
    pub fn set(&mut self, a: u64, leaf: u64) {
        self.leaves[a as usize] = leaf;
    }
}
