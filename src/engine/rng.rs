//! Injectable random source for the toss, outcome resolution and conditions.
//!
//! Production matches use a seeded ChaCha stream so a match can be replayed
//! from its seed; tests feed exact draws through [`SequenceRandom`].

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Source of uniform draws.
pub trait RandomSource: Send + Sync {
    /// Uniform value in `[0, bound)`. Returns 0 when `bound` is 0.
    fn next_below(&mut self, bound: u32) -> u32;

    /// Fair coin: `true` means heads.
    fn coin_flip(&mut self) -> bool {
        self.next_below(2) == 0
    }
}

/// Pick one element uniformly. `None` for an empty slice.
pub fn pick<'a, T>(rng: &mut dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let len = u32::try_from(items.len()).unwrap_or(u32::MAX);
    items.get(rng.next_below(len) as usize)
}

/// Deterministic stream seeded from a u64.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Fresh seed from the thread RNG. Returns the seed so it can be logged.
    pub fn from_entropy() -> (Self, u64) {
        let seed: u64 = rand::random();
        (Self::new(seed), seed)
    }
}

impl RandomSource for SeededRandom {
    fn next_below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        // Rejection sampling keeps the draw unbiased.
        let zone = u32::MAX - (u32::MAX % bound);
        loop {
            let v = self.rng.next_u32();
            if v < zone {
                return v % bound;
            }
        }
    }
}

/// Replays a fixed list of draws (each taken modulo the bound), then zeros.
#[derive(Debug, Clone, Default)]
pub struct SequenceRandom {
    values: VecDeque<u32>,
}

impl SequenceRandom {
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn push(&mut self, value: u32) {
        self.values.push_back(value);
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for SequenceRandom {
    fn next_below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.values.pop_front().map(|v| v % bound).unwrap_or(0)
    }
}
