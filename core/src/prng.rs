use serde::{Deserialize, Serialize};

/// Mulberry32, a deterministic 32-bit PRNG.
/// Pure function: returns (value_in_0_1, next_state).
pub fn prng_next(state: u32) -> (f64, u32) {
    let mut t = state.wrapping_add(0x6d2b79f5);
    let next_state = t;
    t = (t ^ (t >> 15)).wrapping_mul(t | 1);
    t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
    let value = (t ^ (t >> 14)) as f64 / 4294967296.0;
    (value, next_state)
}

/// Source of uniform randomness for everything the race rolls: AI
/// parameters, item draws, lure targets, item-box spacing.
pub trait RandomSource {
    /// Uniform value in [0, 1).
    fn next_unit(&mut self) -> f64;

    /// Uniform value in [min, max).
    fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_unit() * (max - min)
    }

    /// Uniform integer in [min, max] inclusive.
    fn int_range(&mut self, min: i32, max: i32) -> i32 {
        let range = (max - min + 1) as f64;
        min + (self.next_unit() * range).floor() as i32
    }

    /// Uniform index in [0, len).
    fn index(&mut self, len: usize) -> usize {
        ((self.next_unit() * len as f64) as usize).min(len.saturating_sub(1))
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.next_unit() < probability
    }
}

/// Seedable session RNG. The state serializes so a session snapshot
/// resumes the same sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mulberry32 {
    pub state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Mulberry32 { state: seed }
    }

    /// Raw 32-bit draw, used to derive child seeds.
    pub fn next_u32(&mut self) -> u32 {
        (self.next_unit() * 4294967296.0) as u32
    }
}

impl RandomSource for Mulberry32 {
    fn next_unit(&mut self) -> f64 {
        let (value, next) = prng_next(self.state);
        self.state = next;
        value
    }
}
