//! Deterministic per-cell random scalars.
//!
//! The field is a pure function of `(x, y, t)`, so cells can be evaluated in
//! any order and on any thread within a tick.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Source of uniform values in `[0, 1)` keyed by coordinate and time phase
pub trait RandomField: Send + Sync {
    fn sample(&self, x: i64, y: i64, t: u64) -> f32;
}

/// Stateless integer-hash field keyed by a seed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashField {
    seed: u64,
}

impl HashField {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[inline]
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl RandomField for HashField {
    #[inline]
    fn sample(&self, x: i64, y: i64, t: u64) -> f32 {
        let h = splitmix64(t ^ self.seed);
        let h = splitmix64(h ^ (y as u64).wrapping_mul(0xD6E8_FEB8_6659_FD93));
        let h = splitmix64(h ^ (x as u64).wrapping_mul(0xA076_1D64_78BD_642F));
        // Top 24 bits are exact in f32 and stay below 1.0
        (h >> 40) as f32 / (1u64 << 24) as f32
    }
}

/// How the field's time input advances each tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeMode {
    /// `t` equals the tick index
    #[default]
    Monotonic,
    /// `t` is a fresh random draw every tick
    Randomized,
}

/// Produces the per-tick time phase
#[derive(Clone, Debug)]
pub struct PhaseClock {
    mode: TimeMode,
    rng: ChaCha8Rng,
    last: Option<u64>,
}

impl PhaseClock {
    pub fn new(mode: TimeMode, rng: ChaCha8Rng) -> Self {
        Self {
            mode,
            rng,
            last: None,
        }
    }

    /// Phase for the given tick; never repeats the previous phase
    pub fn advance(&mut self, tick: u64) -> u64 {
        let phase = match self.mode {
            TimeMode::Monotonic => tick,
            TimeMode::Randomized => loop {
                let candidate: u64 = self.rng.gen();
                if Some(candidate) != self.last {
                    break candidate;
                }
            },
        };
        self.last = Some(phase);
        phase
    }

    pub fn mode(&self) -> TimeMode {
        self.mode
    }
}

/// Offset a phase onto an independent stream
#[inline]
pub fn stream(t: u64, index: u64) -> u64 {
    t.wrapping_add(index.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}
