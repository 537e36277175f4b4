//! Randomized spacing between flashes.
//!
//! The first flash lands quickly; every later one is drawn from one of two
//! windows so the period never settles into something a viewer could
//! anticipate.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::clock::Millis;

/// Half-open `[min, max)` window in milliseconds.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DelayRange {
    pub min: Millis,
    pub max: Millis,
}

impl DelayRange {
    pub const fn new(min: Millis, max: Millis) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, delay: Millis) -> bool {
        delay >= self.min && delay < self.max
    }

    pub fn is_empty(&self) -> bool {
        self.max <= self.min
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct DelayTiers {
    pub first: DelayRange,
    pub common: DelayRange,
    /// Probability of drawing from `common` rather than `rare`.
    pub common_probability: f64,
    pub rare: DelayRange,
}

impl Default for DelayTiers {
    fn default() -> Self {
        Self {
            first: DelayRange::new(0, 2_000),
            common: DelayRange::new(4_000, 7_000),
            common_probability: 0.75,
            rare: DelayRange::new(7_000, 9_000),
        }
    }
}

#[derive(Debug)]
pub struct FlashIntervals {
    tiers: DelayTiers,
    rng: StdRng,
}

impl FlashIntervals {
    pub fn new(tiers: DelayTiers, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { tiers, rng }
    }

    pub fn first_delay(&mut self) -> Millis {
        let range = self.tiers.first;
        self.sample(range)
    }

    pub fn next_delay(&mut self) -> Millis {
        let range = if self.rng.random::<f64>() < self.tiers.common_probability
        {
            self.tiers.common
        } else {
            self.tiers.rare
        };
        self.sample(range)
    }

    /// Uniform cell index in `[0, len)`. Repeats are allowed.
    pub fn cell(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.rng.random_range(0..len)
    }

    fn sample(&mut self, range: DelayRange) -> Millis {
        if range.is_empty() {
            return range.min;
        }
        self.rng.random_range(range.min..range.max)
    }
}
