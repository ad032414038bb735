//! Injectable randomness for non-deterministic rules

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Decides whether an event with the given probability happens on this call
pub trait ChanceSource {
    fn roll(&mut self, probability: f64) -> bool;
}

/// Chance source backed by a `rand` generator
pub struct RngChance<R: Rng> {
    rng: R,
}

impl<R: Rng> RngChance<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngChance<StdRng> {
    /// Seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible sequence for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ChanceSource for RngChance<R> {
    fn roll(&mut self, probability: f64) -> bool {
        // Uniform draw in [0, 1): 0.0 never fires, 1.0 always does
        self.rng.gen::<f64>() < probability
    }
}

/// Chance source with a fixed outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedChance(pub bool);

impl FixedChance {
    pub fn always() -> Self {
        Self(true)
    }

    pub fn never() -> Self {
        Self(false)
    }
}

impl ChanceSource for FixedChance {
    fn roll(&mut self, _probability: f64) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_chance_ignores_probability() {
        assert!(FixedChance::always().roll(0.0));
        assert!(!FixedChance::never().roll(1.0));
    }

    #[test]
    fn test_rng_chance_bounds() {
        let mut chance = RngChance::seeded(7);
        for _ in 0..1000 {
            assert!(!chance.roll(0.0));
            assert!(chance.roll(1.0));
        }
    }

    #[test]
    fn test_rng_chance_frequency() {
        let mut chance = RngChance::seeded(42);
        let fired = (0..10_000).filter(|_| chance.roll(0.2)).count();

        // 0.2 * 10k = 2000, allow a wide margin
        assert!(fired > 1700 && fired < 2300, "fired {} times", fired);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = RngChance::seeded(99);
        let mut b = RngChance::seeded(99);
        let run_a: Vec<bool> = (0..50).map(|_| a.roll(0.5)).collect();
        let run_b: Vec<bool> = (0..50).map(|_| b.roll(0.5)).collect();
        assert_eq!(run_a, run_b);
    }
}
