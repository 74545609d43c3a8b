//! Seeded random number generation for demonstration models
//!
//! The kernel never draws randomness; delays reach it as plain scalars.
//! Models that want stochastic delays own one of these.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp};

/// Seeded RNG wrapper for deterministic simulation
#[derive(Debug, Clone)]
pub struct SimRng {
    rng: ChaCha8Rng,
}

impl SimRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate a random f64 in [0, 1)
    pub fn gen_f64(&mut self) -> f64 {
        self.rng.gen()
    }

    /// Generate a uniform random variable
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        self.rng.gen_range(min..max)
    }

    /// Generate an exponential random variable with the given mean
    ///
    /// Used for inter-arrival and service times in queueing models.
    pub fn exponential(&mut self, mean: f64) -> f64 {
        if mean <= 0.0 {
            return 0.0;
        }
        let exp = Exp::new(1.0 / mean).unwrap();
        exp.sample(&mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = SimRng::new(42);
        let mut rng2 = SimRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.gen_f64(), rng2.gen_f64());
        }
    }

    #[test]
    fn test_exponential_mean() {
        let mut rng = SimRng::new(42);

        let mean = 2.0;
        let samples: Vec<f64> = (0..10000).map(|_| rng.exponential(mean)).collect();
        let actual_mean: f64 = samples.iter().sum::<f64>() / samples.len() as f64;

        assert!((actual_mean - mean).abs() < 0.1);
        assert!(samples.iter().all(|s| *s >= 0.0));
    }
}
