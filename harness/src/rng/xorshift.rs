//! xorshift64* random number generator
//!
//! A fast, high-quality PRNG that is deterministic and suitable for
//! simulation experiments.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. This is CRITICAL for:
//! - Replication (replication `i` reseeds with base seed + i)
//! - Testing (two runs with identical input produce identical output files)

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use sweep_harness_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let range_value = rng.range(0, 100); // [0, 100)
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

/// Scramble a seed into an initial state (splitmix64 finalizer).
///
/// The finalizer is a bijection, so distinct seeds always produce
/// distinct states. Seed 0 lands on a nonzero state, and adjacent seeds
/// (the base-plus-replication-index scheme) diverge immediately instead
/// of starting from nearly identical low-entropy states.
fn mix_seed(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    let state = z ^ (z >> 31);
    // xorshift requires nonzero state; exactly one seed maps here
    if state == 0 {
        1
    } else {
        state
    }
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// The seed is scrambled before use; any seed (including 0) yields a
    /// valid state, and different seeds yield different streams.
    pub fn new(seed: u64) -> Self {
        Self {
            state: mix_seed(seed),
        }
    }

    /// Reseed the generator in place
    ///
    /// Replications reseed the model's stream with base seed plus the
    /// replication index rather than constructing a fresh generator.
    pub fn reseed(&mut self, seed: u64) {
        self.state = mix_seed(seed);
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = (max - min) as u64;
        min + (value % range_size) as i64
    }

    /// Generate random f64 in range [0.0, 1.0)
    ///
    /// The basis for every continuous distribution draw in the sampler.
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        // Convert to [0.0, 1.0) using the top 53 bits
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Get current RNG state (for diagnostics/replay)
    pub fn get_state(&self) -> u64 {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_seed_converted_to_nonzero() {
        let rng = RngManager::new(0);
        assert_ne!(rng.get_state(), 0, "Zero seed must map to a valid state");
    }

    #[test]
    fn test_adjacent_seeds_get_distinct_streams() {
        // seeds 0 and 1 must not collapse onto one state
        let mut a = RngManager::new(0);
        let mut b = RngManager::new(1);
        assert_ne!(a.get_state(), b.get_state());
        assert_ne!(a.next(), b.next());

        let mut rng = RngManager::new(42);
        rng.reseed(0);
        let from_zero = rng.get_state();
        rng.reseed(1);
        assert_ne!(from_zero, rng.get_state());
    }

    #[test]
    #[should_panic(expected = "min must be less than max")]
    fn test_range_invalid_bounds() {
        let mut rng = RngManager::new(12345);
        rng.range(100, 50); // min > max should panic
    }

    #[test]
    fn test_next_f64_in_range() {
        let mut rng = RngManager::new(12345);

        for _ in 0..1000 {
            let val = rng.next_f64();
            assert!(
                val >= 0.0 && val < 1.0,
                "next_f64() produced value {} outside [0.0, 1.0)",
                val
            );
        }
    }

    #[test]
    fn test_next_f64_deterministic() {
        let mut rng1 = RngManager::new(99999);
        let mut rng2 = RngManager::new(99999);

        for _ in 0..100 {
            let val1 = rng1.next_f64();
            let val2 = rng2.next_f64();
            assert_eq!(val1, val2, "next_f64() not deterministic");
        }
    }

    #[test]
    fn test_reseed_replays_sequence() {
        let mut rng = RngManager::new(42);
        let first: Vec<u64> = (0..10).map(|_| rng.next()).collect();

        rng.reseed(42);
        let second: Vec<u64> = (0..10).map(|_| rng.next()).collect();

        assert_eq!(first, second, "reseed() should replay the same sequence");
    }
}
