//! Seeded PCG64 handle for the sampling code.
//!
//! Every draw goes through an explicit [`SimRng`] owned by the caller; there
//! is no thread-local or global generator. A seed fixes the whole sequence,
//! and [`SimRng::partition`] hands out child handles whose sequences depend
//! only on the seed and the child's position, so convergence trials can run
//! in any order and still reproduce.

use rand::prelude::*;
use rand_pcg::Pcg64;

/// Golden-ratio increment used to derive partition seeds.
const STREAM_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seeded generator; the only randomness source in the crate.
#[derive(Debug, Clone)]
pub struct SimRng {
    master_seed: u64,
    /// Stream number; advanced by `partition`.
    stream: u64,
    rng: Pcg64,
}

impl SimRng {
    /// Seed a fresh generator.
    #[must_use]
    pub fn new(master_seed: u64) -> Self {
        Self {
            master_seed,
            stream: 0,
            rng: Pcg64::seed_from_u64(master_seed),
        }
    }

    /// Seed this handle (or its parent) was created with.
    #[must_use]
    pub const fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Split off `n` child generators, one per trial.
    ///
    /// Child `i` of the `k`-th call is seeded from the master seed and its
    /// running stream number alone; drawing from the parent or from other
    /// children does not change it.
    ///
    /// ```rust
    /// use physdemo::engine::rng::SimRng;
    ///
    /// let mut rng = SimRng::new(42);
    /// let trials = rng.partition(4);
    /// assert_eq!(trials.len(), 4);
    /// ```
    #[must_use]
    pub fn partition(&mut self, n: usize) -> Vec<Self> {
        let first = self.stream + 1;
        self.stream += n as u64;

        (first..=self.stream)
            .map(|stream| {
                let seed = self
                    .master_seed
                    .wrapping_add(stream.wrapping_mul(STREAM_SPACING));
                Self {
                    master_seed: self.master_seed,
                    stream,
                    rng: Pcg64::seed_from_u64(seed),
                }
            })
            .collect()
    }

    /// Uniform draw in `[0, 1)`.
    pub fn gen_f64(&mut self) -> f64 {
        self.rng.gen()
    }

    /// Uniform draw in `[min, max)`.
    ///
    /// # Panics
    ///
    /// If `min > max`.
    pub fn gen_range_f64(&mut self, min: f64, max: f64) -> f64 {
        assert!(min <= max, "gen_range_f64: empty range [{min}, {max})");
        min + (max - min) * self.gen_f64()
    }
}
