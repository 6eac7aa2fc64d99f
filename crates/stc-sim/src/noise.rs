//! Per-step Gaussian process noise.
//!
//! The random source is an explicit, seedable handle owned by the plant so
//! that runs are reproducible given a seed.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use stc_core::State;

use crate::error::{SimError, SimResult};

/// Zero-mean Gaussian white noise added component-wise to the state.
#[derive(Debug, Clone)]
pub struct GaussianNoise {
    std_dev: f64,
    rng: StdRng,
    distribution: Normal<f64>,
}

impl GaussianNoise {
    /// Create noise with standard deviation and optional seed.
    ///
    /// Without a seed the generator is seeded from OS entropy.
    pub fn new(std_dev: f64, seed: Option<u64>) -> SimResult<Self> {
        if !(std_dev.is_finite() && std_dev >= 0.0) {
            return Err(SimError::invalid(format!(
                "noise standard deviation must be finite and non-negative, got {std_dev}"
            )));
        }
        let distribution = Normal::new(0.0, std_dev)
            .map_err(|e| SimError::invalid(format!("noise distribution: {e}")))?;
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            std_dev,
            rng,
            distribution,
        })
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Restart the sequence from a new seed.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn sample(&mut self) -> f64 {
        self.distribution.sample(&mut self.rng)
    }

    /// Add an independent sample to every component of `x`.
    pub fn perturb(&mut self, x: &mut State) {
        for v in x.iter_mut() {
            *v += self.distribution.sample(&mut self.rng);
        }
    }
}
