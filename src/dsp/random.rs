//! Random sources for perturbation stages
//!
//! Stages never touch a global generator. Every draw goes through a
//! [`RandomSource`] handed in by the caller, so tests can pin the values.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Source of uniform and Gaussian draws
pub trait RandomSource {
    /// Draw uniformly from `[low, high]`
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Draw from a zero-mean normal distribution with the given std dev
    fn gaussian(&mut self, std_dev: f64) -> f64;
}

/// [`RandomSource`] backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RngSource<R: Rng> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// Generator seeded from the operating system
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible generator
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    fn gaussian(&mut self, std_dev: f64) -> f64 {
        if std_dev <= 0.0 {
            return 0.0;
        }
        let z: f64 = self.rng.sample(StandardNormal);
        z * std_dev
    }
}

/// Deterministic [`RandomSource`]
///
/// `uniform` returns `value` clamped into the requested range, and
/// `gaussian` returns `deviate * std_dev`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSource {
    pub value: f64,
    pub deviate: f64,
}

impl FixedSource {
    /// Fixed uniform draw, zero noise
    pub fn new(value: f64) -> Self {
        Self { value, deviate: 0.0 }
    }

    pub fn with_deviate(mut self, deviate: f64) -> Self {
        self.deviate = deviate;
        self
    }
}

impl RandomSource for FixedSource {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.value.max(low).min(high)
    }

    fn gaussian(&mut self, std_dev: f64) -> f64 {
        self.deviate * std_dev
    }
}
