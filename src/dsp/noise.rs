//! Noise Injection
//!
//! Adds independent zero-mean Gaussian noise to every sample. The standard
//! deviation is a fraction of the signal's peak absolute value, so louder
//! material gets proportionally louder noise.

use crate::dsp::perturbation::{Perturbation, Signal, StageOutcome};
use crate::dsp::random::RandomSource;
use crate::error::Result;

/// Gaussian noise scaled to the signal peak
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseInjection {
    fraction: f64,
}

impl NoiseInjection {
    /// # Arguments
    /// * `fraction` - noise std dev relative to peak (e.g. 0.001 = 0.1%)
    pub fn new(fraction: f64) -> Self {
        Self { fraction }
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }
}

impl Perturbation for NoiseInjection {
    fn apply(&self, signal: &mut Signal, rng: &mut dyn RandomSource) -> Result<StageOutcome> {
        let std_dev = self.fraction * signal.peak();

        if std_dev > 0.0 {
            for sample in signal.samples.iter_mut() {
                *sample += rng.gaussian(std_dev);
            }
        }

        Ok(StageOutcome::Noise { std_dev })
    }

    fn stage_type(&self) -> &'static str {
        "noise"
    }
}
