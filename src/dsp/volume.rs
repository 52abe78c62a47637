//! Volume Jitter
//!
//! Multiplies the whole buffer by one scalar drawn uniformly from a range.

use crate::dsp::perturbation::{Perturbation, Signal, StageOutcome};
use crate::dsp::random::RandomSource;
use crate::error::Result;

/// Uniform gain drawn from `[min_scale, max_scale]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeJitter {
    min_scale: f64,
    max_scale: f64,
}

impl VolumeJitter {
    pub fn new(min_scale: f64, max_scale: f64) -> Self {
        Self {
            min_scale,
            max_scale,
        }
    }
}

impl Perturbation for VolumeJitter {
    fn apply(&self, signal: &mut Signal, rng: &mut dyn RandomSource) -> Result<StageOutcome> {
        let scale = rng.uniform(self.min_scale, self.max_scale);

        // Unity gain optimization
        if scale != 1.0 {
            for sample in signal.samples.iter_mut() {
                *sample *= scale;
            }
        }

        Ok(StageOutcome::Volume { scale })
    }

    fn stage_type(&self) -> &'static str {
        "volume"
    }
}
