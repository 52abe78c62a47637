//! Perturbation trait definition
//!
//! Base trait for all sample-domain perturbation stages.

use serde::Serialize;

use crate::dsp::random::RandomSource;
use crate::engine::AudioBuffer;
use crate::error::Result;

/// Wide-precision working copy of an [`AudioBuffer`]
///
/// Stages add and scale in `f64` so nothing clips or wraps until the final
/// quantize step.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// Interleaved samples
    pub samples: Vec<f64>,
    channels: usize,
}

impl Signal {
    pub fn new(samples: Vec<f64>, channels: usize) -> Self {
        Self { samples, channels }
    }

    pub fn from_buffer(buffer: &AudioBuffer) -> Self {
        Self {
            samples: buffer.samples().iter().map(|&s| s as f64).collect(),
            channels: buffer.num_channels() as usize,
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.channels.max(1)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> f64 {
        self.samples.iter().map(|s| s.abs()).fold(0.0, f64::max)
    }
}

/// What a stage did to the signal, including its random draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageOutcome {
    Noise { std_dev: f64 },
    Pitch { ratio: f64 },
    PitchSkipped { samples: usize },
    Volume { scale: f64 },
}

/// A single sample-domain perturbation
pub trait Perturbation: Send + Sync {
    /// Perturb the signal in place, drawing randomness from `rng`
    fn apply(&self, signal: &mut Signal, rng: &mut dyn RandomSource) -> Result<StageOutcome>;

    /// Stage identifier used in logs
    fn stage_type(&self) -> &'static str;
}
