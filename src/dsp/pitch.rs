//! Pitch Jitter
//!
//! Resamples the signal length by a ratio drawn uniformly from a range and
//! plays the result back at the original frame rate. Pitch and duration
//! move together: a ratio of 1.01 makes the file 1% longer and 1% lower.
//! There is no independent pitch-only shift.

use log::debug;

use crate::dsp::perturbation::{Perturbation, Signal, StageOutcome};
use crate::dsp::random::RandomSource;
use crate::error::{Result, SoundshiftError};

/// Buffers shorter than this many samples are left untouched
pub const DEFAULT_MIN_SAMPLES: usize = 1024;

/// Largest accepted resample ratio
pub const MAX_RATIO: f64 = 4.0;

/// Length resampling by a random ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchJitter {
    min_ratio: f64,
    max_ratio: f64,
    min_samples: usize,
}

impl PitchJitter {
    pub fn new(min_ratio: f64, max_ratio: f64, min_samples: usize) -> Self {
        Self {
            min_ratio,
            max_ratio,
            min_samples,
        }
    }
}

impl Perturbation for PitchJitter {
    fn apply(&self, signal: &mut Signal, rng: &mut dyn RandomSource) -> Result<StageOutcome> {
        if signal.len() < self.min_samples || signal.num_frames() < 2 {
            debug!(
                "Skipping pitch jitter: {} samples below threshold {}",
                signal.len(),
                self.min_samples
            );
            return Ok(StageOutcome::PitchSkipped {
                samples: signal.len(),
            });
        }

        let ratio = rng.uniform(self.min_ratio, self.max_ratio);
        let resampled = resample_frames(&signal.samples, signal.channels(), ratio)?;
        signal.samples = resampled;

        Ok(StageOutcome::Pitch { ratio })
    }

    fn stage_type(&self) -> &'static str {
        "pitch"
    }
}

/// Linear interpolation resampling of interleaved frames
///
/// Output holds `round(frames * ratio)` frames with every channel
/// interpolated at the same source position.
///
/// # Errors
/// * `Resample` - ratio is not in `(0, MAX_RATIO]`, channels is zero, or the
///   output length does not fit in memory
pub fn resample_frames(samples: &[f64], channels: usize, ratio: f64) -> Result<Vec<f64>> {
    if !ratio.is_finite() || ratio <= 0.0 || ratio > MAX_RATIO {
        return Err(SoundshiftError::Resample {
            reason: format!("ratio must be in (0, {}], got {}", MAX_RATIO, ratio),
        });
    }
    if channels == 0 {
        return Err(SoundshiftError::Resample {
            reason: "signal has no channels".to_string(),
        });
    }

    let source_frames = samples.len() / channels;
    if source_frames == 0 {
        return Ok(Vec::new());
    }

    let target_frames = ((source_frames as f64 * ratio).round() as usize).max(1);
    let capacity = target_frames
        .checked_mul(channels)
        .ok_or_else(|| SoundshiftError::Resample {
            reason: format!("{} frames x {} channels overflows", target_frames, channels),
        })?;
    let mut output = Vec::with_capacity(capacity);

    for i in 0..target_frames {
        // Map output frame to source position
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos.floor() as usize;
        let frac = src_pos - src_idx as f64;

        for ch in 0..channels {
            let sample = if src_idx + 1 < source_frames {
                let a = samples[src_idx * channels + ch];
                let b = samples[(src_idx + 1) * channels + ch];
                a * (1.0 - frac) + b * frac
            } else {
                samples[(source_frames - 1) * channels + ch]
            };
            output.push(sample);
        }
    }

    Ok(output)
}
