//! Perturbation chain
//!
//! Stages run in list order on a wide-precision copy of the buffer, then
//! the result is quantized back to the source sample width. Presets differ
//! only in which stages the list holds.

use log::debug;

use super::{NoiseInjection, Perturbation, PitchJitter, RandomSource, Signal, StageOutcome, VolumeJitter};
use crate::config::{PerturbationParams, StageConfig};
use crate::dsp::quantize::quantize;
use crate::engine::AudioBuffer;
use crate::error::Result;

/// Ordered list of perturbation stages
pub struct PerturbationChain {
    stages: Vec<Box<dyn Perturbation>>,
}

impl PerturbationChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Build the chain described by `params`, validating it first
    pub fn from_params(params: &PerturbationParams) -> Result<Self> {
        params.validate()?;

        let mut chain = Self::new();
        for stage in &params.stages {
            chain.add(build_stage(stage));
        }
        Ok(chain)
    }

    /// Append a stage to the end of the chain
    pub fn add(&mut self, stage: Box<dyn Perturbation>) {
        self.stages.push(stage);
    }

    /// Run every stage over a copy of `buffer`
    ///
    /// Stops at the first failing stage.
    ///
    /// # Returns
    /// The perturbed buffer in the source format, and one outcome per stage
    pub fn process(
        &self,
        buffer: &AudioBuffer,
        rng: &mut dyn RandomSource,
    ) -> Result<(AudioBuffer, Vec<StageOutcome>)> {
        let mut signal = Signal::from_buffer(buffer);
        let mut outcomes = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let outcome = stage.apply(&mut signal, rng)?;
            debug!("Stage {}: {:?}", stage.stage_type(), outcome);
            outcomes.push(outcome);
        }

        let output = quantize(&signal, buffer)?;
        Ok((output, outcomes))
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage identifiers in order
    pub fn stage_types(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.stage_type()).collect()
    }
}

impl Default for PerturbationChain {
    fn default() -> Self {
        Self::new()
    }
}

fn build_stage(config: &StageConfig) -> Box<dyn Perturbation> {
    match *config {
        StageConfig::Noise { fraction } => Box::new(NoiseInjection::new(fraction)),
        StageConfig::Pitch {
            min_ratio,
            max_ratio,
            min_samples,
        } => Box::new(PitchJitter::new(min_ratio, max_ratio, min_samples)),
        StageConfig::Volume {
            min_scale,
            max_scale,
        } => Box::new(VolumeJitter::new(min_scale, max_scale)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::random::{FixedSource, RngSource};
    use crate::engine::buffer::sample_range;
    use crate::engine::OutputFormat;
    use crate::config::OutputSettings;

    fn sine(frames: usize, amplitude: f64) -> AudioBuffer {
        let samples = (0..frames)
            .map(|i| (amplitude * (i as f64 * 0.05).sin()).round() as i32)
            .collect();
        AudioBuffer::new(samples, 1, 2, 44100).unwrap()
    }

    #[test]
    fn test_chain_from_presets() {
        let full = PerturbationChain::from_params(&PerturbationParams::full()).unwrap();
        assert_eq!(full.stage_types(), vec!["noise", "pitch", "volume"]);

        let simplified = PerturbationChain::from_params(&PerturbationParams::simplified()).unwrap();
        assert_eq!(simplified.stage_types(), vec!["noise", "volume"]);
    }

    #[test]
    fn test_empty_chain_passthrough() {
        let chain = PerturbationChain::new();
        assert!(chain.is_empty());

        let input = sine(2000, 10000.0);
        let (output, outcomes) = chain.process(&input, &mut RngSource::seeded(3)).unwrap();

        assert!(outcomes.is_empty());
        assert_eq!(output, input);
    }

    #[test]
    fn test_output_never_exceeds_range() {
        // Full-scale input with maximum volume boost and noise must saturate
        let input = AudioBuffer::new(vec![32767, -32768, 32767, -32768], 1, 2, 8000).unwrap();
        let params = PerturbationParams {
            stages: vec![
                StageConfig::Noise { fraction: 0.05 },
                StageConfig::Volume {
                    min_scale: 1.03,
                    max_scale: 1.03,
                },
            ],
            output: OutputSettings {
                format: OutputFormat::Wav,
                bitrate: None,
            },
        };
        let chain = PerturbationChain::from_params(&params).unwrap();

        let mut rng = FixedSource::new(1.03).with_deviate(0.5);
        let (output, _) = chain.process(&input, &mut rng).unwrap();

        let (min, max) = sample_range(2);
        assert!(output
            .samples()
            .iter()
            .all(|&s| (s as i64) >= min && (s as i64) <= max));
        assert_eq!(output.samples()[0], 32767);
        assert_eq!(output.samples()[1], -32768);
    }

    #[test]
    fn test_fixed_source_is_exact() {
        let input = AudioBuffer::new(vec![100, -200, 300, -400], 2, 2, 44100).unwrap();
        let params = PerturbationParams::simplified();
        let chain = PerturbationChain::from_params(&params).unwrap();

        // Zero noise deviate, volume pinned at 1.02
        let (output, outcomes) = chain.process(&input, &mut FixedSource::new(1.02)).unwrap();

        assert_eq!(output.samples(), &[102, -204, 306, -408]);
        assert_eq!(outcomes[1], StageOutcome::Volume { scale: 1.02 });
        assert!(output.same_format(&input));
    }

    #[test]
    fn test_full_chain_scales_length() {
        let input = sine(44100, 8000.0);
        let chain = PerturbationChain::from_params(&PerturbationParams::full()).unwrap();

        let (output, outcomes) = chain.process(&input, &mut RngSource::seeded(11)).unwrap();

        let ratio = match outcomes[1] {
            StageOutcome::Pitch { ratio } => ratio,
            other => panic!("expected pitch outcome, got {:?}", other),
        };
        assert!((0.99..=1.01).contains(&ratio));
        assert_eq!(output.num_frames(), (44100.0 * ratio).round() as usize);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut params = PerturbationParams::full();
        params.stages.push(StageConfig::Noise { fraction: f64::NAN });
        assert!(PerturbationChain::from_params(&params).is_err());
    }
}
