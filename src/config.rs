//! Perturbation configuration
//!
//! A run is described by [`PerturbationParams`]: an ordered list of stages
//! plus output settings. The two shipped variants are presets of the same
//! structure, and any other variant can be loaded from JSON.

use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::dsp::pitch::{DEFAULT_MIN_SAMPLES, MAX_RATIO};
use crate::engine::OutputFormat;
use crate::error::{Result, SoundshiftError};

/// Bitrate carried by the presets; lossless codecs ignore it
pub const DEFAULT_BITRATE: &str = "192k";

fn default_min_samples() -> usize {
    DEFAULT_MIN_SAMPLES
}

/// One enabled pipeline stage and its parameter ranges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageConfig {
    /// Gaussian noise, std dev = `fraction` x peak
    Noise { fraction: f64 },
    /// Length resampling by a ratio in `[min_ratio, max_ratio]`
    Pitch {
        min_ratio: f64,
        max_ratio: f64,
        #[serde(default = "default_min_samples")]
        min_samples: usize,
    },
    /// Uniform gain in `[min_scale, max_scale]`
    Volume { min_scale: f64, max_scale: f64 },
}

impl StageConfig {
    /// Check the stage's parameters
    pub fn validate(&self) -> Result<()> {
        match *self {
            StageConfig::Noise { fraction } => {
                if !fraction.is_finite() || fraction < 0.0 {
                    return Err(SoundshiftError::config(format!(
                        "noise fraction must be finite and non-negative, got {}",
                        fraction
                    )));
                }
            }
            StageConfig::Pitch {
                min_ratio,
                max_ratio,
                ..
            } => {
                validate_range("pitch ratio", min_ratio, max_ratio)?;
                if max_ratio > MAX_RATIO {
                    return Err(SoundshiftError::config(format!(
                        "pitch ratio must not exceed {}, got {}",
                        MAX_RATIO, max_ratio
                    )));
                }
            }
            StageConfig::Volume {
                min_scale,
                max_scale,
            } => validate_range("volume scale", min_scale, max_scale)?,
        }
        Ok(())
    }
}

fn validate_range(name: &str, min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || min <= 0.0 {
        return Err(SoundshiftError::config(format!(
            "{} bounds must be finite and positive, got [{}, {}]",
            name, min, max
        )));
    }
    if min > max {
        return Err(SoundshiftError::config(format!(
            "{} range is inverted: [{}, {}]",
            name, min, max
        )));
    }
    Ok(())
}

/// Container and advisory bitrate for written files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    pub format: OutputFormat,
    #[serde(default)]
    pub bitrate: Option<String>,
}

/// Full description of a perturbation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerturbationParams {
    /// Stages in application order
    pub stages: Vec<StageConfig>,
    pub output: OutputSettings,
}

impl PerturbationParams {
    /// Noise, pitch and volume jitter, written as FLAC
    pub fn full() -> Self {
        Self {
            stages: vec![
                StageConfig::Noise { fraction: 0.001 },
                StageConfig::Pitch {
                    min_ratio: 0.99,
                    max_ratio: 1.01,
                    min_samples: DEFAULT_MIN_SAMPLES,
                },
                StageConfig::Volume {
                    min_scale: 0.97,
                    max_scale: 1.03,
                },
            ],
            output: OutputSettings {
                format: OutputFormat::Flac,
                bitrate: Some(DEFAULT_BITRATE.to_string()),
            },
        }
    }

    /// Lighter noise and volume jitter only, written as WAV
    pub fn simplified() -> Self {
        Self {
            stages: vec![
                StageConfig::Noise { fraction: 0.0005 },
                StageConfig::Volume {
                    min_scale: 0.97,
                    max_scale: 1.03,
                },
            ],
            output: OutputSettings {
                format: OutputFormat::Wav,
                bitrate: Some(DEFAULT_BITRATE.to_string()),
            },
        }
    }

    /// Load and validate parameters from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let params: PerturbationParams = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every stage. An empty stage list is a plain re-encode.
    pub fn validate(&self) -> Result<()> {
        self.stages.iter().try_for_each(StageConfig::validate)
    }

    /// Whether any stage changes the buffer length
    pub fn changes_length(&self) -> bool {
        self.stages
            .iter()
            .any(|s| matches!(s, StageConfig::Pitch { .. }))
    }
}

impl Default for PerturbationParams {
    fn default() -> Self {
        Self::full()
    }
}

/// Named pipeline variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Full,
    Simplified,
}

impl Preset {
    pub fn params(self) -> PerturbationParams {
        match self {
            Preset::Full => PerturbationParams::full(),
            Preset::Simplified => PerturbationParams::simplified(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Full => "full",
            Preset::Simplified => "simplified",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_presets_are_valid() {
        PerturbationParams::full().validate().unwrap();
        PerturbationParams::simplified().validate().unwrap();
    }

    #[test]
    fn test_preset_shapes() {
        let full = Preset::Full.params();
        assert_eq!(full.stages.len(), 3);
        assert!(full.changes_length());
        assert_eq!(full.output.format, OutputFormat::Flac);

        let simplified = Preset::Simplified.params();
        assert_eq!(simplified.stages.len(), 2);
        assert!(!simplified.changes_length());
        assert_eq!(simplified.output.format, OutputFormat::Wav);
    }

    #[test]
    fn test_json_round_trip() {
        let params = PerturbationParams::full();
        let json = params.to_json_pretty().unwrap();
        let parsed: PerturbationParams = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, params);
    }

    #[test]
    fn test_from_file_defaults_min_samples() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(
            &path,
            r#"{
                "stages": [
                    {"type": "pitch", "min_ratio": 0.98, "max_ratio": 1.02}
                ],
                "output": {"format": "wav"}
            }"#,
        )
        .unwrap();

        let params = PerturbationParams::from_file(&path).unwrap();
        assert_eq!(
            params.stages,
            vec![StageConfig::Pitch {
                min_ratio: 0.98,
                max_ratio: 1.02,
                min_samples: DEFAULT_MIN_SAMPLES,
            }]
        );
        assert_eq!(params.output.bitrate, None);
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let inverted = StageConfig::Volume {
            min_scale: 1.1,
            max_scale: 0.9,
        };
        assert_eq!(inverted.validate().unwrap_err().error_code(), "CONFIG_ERROR");

        let zero_ratio = StageConfig::Pitch {
            min_ratio: 0.0,
            max_ratio: 1.0,
            min_samples: 0,
        };
        assert!(zero_ratio.validate().is_err());

        let negative_noise = StageConfig::Noise { fraction: -0.1 };
        assert!(negative_noise.validate().is_err());
    }

    #[test]
    fn test_validate_caps_pitch_ratio() {
        let huge = StageConfig::Pitch {
            min_ratio: 1e300,
            max_ratio: 1e300,
            min_samples: 0,
        };
        assert_eq!(huge.validate().unwrap_err().error_code(), "CONFIG_ERROR");

        let at_cap = StageConfig::Pitch {
            min_ratio: 1.0,
            max_ratio: MAX_RATIO,
            min_samples: 0,
        };
        at_cap.validate().unwrap();
    }

    #[test]
    fn test_empty_stage_list_is_valid() {
        let params = PerturbationParams {
            stages: vec![],
            output: OutputSettings {
                format: OutputFormat::Wav,
                bitrate: None,
            },
        };
        params.validate().unwrap();
    }
}
