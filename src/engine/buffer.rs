//! Audio Buffer
//!
//! Decoded PCM audio as interleaved integer samples. The buffer keeps the
//! source sample width so the encoder can write the same integer format
//! that was read.

use crate::error::{Result, SoundshiftError};

// ============================================================================
// Constants
// ============================================================================

/// Narrowest supported sample width in bytes (8-bit)
pub const MIN_SAMPLE_WIDTH: u16 = 1;

/// Widest supported sample width in bytes (32-bit)
pub const MAX_SAMPLE_WIDTH: u16 = 4;

/// Sample width used when the codec does not report one (lossy formats)
pub const DEFAULT_SAMPLE_WIDTH: u16 = 2;

// ============================================================================
// Helper Functions
// ============================================================================

/// Representable range of a signed integer sample of the given width
///
/// # Arguments
/// * `sample_width` - Width in bytes (1 to 4)
///
/// # Returns
/// `(min, max)` inclusive, e.g. `(-32768, 32767)` for 16-bit
#[inline]
pub fn sample_range(sample_width: u16) -> (i64, i64) {
    let bits = u32::from(sample_width.clamp(MIN_SAMPLE_WIDTH, MAX_SAMPLE_WIDTH)) * 8;
    let max = (1i64 << (bits - 1)) - 1;
    (-max - 1, max)
}

// ============================================================================
// AudioBuffer
// ============================================================================

/// Decoded PCM audio
///
/// Samples are interleaved (`[L, R, L, R, ...]` for stereo). The sample
/// count is always a multiple of the channel count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    samples: Vec<i32>,
    channels: u16,
    sample_width: u16,
    frame_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from interleaved samples
    ///
    /// # Errors
    /// * `InvalidBuffer` - zero channels, zero frame rate, unsupported
    ///   sample width, or a sample count that is not a whole number of frames
    pub fn new(samples: Vec<i32>, channels: u16, sample_width: u16, frame_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(SoundshiftError::InvalidBuffer {
                reason: "channel count must be at least 1".to_string(),
            });
        }
        if frame_rate == 0 {
            return Err(SoundshiftError::InvalidBuffer {
                reason: "frame rate must be positive".to_string(),
            });
        }
        if !(MIN_SAMPLE_WIDTH..=MAX_SAMPLE_WIDTH).contains(&sample_width) {
            return Err(SoundshiftError::InvalidBuffer {
                reason: format!("{}-byte samples are not supported", sample_width),
            });
        }
        if samples.len() % channels as usize != 0 {
            return Err(SoundshiftError::InvalidBuffer {
                reason: format!(
                    "{} samples do not divide into {} channels",
                    samples.len(),
                    channels
                ),
            });
        }

        Ok(Self {
            samples,
            channels,
            sample_width,
            frame_rate,
        })
    }

    /// Create a silent buffer of the given duration
    pub fn silence(duration_secs: f64, frame_rate: u32, channels: u16, sample_width: u16) -> Result<Self> {
        let frames = (duration_secs * frame_rate as f64).round() as usize;
        Self::new(
            vec![0; frames * channels as usize],
            channels,
            sample_width,
            frame_rate,
        )
    }

    /// Interleaved samples
    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// Consume the buffer, returning its interleaved samples
    pub fn into_samples(self) -> Vec<i32> {
        self.samples
    }

    pub fn num_channels(&self) -> u16 {
        self.channels
    }

    /// Sample width in bytes
    pub fn sample_width(&self) -> u16 {
        self.sample_width
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.sample_width * 8
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Total number of samples across all channels
    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    /// Number of frames (samples per channel)
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.num_frames() as f64 / self.frame_rate as f64
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> u32 {
        self.samples
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap_or(0)
    }

    /// Check whether another buffer has the same shape (channels, width, rate)
    pub fn same_format(&self, other: &AudioBuffer) -> bool {
        self.channels == other.channels
            && self.sample_width == other.sample_width
            && self.frame_rate == other.frame_rate
    }
}

// ============================================================================
// Tests
// ============================================================================
