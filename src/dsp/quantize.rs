//! Quantization back to integer PCM
//!
//! Rounds the wide-precision signal and clips it into the target sample
//! width's range. Out-of-range values saturate; they never wrap.

use crate::dsp::perturbation::Signal;
use crate::engine::buffer::{sample_range, AudioBuffer};
use crate::error::Result;

/// Round and clip a single sample to the given width
#[inline]
pub fn quantize_sample(sample: f64, sample_width: u16) -> i32 {
    let (min, max) = sample_range(sample_width);
    if sample.is_nan() {
        return 0;
    }
    sample.round().clamp(min as f64, max as f64) as i32
}

/// Build an [`AudioBuffer`] from a signal, keeping the template's format
///
/// Frame rate, channel count and sample width come from `template`; only
/// the samples (and therefore the length) change.
pub fn quantize(signal: &Signal, template: &AudioBuffer) -> Result<AudioBuffer> {
    let width = template.sample_width();
    let samples = signal
        .samples
        .iter()
        .map(|&s| quantize_sample(s, width))
        .collect();

    AudioBuffer::new(
        samples,
        template.num_channels(),
        width,
        template.frame_rate(),
    )
}
