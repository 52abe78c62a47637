//! Soundshift - Batch Audio Perturbation
//!
//! Re-encodes audio files after small sample-domain perturbations so the
//! result sounds the same but no longer matches its original byte for byte.
//!
//! # Architecture
//!
//! Each file goes through one pipeline:
//! - Decode: container/codec into an integer `AudioBuffer`
//! - Perturb: ordered stages (noise, pitch, volume) in `f64`
//! - Quantize: clip and round back to the source sample width
//! - Encode: write FLAC or WAV at the source rate and channel count
//!
//! The batch driver calls that pipeline once per file and only counts
//! failures; it never stops on one.

pub mod batch;
pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;

pub use config::{PerturbationParams, Preset};
pub use error::{Result, SoundshiftError};
