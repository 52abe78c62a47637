//! Sample-domain perturbation
//!
//! Noise, pitch and volume jitter stages. All stages implement the
//! `Perturbation` trait and run inside a `PerturbationChain`.

pub mod chain;
pub mod noise;
pub mod perturbation;
pub mod pitch;
pub mod quantize;
pub mod random;
pub mod volume;

pub use chain::PerturbationChain;
pub use noise::NoiseInjection;
pub use perturbation::{Perturbation, Signal, StageOutcome};
pub use pitch::{resample_frames, PitchJitter};
pub use quantize::{quantize, quantize_sample};
pub use random::{FixedSource, RandomSource, RngSource};
pub use volume::VolumeJitter;
