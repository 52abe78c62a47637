//! Sample Perturbation Engine
//!
//! Core per-file pipeline:
//! - Audio buffer representation
//! - Decode and encode
//! - Per-file processing with a caught-error boundary

pub mod buffer;
pub mod io;
pub mod processor;

pub use buffer::{sample_range, AudioBuffer};
pub use io::{decode, encode, InputFormat, OutputFormat};
pub use processor::{process_file, try_process_file, ProcessReport};
