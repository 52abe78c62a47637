//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::info;

use crate::batch::run_batch;
use crate::config::{PerturbationParams, Preset};
use crate::dsp::RngSource;
use crate::engine::decode;
use crate::error::Result;

/// Run a batch over `input` and print one line per file plus a summary.
pub fn run(
    input: &Path,
    output: &Path,
    preset: Preset,
    config: Option<&Path>,
    seed: Option<u64>,
) -> Result<()> {
    let params = match config {
        Some(path) => {
            info!("Loading parameters from {}", path.display());
            PerturbationParams::from_file(path)?
        }
        None => {
            info!("Using {} preset", preset.name());
            preset.params()
        }
    };

    let mut rng = match seed {
        Some(seed) => RngSource::seeded(seed),
        None => RngSource::from_entropy(),
    };

    let summary = run_batch(input, output, &params, &mut rng, |outcome| {
        let name = outcome
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if outcome.succeeded() {
            println!("Processed: {} → {}", name, outcome.output.display());
        } else {
            println!("Failed: {}", name);
        }
    })?;

    println!("{:-<60}", "");
    println!("Processed {} files", summary);

    Ok(())
}

/// Print both presets as pretty JSON.
pub fn presets() -> Result<()> {
    for preset in [Preset::Full, Preset::Simplified] {
        println!("# {}", preset.name());
        println!("{}", preset.params().to_json_pretty()?);
    }
    Ok(())
}

/// Decode a file and print its buffer metadata.
pub fn inspect(path: &Path) -> Result<()> {
    let buffer = decode(path)?;

    println!("File:        {}", path.display());
    println!("Channels:    {}", buffer.num_channels());
    println!("Sample rate: {} Hz", buffer.frame_rate());
    println!("Bit depth:   {}-bit", buffer.bits_per_sample());
    println!("Frames:      {}", buffer.num_frames());
    println!("Duration:    {:.3}s", buffer.duration_secs());
    println!("Peak:        {}", buffer.peak());

    Ok(())
}
