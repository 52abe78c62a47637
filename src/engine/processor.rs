//! Per-file perturbation
//!
//! Decode → perturb → encode for one file. [`process_file`] reports errors
//! as values; [`try_process_file`] is the file boundary the batch driver
//! calls, which logs any failure and turns it into `false`.

use std::path::{Path, PathBuf};

use log::{error, info};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::PerturbationParams;
use crate::dsp::{PerturbationChain, RandomSource, StageOutcome};
use crate::engine::io::{decode, encode};
use crate::error::Result;

/// Summary of one successfully processed file
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub frames_in: usize,
    pub frames_out: usize,
    pub channels: u16,
    pub frame_rate: u32,
    /// What each stage drew and applied, in order
    pub stages: Vec<StageOutcome>,
    /// SHA-256 of the written file, lowercase hex
    pub digest: String,
}

/// Perturb one audio file and write the result
///
/// # Arguments
/// * `input` - source audio file
/// * `output` - destination path; its container comes from `params.output`
/// * `params` - stage list and output settings
/// * `rng` - source of every random draw
///
/// # Errors
/// Any decode, resample, encode or I/O failure. Nothing after the failing
/// stage runs.
pub fn process_file(
    input: &Path,
    output: &Path,
    params: &PerturbationParams,
    rng: &mut dyn RandomSource,
) -> Result<ProcessReport> {
    let chain = PerturbationChain::from_params(params)?;

    let buffer = decode(input)?;
    let (perturbed, stages) = chain.process(&buffer, rng)?;

    encode(
        &perturbed,
        output,
        params.output.format,
        params.output.bitrate.as_deref(),
    )?;

    let digest = file_digest(output)?;

    Ok(ProcessReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        frames_in: buffer.num_frames(),
        frames_out: perturbed.num_frames(),
        channels: perturbed.num_channels(),
        frame_rate: perturbed.frame_rate(),
        stages,
        digest,
    })
}

/// Process one file, logging and swallowing any failure
///
/// # Returns
/// `Some(report)` on success, `None` if any stage failed
pub fn try_process_file(
    input: &Path,
    output: &Path,
    params: &PerturbationParams,
    rng: &mut dyn RandomSource,
) -> Option<ProcessReport> {
    match process_file(input, output, params, rng) {
        Ok(report) => {
            info!(
                "Processed {} -> {} ({} -> {} frames)",
                input.display(),
                output.display(),
                report.frames_in,
                report.frames_out
            );
            Some(report)
        }
        Err(e) => {
            let name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| input.display().to_string());
            error!("Failed to process {}: [{}] {}", name, e.error_code(), e);
            None
        }
    }
}

fn file_digest(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}
