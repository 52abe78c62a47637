//! Batch driver
//!
//! Walks one input directory (non-recursive), runs the engine on every file
//! with a supported extension and counts successes. A file that fails never
//! stops the batch.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::PerturbationParams;
use crate::dsp::RandomSource;
use crate::engine::{try_process_file, InputFormat, OutputFormat, ProcessReport};
use crate::error::Result;

/// Result of processing one discovered file
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub report: Option<ProcessReport>,
}

impl FileOutcome {
    pub fn succeeded(&self) -> bool {
        self.report.is_some()
    }
}

/// Counts for a finished batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub total: usize,
    pub failed: Vec<PathBuf>,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.processed, self.total)
    }
}

/// Check whether a path has a supported input extension
pub fn is_supported(path: &Path) -> bool {
    InputFormat::from_path(path).is_some()
}

/// List supported audio files directly inside `dir`, sorted by name
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            e.into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"))
        })?;
        if entry.file_type().is_file() && is_supported(entry.path()) {
            inputs.push(entry.into_path());
        }
    }

    inputs.sort();
    Ok(inputs)
}

/// Output path for an input: same stem, extension from the output format
pub fn output_path_for(input: &Path, output_dir: &Path, format: OutputFormat) -> PathBuf {
    let mut name = input.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(format.extension());
    output_dir.join(name)
}

/// Run the engine over every supported file in `input_dir`
///
/// `on_file` is called after each file, in order, so the caller can print
/// status as the batch progresses.
///
/// # Errors
/// Only if the input directory cannot be read or the output directory
/// cannot be created. Per-file failures are counted, not returned.
pub fn run_batch<F>(
    input_dir: &Path,
    output_dir: &Path,
    params: &PerturbationParams,
    rng: &mut dyn RandomSource,
    mut on_file: F,
) -> Result<BatchSummary>
where
    F: FnMut(&FileOutcome),
{
    let inputs = discover_inputs(input_dir)?;
    std::fs::create_dir_all(output_dir)?;

    info!(
        "Found {} audio files in {}",
        inputs.len(),
        input_dir.display()
    );

    let mut summary = BatchSummary {
        total: inputs.len(),
        ..Default::default()
    };

    for input in inputs {
        let output = output_path_for(&input, output_dir, params.output.format);
        let report = try_process_file(&input, &output, params, rng);

        let outcome = FileOutcome {
            input,
            output,
            report,
        };
        if outcome.succeeded() {
            summary.processed += 1;
        } else {
            summary.failed.push(outcome.input.clone());
        }
        on_file(&outcome);
    }

    if summary.processed < summary.total {
        warn!("{} of {} files failed", summary.failed.len(), summary.total);
    }

    Ok(summary)
}
