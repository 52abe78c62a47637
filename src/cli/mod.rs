//! CLI Module
//!
//! Command-line interface for the Soundshift batch perturber.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Preset;

/// Soundshift - batch audio perturbation and re-encoding
#[derive(Parser, Debug)]
#[command(name = "soundshift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Perturb every supported file in a directory
    #[command(name = "run")]
    Run {
        /// Directory containing the source audio
        #[arg(short, long, default_value = "input")]
        input: PathBuf,

        /// Directory for perturbed files (created if absent)
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Built-in pipeline variant
        #[arg(short, long, value_enum, default_value_t = Preset::Full)]
        preset: Preset,

        /// JSON parameter file; overrides --preset
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for reproducible runs
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Print the built-in presets as JSON
    #[command(name = "presets")]
    Presets,

    /// Decode a file and print its format
    #[command(name = "inspect")]
    Inspect {
        /// Audio file to inspect
        path: PathBuf,
    },
}
