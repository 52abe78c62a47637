//! Soundshift CLI
//!
//! Command-line entry point for the batch audio perturber.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use soundshift::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Soundshift v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(Commands::Run {
            input,
            output,
            preset,
            config,
            seed,
        }) => commands::run(&input, &output, preset, config.as_deref(), seed)
            .with_context(|| format!("batch over {} failed", input.display())),
        Some(Commands::Presets) => commands::presets().context("printing presets failed"),
        Some(Commands::Inspect { path }) => {
            commands::inspect(&path).with_context(|| format!("cannot inspect {}", path.display()))
        }
        None => {
            println!("Soundshift v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}
