//! Harmonia CLI - Generative Audio Tracks
//!
//! Command-line interface for rendering the Harmonia track catalog.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use harmonia::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logger
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    info!("Harmonia v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Generate(args) => {
            let settings =
                commands::resolve_settings(&args).context("Failed to resolve render settings")?;
            let report = commands::generate(&settings, &args.only).with_context(|| {
                format!(
                    "Failed to render into {}",
                    settings.output_dir.display()
                )
            })?;

            if report.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::List => {
            commands::list();
            Ok(ExitCode::SUCCESS)
        }
    }
}
