//! CLI Module
//!
//! Command-line interface for the Harmonia track generator.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Harmonia - generative audio tracks for relaxation and focus
#[derive(Parser, Debug)]
#[command(name = "harmonia")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the track catalog to WAV files
    #[command(name = "generate")]
    Generate(GenerateArgs),

    /// List the tracks in the catalog
    #[command(name = "list")]
    List,
}

/// Options for `harmonia generate`; flags override the config file
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// JSON file with render settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the WAV files and manifest
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Sample rate in Hz
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Track duration in seconds
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Fade-in/out length in seconds
    #[arg(long)]
    pub fade: Option<f64>,

    /// Seed for reproducible noise
    #[arg(long)]
    pub seed: Option<u64>,

    /// Only render these track ids
    #[arg(long, num_args = 1..)]
    pub only: Vec<String>,
}
