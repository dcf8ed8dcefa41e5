//! Harmonia - Generative Audio Track Generator
//!
//! Renders long-form relaxation tracks (binaural beats, isochronic tones,
//! colored-noise ambiences, drones and pads) to 16-bit stereo WAV files.
//!
//! # Architecture
//!
//! The pipeline runs leaves first:
//! - [`synth`]: generators producing raw stereo buffers
//! - [`dsp`]: filter design, zero-phase filtering, spectral shaping, fades
//!   and normalization
//! - [`engine`]: the audio buffer and WAV export/import
//! - [`render`]: the driver that walks the [`catalog`] and writes a manifest

pub mod catalog;
pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod render;
pub mod synth;

pub use catalog::{standard_catalog, TrackKind, TrackSpec};
pub use config::RenderSettings;
pub use dsp::NoiseSource;
pub use engine::{export_wav, import_wav, AudioBuffer};
pub use error::{HarmoniaError, Result};
pub use render::{render_track, run_batch, run_selected, BatchReport};
