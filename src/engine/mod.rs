//! Audio Engine Module
//!
//! Core buffer type and file I/O:
//! - Audio buffer management
//! - 16-bit PCM WAV export and import

pub mod buffer;
pub mod io;

pub use buffer::{frames_for_duration, AudioBuffer, ChannelLayout, DEFAULT_SAMPLE_RATE};
pub use io::{export_wav, import_wav, quantize_sample, ExportReport};
