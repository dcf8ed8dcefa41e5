//! Render settings
//!
//! Everything about a run that is not the catalog itself: sample rate,
//! duration, fade, target peak, output location and the optional seed.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::buffer::DEFAULT_SAMPLE_RATE;
use crate::error::{HarmoniaError, Result};

pub const DEFAULT_DURATION_SECS: f64 = 300.0;
pub const DEFAULT_FADE_SECS: f64 = 10.0;
pub const DEFAULT_TARGET_PEAK: f32 = 0.8;
pub const DEFAULT_OUTPUT_DIR: &str = "assets/audio";

/// Parameters shared by every track of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Length of every track in seconds
    pub duration_secs: f64,
    /// Linear fade at each end in seconds
    pub fade_secs: f64,
    /// Peak amplitude after normalization
    pub target_peak: f32,
    /// Directory the WAV files and manifest are written to
    pub output_dir: PathBuf,
    /// Base seed; `None` draws every track from OS entropy
    pub seed: Option<u64>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            duration_secs: DEFAULT_DURATION_SECS,
            fade_secs: DEFAULT_FADE_SECS,
            target_peak: DEFAULT_TARGET_PEAK,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            seed: None,
        }
    }
}

impl RenderSettings {
    /// Read settings from a JSON file; absent fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HarmoniaError::FileNotFound {
                path: path.display().to_string(),
                source: None,
            });
        }
        let content = fs::read_to_string(path)?;
        let settings: RenderSettings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Check the settings describe a renderable run
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(HarmoniaError::invalid_parameter(
                "sample_rate",
                self.sample_rate,
                "a positive rate in Hz",
            ));
        }
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(HarmoniaError::invalid_parameter(
                "duration_secs",
                self.duration_secs,
                "a positive number of seconds",
            ));
        }
        if !self.fade_secs.is_finite() || self.fade_secs < 0.0 {
            return Err(HarmoniaError::invalid_parameter(
                "fade_secs",
                self.fade_secs,
                "a non-negative number of seconds",
            ));
        }
        if self.fade_secs * 2.0 > self.duration_secs {
            return Err(HarmoniaError::invalid_parameter(
                "fade_secs",
                self.fade_secs,
                format!("at most half the duration ({} s)", self.duration_secs / 2.0),
            ));
        }
        if !(self.target_peak > 0.0 && self.target_peak <= 1.0) {
            return Err(HarmoniaError::invalid_parameter(
                "target_peak",
                self.target_peak,
                "0 < peak <= 1",
            ));
        }
        Ok(())
    }
}
