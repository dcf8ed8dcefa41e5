//! Render driver
//!
//! Turns [`TrackSpec`]s into WAV files: generate, normalize, fade, make
//! stereo, export. A batch keeps going when a track fails and records the
//! failure; afterwards a `manifest.json` describing the run is written next
//! to the tracks.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{error, info};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::catalog::{find, Normalization, TrackKind, TrackSpec};
use crate::config::RenderSettings;
use crate::dsp::envelope::{fade, normalize, normalize_channels};
use crate::dsp::random::NoiseSource;
use crate::engine::buffer::{calculate_peak, calculate_rms, AudioBuffer};
use crate::engine::io::export_wav;
use crate::error::{HarmoniaError, Result};
use crate::synth::{
    ensure_stereo, generate_binaural, generate_drone, generate_isochronic, generate_noise,
    generate_pad,
};

/// Name of the run manifest inside the output directory
pub const MANIFEST_FILE: &str = "manifest.json";

const HARMONIA_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A track that was rendered and written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedTrack {
    pub id: String,
    pub kind: TrackKind,
    /// File name relative to the output directory
    pub file: String,
    pub frames: usize,
    pub duration_secs: f64,
    pub clipped_samples: usize,
    pub peak_dbfs: f32,
    pub rms_dbfs: f32,
    /// Hex SHA-256 of the written file
    pub sha256: String,
}

/// A track that could not be rendered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackFailure {
    pub id: String,
    pub error_code: String,
    pub message: String,
}

/// Outcome of a batch run, persisted as the run manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub harmonia_version: String,
    pub settings: RenderSettings,
    pub tracks: Vec<RenderedTrack>,
    pub failures: Vec<TrackFailure>,
}

impl BatchReport {
    fn new(settings: &RenderSettings) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            harmonia_version: HARMONIA_VERSION.to_string(),
            settings: settings.clone(),
            tracks: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// True when every requested track was written
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Path of the manifest for `output_dir`
    pub fn manifest_path(output_dir: &Path) -> PathBuf {
        output_dir.join(MANIFEST_FILE)
    }

    /// Write the report as pretty JSON into `output_dir`
    pub fn write_manifest(&self, output_dir: &Path) -> Result<PathBuf> {
        let path = Self::manifest_path(output_dir);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Read a manifest written by [`BatchReport::write_manifest`]
    pub fn load_manifest(output_dir: &Path) -> Result<Self> {
        let path = Self::manifest_path(output_dir);
        if !path.exists() {
            return Err(HarmoniaError::FileNotFound {
                path: path.display().to_string(),
                source: None,
            });
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Render one track into a normalized, faded stereo buffer
///
/// Binaural tracks are normalized per ear, all others with one gain across
/// both channels.
pub fn render_track(
    spec: &TrackSpec,
    settings: &RenderSettings,
    rng: &mut NoiseSource,
) -> Result<AudioBuffer> {
    let sr = settings.sample_rate;
    let duration = spec.duration_secs;

    let mut buffer = match &spec.kind {
        TrackKind::Binaural {
            beat_hz,
            carrier_hz,
        } => generate_binaural(*beat_hz, *carrier_hz, duration, sr, rng)?,
        TrackKind::Isochronic { mod_hz, base_hz } => {
            generate_isochronic(*mod_hz, *base_hz, duration, sr)?
        }
        TrackKind::Noise { noise } => {
            generate_noise(*noise, duration, sr, settings.target_peak, rng)?
        }
        TrackKind::Drone {
            fundamental_hz,
            harmonics,
        } => generate_drone(*fundamental_hz, *harmonics, duration, sr)?,
        TrackKind::Pad { frequencies } => generate_pad(frequencies, duration, sr)?,
    };

    if !buffer.is_finite() {
        return Err(HarmoniaError::InvalidAudio {
            reason: format!("{} produced non-finite samples", spec.id),
            source: None,
        });
    }

    match spec.kind.normalization() {
        Normalization::PerChannel => normalize_channels(&mut buffer, settings.target_peak)?,
        Normalization::Joint => normalize(&mut buffer, settings.target_peak)?,
    }
    fade(&mut buffer, settings.fade_secs)?;

    ensure_stereo(buffer)
}

/// Render and export every spec in order
///
/// The track at position `i` draws from `NoiseSource::for_track(seed, i)`.
pub fn run_batch(specs: &[TrackSpec], settings: &RenderSettings) -> Result<BatchReport> {
    let jobs: Vec<(usize, &TrackSpec)> = specs.iter().enumerate().collect();
    render_jobs(&jobs, settings)
}

/// Render only the tracks of `catalog` named in `ids`
///
/// Seeds still follow each track's position in `catalog`, so a selected
/// track is identical to the same track of a full run.
///
/// # Errors
/// * `InvalidParameter` - If an id is not in the catalog; nothing is rendered
pub fn run_selected(
    catalog: &[TrackSpec],
    ids: &[String],
    settings: &RenderSettings,
) -> Result<BatchReport> {
    if let Some(unknown) = ids.iter().find(|id| find(catalog, id).is_none()) {
        return Err(HarmoniaError::invalid_parameter(
            "track id",
            unknown,
            "an id from `harmonia list`",
        ));
    }

    let jobs: Vec<(usize, &TrackSpec)> = catalog
        .iter()
        .enumerate()
        .filter(|(_, spec)| ids.contains(&spec.id))
        .collect();
    render_jobs(&jobs, settings)
}

fn render_jobs(jobs: &[(usize, &TrackSpec)], settings: &RenderSettings) -> Result<BatchReport> {
    settings.validate()?;
    fs::create_dir_all(&settings.output_dir)?;

    let mut report = BatchReport::new(settings);
    info!(
        "Run {}: {} tracks -> {}",
        report.run_id,
        jobs.len(),
        settings.output_dir.display()
    );

    for &(index, spec) in jobs {
        let mut rng = NoiseSource::for_track(settings.seed, index);
        match render_and_export(spec, settings, &mut rng) {
            Ok(track) => {
                info!(
                    "Rendered {} ({:.1} s, peak {:.1} dBFS, rms {:.1} dBFS)",
                    track.file, track.duration_secs, track.peak_dbfs, track.rms_dbfs
                );
                report.tracks.push(track);
            }
            Err(e) => {
                error!("Track {} failed [{}]: {}", spec.id, e.error_code(), e);
                report.failures.push(TrackFailure {
                    id: spec.id.clone(),
                    error_code: e.error_code().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    let manifest = report.write_manifest(&settings.output_dir)?;
    info!(
        "Run {} finished: {} rendered, {} failed, manifest {}",
        report.run_id,
        report.tracks.len(),
        report.failures.len(),
        manifest.display()
    );
    Ok(report)
}

fn render_and_export(
    spec: &TrackSpec,
    settings: &RenderSettings,
    rng: &mut NoiseSource,
) -> Result<RenderedTrack> {
    let buffer = render_track(spec, settings, rng)?;
    let file = spec.file_name();
    let export = export_wav(&buffer, &settings.output_dir.join(&file))?;

    Ok(RenderedTrack {
        id: spec.id.clone(),
        kind: spec.kind.clone(),
        sha256: file_checksum(&export.path)?,
        file,
        frames: export.frames,
        duration_secs: export.duration_secs(),
        clipped_samples: export.clipped_samples,
        peak_dbfs: calculate_peak(&buffer),
        rms_dbfs: calculate_rms(&buffer),
    })
}

/// Hex SHA-256 of a file's contents
pub fn file_checksum(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
