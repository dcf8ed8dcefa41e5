//! Audio file I/O for Harmonia
//!
//! Every track is written as a 16-bit signed PCM WAV file. Floating samples
//! are quantized with `round(sample * 32767)` and clamped, never wrapped.
//! The importer exists so exported tracks can be read back and verified.

use std::fs;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, warn};
use serde::Serialize;

use crate::engine::buffer::{AudioBuffer, ChannelLayout};
use crate::error::{HarmoniaError, Result};

/// Full-scale value for 16-bit quantization
pub const PCM16_SCALE: f32 = 32767.0;

/// Bit depth of every exported track
pub const EXPORT_BIT_DEPTH: u16 = 16;

/// Summary of a finished export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportReport {
    /// File that was written
    pub path: PathBuf,
    /// Samples per channel
    pub frames: usize,
    /// Channel count written to the header
    pub channels: u16,
    /// Sample rate written to the header
    pub sample_rate: u32,
    /// Samples that fell outside the 16-bit range and were clamped
    pub clipped_samples: usize,
}

impl ExportReport {
    /// Duration of the written file in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }
}

/// Quantize one floating sample to 16-bit PCM
///
/// Returns the quantized value and whether it had to be clamped.
#[inline]
pub fn quantize_sample(sample: f32) -> (i16, bool) {
    let scaled = (sample * PCM16_SCALE).round();
    if scaled > i16::MAX as f32 {
        (i16::MAX, true)
    } else if scaled < i16::MIN as f32 {
        (i16::MIN, true)
    } else if scaled.is_nan() {
        (0, true)
    } else {
        (scaled as i16, false)
    }
}

/// Export an AudioBuffer to a 16-bit PCM WAV file
///
/// Samples are written interleaved per channel at the buffer's sample rate.
/// The file is written under a `.partial` name and renamed into place once
/// finalized, so a failed export never leaves a truncated file at `path`.
///
/// # Returns
/// * `Ok(ExportReport)` - Including how many samples were clamped
/// * `Err(HarmoniaError)` - If the buffer is empty or the file cannot be written
pub fn export_wav(buffer: &AudioBuffer, path: &Path) -> Result<ExportReport> {
    if buffer.is_empty() {
        return Err(HarmoniaError::EmptyAudio);
    }

    let channels = buffer.num_channels() as u16;
    let spec = WavSpec {
        channels,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: EXPORT_BIT_DEPTH,
        sample_format: SampleFormat::Int,
    };

    let partial = partial_path(path);
    let written = write_pcm16(buffer, &partial, spec)
        .and_then(|clipped| fs::rename(&partial, path).map(|_| clipped).map_err(Into::into));
    let clipped_samples = match written {
        Ok(clipped) => clipped,
        Err(e) => {
            if partial.exists() {
                if let Err(cleanup) = fs::remove_file(&partial) {
                    warn!("Could not remove {}: {}", partial.display(), cleanup);
                }
            }
            return Err(e);
        }
    };

    if clipped_samples > 0 {
        warn!(
            "{}: clamped {} samples outside the 16-bit range",
            path.display(),
            clipped_samples
        );
    }
    debug!(
        "Wrote {} ({} frames, {} ch, {} Hz)",
        path.display(),
        buffer.num_samples(),
        channels,
        buffer.sample_rate()
    );

    Ok(ExportReport {
        path: path.to_path_buf(),
        frames: buffer.num_samples(),
        channels,
        sample_rate: buffer.sample_rate(),
        clipped_samples,
    })
}

/// Temporary name an export is written under before the final rename
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

/// Write every sample to `path`, returning how many were clamped
fn write_pcm16(buffer: &AudioBuffer, path: &Path, spec: WavSpec) -> Result<usize> {
    let mut writer = WavWriter::create(path, spec)?;
    let mut clipped_samples = 0usize;

    for frame in 0..buffer.num_samples() {
        for ch in 0..buffer.num_channels() {
            let (value, clipped) = quantize_sample(buffer.channel(ch)[frame]);
            if clipped {
                clipped_samples += 1;
            }
            writer.write_sample(value)?;
        }
    }

    writer.finalize()?;
    Ok(clipped_samples)
}

/// Import a 16-bit PCM WAV file written by [`export_wav`]
///
/// Samples are scaled back by `1/32767`, so a round trip reproduces each
/// sample within one quantization step.
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not a valid WAV file
/// * `UnsupportedFormat` - If the file is not 16-bit integer mono/stereo
pub fn import_wav(path: &Path) -> Result<AudioBuffer> {
    if !path.exists() {
        return Err(HarmoniaError::FileNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }

    let mut reader = WavReader::open(path).map_err(|e| HarmoniaError::InvalidAudio {
        reason: format!("Failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != EXPORT_BIT_DEPTH {
        return Err(HarmoniaError::UnsupportedFormat {
            format: format!("{}-bit {:?} audio", spec.bits_per_sample, spec.sample_format),
        });
    }

    let layout = ChannelLayout::from_count(spec.channels as usize).ok_or_else(|| {
        HarmoniaError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono/stereo supported)", spec.channels),
        }
    })?;

    let interleaved = reader
        .samples::<i16>()
        .map(|s| s.map(|v| v as f32 / PCM16_SCALE))
        .collect::<std::result::Result<Vec<f32>, _>>()
        .map_err(|e| HarmoniaError::InvalidAudio {
            reason: format!("Failed to read 16-bit samples: {}", e),
            source: Some(Box::new(e)),
        })?;

    if interleaved.is_empty() {
        return Err(HarmoniaError::EmptyAudio);
    }

    AudioBuffer::from_interleaved(&interleaved, layout, spec.sample_rate)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn stereo_ramp(frames: usize) -> AudioBuffer {
        let left: Vec<f32> = (0..frames)
            .map(|i| -1.0 + 2.0 * i as f32 / (frames - 1) as f32)
            .collect();
        let right: Vec<f32> = left.iter().map(|s| -s * 0.5).collect();
        AudioBuffer::from_channels(vec![left, right], 44100).unwrap()
    }

    #[test]
    fn test_quantize_sample() {
        assert_eq!(quantize_sample(0.0), (0, false));
        assert_eq!(quantize_sample(1.0), (32767, false));
        assert_eq!(quantize_sample(-1.0), (-32767, false));
        assert_eq!(quantize_sample(0.5), (16384, false)); // 16383.5 rounds away from zero
        assert_eq!(quantize_sample(1.5), (32767, true));
        assert_eq!(quantize_sample(-1.5), (-32768, true));
    }

    #[test]
    fn test_round_trip_within_one_step() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ramp.wav");
        let original = stereo_ramp(2048);

        let report = export_wav(&original, &path).unwrap();
        assert_eq!(report.frames, 2048);
        assert_eq!(report.channels, 2);
        assert_eq!(report.clipped_samples, 0);

        let imported = import_wav(&path).unwrap();
        assert_eq!(imported.num_channels(), 2);
        assert_eq!(imported.num_samples(), 2048);
        assert_eq!(imported.sample_rate(), 44100);

        for ch in 0..2 {
            for (orig, imp) in original.channel(ch).iter().zip(imported.channel(ch)) {
                assert!(
                    (orig - imp).abs() <= 1.0 / PCM16_SCALE,
                    "Sample mismatch in channel {}: {} vs {}",
                    ch,
                    orig,
                    imp
                );
            }
        }
    }

    #[test]
    fn test_export_clamps_and_counts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hot.wav");
        let buffer = AudioBuffer::mono(vec![0.0, 1.2, -1.2, 0.5, 2.0], 8000);

        let report = export_wav(&buffer, &path).unwrap();
        assert_eq!(report.clipped_samples, 3);

        let spec = WavReader::open(&path).unwrap().spec();
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.channels, 1);

        let raw: Vec<i16> = WavReader::open(&path)
            .unwrap()
            .samples::<i16>()
            .map(|s| s.unwrap())
            .collect();
        assert_eq!(raw, vec![0, 32767, -32768, 16384, 32767]);
    }

    #[test]
    fn test_export_success_leaves_no_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ramp.wav");
        export_wav(&stereo_ramp(64), &path).unwrap();
        assert!(path.exists());
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn test_failed_export_leaves_nothing_behind() {
        // The final rename cannot replace a directory
        let dir = tempdir().unwrap();
        let path = dir.path().join("taken.wav");
        std::fs::create_dir(&path).unwrap();

        assert!(export_wav(&stereo_ramp(64), &path).is_err());
        assert!(path.is_dir());
        assert!(!partial_path(&path).exists());
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_export_empty_buffer_fails() {
        let dir = tempdir().unwrap();
        let buffer = AudioBuffer::new(0, ChannelLayout::Stereo, 44100);
        let result = export_wav(&buffer, &dir.path().join("empty.wav"));
        assert!(matches!(result, Err(HarmoniaError::EmptyAudio)));
    }

    #[test]
    fn test_import_nonexistent_file() {
        let result = import_wav(Path::new("/nonexistent/path/audio.wav"));
        match result.unwrap_err() {
            HarmoniaError::FileNotFound { path, .. } => assert!(path.contains("nonexistent")),
            other => panic!("Expected FileNotFound error, got: {:?}", other),
        }
    }

    #[test]
    fn test_import_rejects_float_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("float.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        writer.write_sample(0.25_f32).unwrap();
        writer.finalize().unwrap();

        assert!(matches!(
            import_wav(&path),
            Err(HarmoniaError::UnsupportedFormat { .. })
        ));
    }
}
