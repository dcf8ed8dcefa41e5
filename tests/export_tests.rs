//! Export Tests
//!
//! WAV round trips and full batch runs against a temporary output directory.

use std::collections::HashSet;

use approx::assert_abs_diff_eq;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use harmonia::catalog::{standard_catalog, NoiseKind, TrackKind, TrackSpec};
use harmonia::engine::{export_wav, import_wav, AudioBuffer};
use harmonia::render::{file_checksum, render_track, run_batch, BatchReport};
use harmonia::{NoiseSource, RenderSettings};

const STEP: f32 = 1.0 / 32767.0;

fn quick_settings(dir: &std::path::Path) -> RenderSettings {
    RenderSettings {
        sample_rate: 16000,
        duration_secs: 1.0,
        fade_secs: 0.1,
        output_dir: dir.to_path_buf(),
        seed: Some(42),
        ..RenderSettings::default()
    }
}

#[test]
fn test_rendered_track_round_trip() {
    let dir = TempDir::new().unwrap();
    let settings = quick_settings(dir.path());
    let spec = TrackSpec::new(
        TrackKind::Noise {
            noise: NoiseKind::Ocean,
        },
        1.0,
    );

    let buffer = render_track(&spec, &settings, &mut NoiseSource::seeded(5)).unwrap();
    let path = dir.path().join(spec.file_name());
    let report = export_wav(&buffer, &path).unwrap();
    assert_eq!(report.clipped_samples, 0);
    assert_eq!(report.channels, 2);
    assert_eq!(report.frames, 16_000);

    let reloaded = import_wav(&path).unwrap();
    assert_eq!(reloaded.num_channels(), 2);
    assert_eq!(reloaded.num_samples(), buffer.num_samples());
    assert_eq!(reloaded.sample_rate(), 16000);
    for ch in 0..2 {
        for (a, b) in buffer.channel(ch).iter().zip(reloaded.channel(ch)) {
            assert_abs_diff_eq!(a, b, epsilon = STEP);
        }
    }
}

#[test]
fn test_export_clamps_and_counts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hot.wav");
    let buffer =
        AudioBuffer::from_channels(vec![vec![0.5, 1.5, -2.0, 0.0], vec![0.0; 4]], 8000).unwrap();

    let report = export_wav(&buffer, &path).unwrap();
    assert_eq!(report.clipped_samples, 2);

    let reloaded = import_wav(&path).unwrap();
    assert_abs_diff_eq!(reloaded.channel(0)[1], 1.0, epsilon = STEP);
    // No wraparound: -2.0 lands on the negative rail, not near zero
    assert!(reloaded.channel(0)[2] <= -1.0);
}

#[test]
fn test_full_catalog_batch() {
    let dir = TempDir::new().unwrap();
    let settings = quick_settings(dir.path());
    let catalog = standard_catalog(settings.duration_secs);

    let report = run_batch(&catalog, &settings).unwrap();
    assert!(report.is_success(), "failures: {:?}", report.failures);
    assert_eq!(report.tracks.len(), 21);

    let files: HashSet<&str> = report.tracks.iter().map(|t| t.file.as_str()).collect();
    assert_eq!(files.len(), 21);

    for track in &report.tracks {
        let path = dir.path().join(&track.file);
        let buffer = import_wav(&path).unwrap();
        assert_eq!(buffer.num_channels(), 2, "{}", track.id);
        assert_eq!(buffer.num_samples(), 16_000, "{}", track.id);
        assert_eq!(track.clipped_samples, 0, "{}", track.id);
        assert!(buffer.peak() <= settings.target_peak + STEP, "{}", track.id);
        assert_eq!(buffer.channel(0)[0], 0.0, "{}", track.id);
        assert_eq!(buffer.channel(1)[15_999], 0.0, "{}", track.id);
    }
}

#[test]
fn test_manifest_checksums_match_files() {
    let dir = TempDir::new().unwrap();
    let settings = quick_settings(dir.path());
    let specs: Vec<TrackSpec> = standard_catalog(1.0)
        .into_iter()
        .filter(|s| matches!(s.kind, TrackKind::Binaural { .. }))
        .take(2)
        .collect();

    let report = run_batch(&specs, &settings).unwrap();
    let manifest = BatchReport::load_manifest(dir.path()).unwrap();
    assert_eq!(manifest.tracks, report.tracks);
    assert_eq!(manifest.failures, report.failures);

    for track in &manifest.tracks {
        let checksum = file_checksum(&dir.path().join(&track.file)).unwrap();
        assert_eq!(track.sha256, checksum);
    }
}

#[test]
fn test_seeded_batches_are_reproducible() {
    let catalog: Vec<TrackSpec> = standard_catalog(1.0)
        .into_iter()
        .filter(|s| matches!(s.kind, TrackKind::Noise { .. }))
        .collect();

    let dir_a = TempDir::new().unwrap();
    let dir_b = TempDir::new().unwrap();
    let a = run_batch(&catalog, &quick_settings(dir_a.path())).unwrap();
    let b = run_batch(&catalog, &quick_settings(dir_b.path())).unwrap();

    let sums = |r: &BatchReport| r.tracks.iter().map(|t| t.sha256.clone()).collect::<Vec<_>>();
    assert_eq!(sums(&a), sums(&b));
}

#[test]
fn test_batch_rejects_invalid_settings_before_writing() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("never");
    let settings = RenderSettings {
        fade_secs: 0.8,
        ..quick_settings(&out)
    };
    assert!(run_batch(&standard_catalog(1.0), &settings).is_err());
    assert!(!out.exists());
}
