//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use log::info;

use crate::catalog::standard_catalog;
use crate::cli::GenerateArgs;
use crate::config::RenderSettings;
use crate::error::Result;
use crate::render::{run_batch, run_selected, BatchReport};

/// Merge the config file (or defaults) with command-line overrides
pub fn resolve_settings(args: &GenerateArgs) -> Result<RenderSettings> {
    let mut settings = match &args.config {
        Some(path) => {
            info!("Loading settings from {}", path.display());
            RenderSettings::load(path)?
        }
        None => RenderSettings::default(),
    };

    if let Some(dir) = &args.output_dir {
        settings.output_dir = dir.clone();
    }
    if let Some(rate) = args.sample_rate {
        settings.sample_rate = rate;
    }
    if let Some(duration) = args.duration {
        settings.duration_secs = duration;
    }
    if let Some(fade) = args.fade {
        settings.fade_secs = fade;
    }
    if args.seed.is_some() {
        settings.seed = args.seed;
    }

    settings.validate()?;
    Ok(settings)
}

/// Render the catalog (or the `--only` selection) and print a summary
pub fn generate(settings: &RenderSettings, only: &[String]) -> Result<BatchReport> {
    let catalog = standard_catalog(settings.duration_secs);
    let report = if only.is_empty() {
        run_batch(&catalog, settings)?
    } else {
        run_selected(&catalog, only, settings)?
    };

    println!("Run {}", report.run_id);
    println!("{:-<60}", "");
    for track in &report.tracks {
        let clip_note = if track.clipped_samples > 0 {
            format!(" ({} clipped)", track.clipped_samples)
        } else {
            String::new()
        };
        println!(
            "  ok    {:<28} {:>8.1} s{}",
            track.file, track.duration_secs, clip_note
        );
    }
    for failure in &report.failures {
        println!(
            "  FAIL  {:<28} [{}] {}",
            failure.id, failure.error_code, failure.message
        );
    }
    println!("{:-<60}", "");
    println!(
        "{} rendered, {} failed -> {}",
        report.tracks.len(),
        report.failures.len(),
        BatchReport::manifest_path(&settings.output_dir).display()
    );

    Ok(report)
}

/// Print every catalog entry
pub fn list() {
    let catalog = standard_catalog(RenderSettings::default().duration_secs);

    println!("{:<24} {:<11} {:<26} PARAMETERS", "ID", "KIND", "FILE");
    println!("{:-<100}", "");
    for spec in &catalog {
        println!(
            "{:<24} {:<11} {:<26} {}",
            spec.id,
            spec.kind.label(),
            spec.file_name(),
            spec.kind.describe()
        );
    }
    println!("{:-<100}", "");
    println!("{} tracks", catalog.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_flags_override_config() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("settings.json");
        fs::write(&config, r#"{ "duration_secs": 60.0, "fade_secs": 5.0, "seed": 1 }"#).unwrap();

        let args = GenerateArgs {
            config: Some(config),
            fade: Some(2.0),
            output_dir: Some(PathBuf::from("out")),
            ..GenerateArgs::default()
        };
        let settings = resolve_settings(&args).unwrap();
        assert_eq!(settings.duration_secs, 60.0);
        assert_eq!(settings.fade_secs, 2.0);
        assert_eq!(settings.seed, Some(1));
        assert_eq!(settings.output_dir, PathBuf::from("out"));
        assert_eq!(settings.sample_rate, 44100);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = GenerateArgs {
            duration: Some(-3.0),
            ..GenerateArgs::default()
        };
        assert!(resolve_settings(&args).is_err());
    }

    #[test]
    fn test_generate_selection() {
        let dir = TempDir::new().unwrap();
        let settings = RenderSettings {
            sample_rate: 8000,
            duration_secs: 1.0,
            fade_secs: 0.1,
            output_dir: dir.path().to_path_buf(),
            seed: Some(3),
            ..RenderSettings::default()
        };

        let report = generate(&settings, &["pink-noise".to_string()]).unwrap();
        assert!(report.is_success());
        assert_eq!(report.tracks.len(), 1);
        assert!(dir.path().join("pink-noise.wav").exists());
    }
}
