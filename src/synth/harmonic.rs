//! Harmonic Synthesizer
//!
//! Drones and pads as weighted sums of fixed sinusoidal partials.

use log::debug;

use crate::engine::buffer::{frames_for_duration, AudioBuffer};
use crate::error::{HarmoniaError, Result};
use crate::synth::compose::to_stereo;
use crate::synth::{check_frequency, sum_of_sines};

/// Amplitude of harmonic `k` (1-based) of a drone
pub const DRONE_WEIGHTS: [f64; 5] = [1.0, 0.5, 0.3, 0.2, 0.1];

/// Generate a drone on `fundamental` with the first `n_harmonics` harmonics
///
/// Harmonic `k` sits at `fundamental · k` with weight `DRONE_WEIGHTS[k - 1]`.
///
/// # Errors
/// * `InvalidParameter` - If `n_harmonics` is outside `1..=5` or any
///   harmonic reaches the Nyquist frequency
pub fn generate_drone(
    fundamental: f64,
    n_harmonics: usize,
    duration_secs: f64,
    sample_rate: u32,
) -> Result<AudioBuffer> {
    if n_harmonics == 0 || n_harmonics > DRONE_WEIGHTS.len() {
        return Err(HarmoniaError::invalid_parameter(
            "n_harmonics",
            n_harmonics,
            format!("1..={}", DRONE_WEIGHTS.len()),
        ));
    }

    let partials: Vec<(f64, f64)> = DRONE_WEIGHTS[..n_harmonics]
        .iter()
        .enumerate()
        .map(|(i, &w)| (fundamental * (i + 1) as f64, w))
        .collect();
    for (freq, _) in &partials {
        check_frequency("fundamental", *freq, sample_rate)?;
    }

    let frames = frames_for_duration(duration_secs, sample_rate)?;
    debug!(
        "Drone: {} Hz x{} harmonics, {} frames",
        fundamental, n_harmonics, frames
    );
    Ok(to_stereo(sum_of_sines(&partials, frames, sample_rate), sample_rate))
}

/// Generate a pad from `frequencies`, the i-th (0-based) weighted `1/(i+1)`
pub fn generate_pad(frequencies: &[f64], duration_secs: f64, sample_rate: u32) -> Result<AudioBuffer> {
    if frequencies.is_empty() {
        return Err(HarmoniaError::invalid_parameter(
            "frequencies",
            "[]",
            "at least one frequency",
        ));
    }
    for &freq in frequencies {
        check_frequency("frequencies", freq, sample_rate)?;
    }

    let partials: Vec<(f64, f64)> = frequencies
        .iter()
        .enumerate()
        .map(|(i, &f)| (f, 1.0 / (i + 1) as f64))
        .collect();

    let frames = frames_for_duration(duration_secs, sample_rate)?;
    debug!("Pad: {:?} Hz, {} frames", frequencies, frames);
    Ok(to_stereo(sum_of_sines(&partials, frames, sample_rate), sample_rate))
}
