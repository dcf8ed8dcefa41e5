//! Signal Generators
//!
//! Closed-form and stochastic generators for every track kind. Each
//! generator is a pure function of its parameters (plus an explicit
//! [`NoiseSource`](crate::dsp::NoiseSource) where randomness is needed) and
//! returns a stereo [`AudioBuffer`](crate::engine::AudioBuffer) of exactly
//! `round(duration * sample_rate)` samples per channel.

pub mod compose;
pub mod harmonic;
pub mod noise;
pub mod tone;

pub use compose::{ensure_stereo, from_ears, to_stereo};
pub use harmonic::{generate_drone, generate_pad, DRONE_WEIGHTS};
pub use noise::{generate_noise, NoiseKind};
pub use tone::{generate_binaural, generate_isochronic, isochronic_envelope, PINK_FLOOR_AMPLITUDE};

use std::f64::consts::TAU;

use crate::error::{HarmoniaError, Result};

/// Reject frequencies that are not positive or would alias
pub(crate) fn check_frequency(param: &str, freq_hz: f64, sample_rate: u32) -> Result<()> {
    let nyquist = sample_rate as f64 / 2.0;
    if !freq_hz.is_finite() || freq_hz <= 0.0 || freq_hz >= nyquist {
        return Err(HarmoniaError::invalid_parameter(
            param,
            freq_hz,
            format!("0 < f < {} Hz (Nyquist)", nyquist),
        ));
    }
    Ok(())
}

/// Weighted sum of sinusoids `Σ weight · sin(2π·freq·t)`, `t = i / sample_rate`
pub(crate) fn sum_of_sines(partials: &[(f64, f64)], frames: usize, sample_rate: u32) -> Vec<f32> {
    let step = TAU / sample_rate as f64;
    (0..frames)
        .map(|i| {
            let phase = step * i as f64;
            partials
                .iter()
                .map(|&(freq, weight)| weight * (phase * freq).sin())
                .sum::<f64>() as f32
        })
        .collect()
}

/// `sin(2π·freq·t)` for `frames` samples
pub(crate) fn sine(freq_hz: f64, frames: usize, sample_rate: u32) -> Vec<f32> {
    sum_of_sines(&[(freq_hz, 1.0)], frames, sample_rate)
}
