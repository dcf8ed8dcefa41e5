//! Spectral Noise Generator
//!
//! Colored noise is produced by shaping the spectrum of Gaussian white noise.
//! The nature ambiences layer zero-phase filtering and slow amplitude
//! envelopes on top:
//!
//! | Kind  | Shaping                                                        |
//! |-------|----------------------------------------------------------------|
//! | pink  | `1/sqrt(f)` magnitude                                          |
//! | brown | `1/f` magnitude                                                |
//! | ocean | `1/f^0.8` magnitude × swell envelope (0.5–2 Hz band, 0.4–1.0)  |
//! | rain  | high-pass 2 kHz + 30% low-passed 200 Hz rumble                 |
//! | wind  | band-pass 200–2000 Hz × `0.5 + 0.5·sin(2π·0.1·t)` gusts       |

use std::f64::consts::TAU;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::dsp::envelope::normalize_slice;
use crate::dsp::filter::{zero_phase, FilterDesign};
use crate::dsp::random::NoiseSource;
use crate::dsp::spectrum::shape_spectrum;
use crate::engine::buffer::{frames_for_duration, AudioBuffer};
use crate::error::Result;
use crate::synth::compose::to_stereo;

/// Swell band of the ocean modulation envelope (Hz)
const OCEAN_SWELL_BAND: (f64, f64) = (0.5, 2.0);
/// Ocean swell envelope depth: envelope spans `[1 - 2·depth, 1]`
const OCEAN_SWELL_DEPTH: f32 = 0.3;
/// Spectral exponent of the ocean bed, between pink and brown
const OCEAN_EXPONENT: f64 = 0.8;

/// Rain hiss high-pass cutoff (Hz)
const RAIN_HISS_CUTOFF: f64 = 2000.0;
/// Rain rumble low-pass cutoff (Hz)
const RAIN_RUMBLE_CUTOFF: f64 = 200.0;
/// Rumble level relative to the hiss
const RAIN_RUMBLE_LEVEL: f32 = 0.3;

/// Wind band (Hz)
const WIND_BAND: (f64, f64) = (200.0, 2000.0);
/// Wind gust rate (Hz)
const WIND_GUST_RATE: f64 = 0.1;

/// Filter order for the ambience filters (rumble uses order 2)
const AMBIENCE_ORDER: usize = 4;

/// Kind of colored noise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    Pink,
    Brown,
    Ocean,
    Rain,
    Wind,
}

impl fmt::Display for NoiseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NoiseKind::Pink => "pink",
            NoiseKind::Brown => "brown",
            NoiseKind::Ocean => "ocean",
            NoiseKind::Rain => "rain",
            NoiseKind::Wind => "wind",
        };
        f.write_str(name)
    }
}

/// Generate stereo colored noise peak-normalized to `amplitude`
///
/// Both channels carry the identical signal.
pub fn generate_noise(
    kind: NoiseKind,
    duration_secs: f64,
    sample_rate: u32,
    amplitude: f32,
    rng: &mut NoiseSource,
) -> Result<AudioBuffer> {
    let frames = frames_for_duration(duration_secs, sample_rate)?;
    let signal = noise_signal(kind, frames, sample_rate, amplitude, rng)?;
    Ok(to_stereo(signal, sample_rate))
}

/// Mono colored noise of `frames` samples, peak-normalized to `amplitude`
pub(crate) fn noise_signal(
    kind: NoiseKind,
    frames: usize,
    sample_rate: u32,
    amplitude: f32,
    rng: &mut NoiseSource,
) -> Result<Vec<f32>> {
    debug!("Generating {} noise: {} frames @ {} Hz", kind, frames, sample_rate);

    let mut signal = match kind {
        NoiseKind::Pink => power_law(rng.white(frames), sample_rate, 0.5),
        NoiseKind::Brown => power_law(rng.white(frames), sample_rate, 1.0),
        NoiseKind::Ocean => ocean(frames, sample_rate, rng)?,
        NoiseKind::Rain => rain(frames, sample_rate, rng)?,
        NoiseKind::Wind => wind(frames, sample_rate, rng)?,
    };

    normalize_slice(&mut signal, amplitude)?;
    Ok(signal)
}

/// Scale each bin's magnitude by `f^-exponent`
fn power_law(white: Vec<f32>, sample_rate: u32, exponent: f64) -> Vec<f32> {
    shape_spectrum(&white, sample_rate, |f| f.powf(-exponent))
}

fn ocean(frames: usize, sample_rate: u32, rng: &mut NoiseSource) -> Result<Vec<f32>> {
    let bed = power_law(rng.white(frames), sample_rate, OCEAN_EXPONENT);

    let (low, high) = OCEAN_SWELL_BAND;
    let swell_design = FilterDesign::band_pass(low, high, AMBIENCE_ORDER, sample_rate);
    let mut swell = zero_phase(&swell_design, &rng.white(frames))?;
    normalize_slice(&mut swell, OCEAN_SWELL_DEPTH)?;

    let offset = 1.0 - OCEAN_SWELL_DEPTH;
    Ok(bed
        .iter()
        .zip(&swell)
        .map(|(b, s)| b * (s + offset))
        .collect())
}

fn rain(frames: usize, sample_rate: u32, rng: &mut NoiseSource) -> Result<Vec<f32>> {
    let hiss_design = FilterDesign::high_pass(RAIN_HISS_CUTOFF, AMBIENCE_ORDER, sample_rate);
    let hiss = zero_phase(&hiss_design, &rng.white(frames))?;

    let rumble_design = FilterDesign::low_pass(RAIN_RUMBLE_CUTOFF, 2, sample_rate);
    let rumble = zero_phase(&rumble_design, &rng.white(frames))?;

    Ok(hiss
        .iter()
        .zip(&rumble)
        .map(|(h, r)| h + RAIN_RUMBLE_LEVEL * r)
        .collect())
}

fn wind(frames: usize, sample_rate: u32, rng: &mut NoiseSource) -> Result<Vec<f32>> {
    let (low, high) = WIND_BAND;
    let design = FilterDesign::band_pass(low, high, AMBIENCE_ORDER, sample_rate);
    let mut band = zero_phase(&design, &rng.white(frames))?;

    let step = TAU * WIND_GUST_RATE / sample_rate as f64;
    for (i, s) in band.iter_mut().enumerate() {
        let gust = 0.5 + 0.5 * (step * i as f64).sin();
        *s *= gust as f32;
    }
    Ok(band)
}
