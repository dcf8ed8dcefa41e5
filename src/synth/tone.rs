//! Tone Synthesizer
//!
//! Binaural beats (one pure tone per ear, offset by the beat frequency) and
//! isochronic tones (a single carrier gated by a smoothed square wave).

use log::debug;

use crate::dsp::envelope::rescale_to_range;
use crate::dsp::filter::{zero_phase, FilterDesign};
use crate::dsp::random::NoiseSource;
use crate::engine::buffer::{frames_for_duration, AudioBuffer};
use crate::error::Result;
use crate::synth::compose::{from_ears, to_stereo};
use crate::synth::noise::{noise_signal, NoiseKind};
use crate::synth::{check_frequency, sine};

/// Peak amplitude of the pink-noise floor under a binaural beat
///
/// About -25 dB relative to the unit-amplitude tones.
pub const PINK_FLOOR_AMPLITUDE: f32 = 0.056;

/// Order of the low-pass that rounds the isochronic gate edges
const GATE_SMOOTHING_ORDER: usize = 4;

/// Generate a binaural beat
///
/// Left ear: `sin(2π·carrier·t)`. Right ear: `sin(2π·(carrier + beat)·t)`.
/// The same pink-noise floor is added to both ears. The result is not
/// normalized; tones have unit amplitude.
pub fn generate_binaural(
    beat_freq: f64,
    carrier_freq: f64,
    duration_secs: f64,
    sample_rate: u32,
    rng: &mut NoiseSource,
) -> Result<AudioBuffer> {
    check_frequency("beat_freq", beat_freq, sample_rate)?;
    check_frequency("carrier_freq", carrier_freq, sample_rate)?;
    check_frequency("carrier_freq + beat_freq", carrier_freq + beat_freq, sample_rate)?;
    let frames = frames_for_duration(duration_secs, sample_rate)?;

    debug!(
        "Binaural: carrier {} Hz, beat {} Hz, {} frames",
        carrier_freq, beat_freq, frames
    );

    let mut left = sine(carrier_freq, frames, sample_rate);
    let mut right = sine(carrier_freq + beat_freq, frames, sample_rate);

    let floor = noise_signal(NoiseKind::Pink, frames, sample_rate, PINK_FLOOR_AMPLITUDE, rng)?;
    for ((l, r), n) in left.iter_mut().zip(right.iter_mut()).zip(&floor) {
        *l += n;
        *r += n;
    }

    from_ears(left, right, sample_rate)
}

/// Smoothed 0..1 gate envelope at `mod_freq`
///
/// A 50%-duty square wave (high for the first half of each period) is
/// low-passed at `2·mod_freq` with zero-phase filtering and min-max rescaled
/// to `[0, 1]`, so it never goes negative and never exceeds unity.
pub fn isochronic_envelope(mod_freq: f64, frames: usize, sample_rate: u32) -> Result<Vec<f32>> {
    check_frequency("mod_freq", mod_freq, sample_rate)?;

    let square: Vec<f32> = (0..frames)
        .map(|i| {
            let cycles = mod_freq * i as f64 / sample_rate as f64;
            if cycles.fract() < 0.5 {
                1.0
            } else {
                -1.0
            }
        })
        .collect();

    let smoothing =
        FilterDesign::low_pass(2.0 * mod_freq, GATE_SMOOTHING_ORDER, sample_rate);
    let mut envelope = zero_phase(&smoothing, &square)?;
    rescale_to_range(&mut envelope, 0.0, 1.0);
    Ok(envelope)
}

/// Generate an isochronic tone
///
/// `sin(2π·base_tone·t)` multiplied by [`isochronic_envelope`]; both ears
/// carry the identical signal.
pub fn generate_isochronic(
    mod_freq: f64,
    base_tone: f64,
    duration_secs: f64,
    sample_rate: u32,
) -> Result<AudioBuffer> {
    check_frequency("base_tone", base_tone, sample_rate)?;
    let frames = frames_for_duration(duration_secs, sample_rate)?;

    debug!(
        "Isochronic: base {} Hz, modulation {} Hz, {} frames",
        base_tone, mod_freq, frames
    );

    let envelope = isochronic_envelope(mod_freq, frames, sample_rate)?;
    let mut carrier = sine(base_tone, frames, sample_rate);
    for (c, e) in carrier.iter_mut().zip(&envelope) {
        *c *= e;
    }

    Ok(to_stereo(carrier, sample_rate))
}
