//! Envelope & Normalization Stage
//!
//! Linear fades and peak normalization shared by every generator. All
//! operations mutate the buffer in place and guard the cases that would
//! otherwise produce NaN/Inf output.

use log::debug;

use crate::engine::buffer::{peak_abs, AudioBuffer};
use crate::error::{HarmoniaError, Result};

/// Peak below which a buffer is treated as silent
pub const NEAR_ZERO_PEAK: f32 = 1e-9;

fn check_target(target_peak: f32) -> Result<()> {
    if !target_peak.is_finite() || target_peak <= 0.0 {
        return Err(HarmoniaError::invalid_parameter(
            "target_peak",
            target_peak,
            "a positive finite amplitude",
        ));
    }
    Ok(())
}

/// Scale `samples` so their peak absolute value equals `target_peak`
///
/// # Errors
/// * `SilentBuffer` - If the peak is below [`NEAR_ZERO_PEAK`]
/// * `InvalidParameter` - If `target_peak` is not positive and finite
pub fn normalize_slice(samples: &mut [f32], target_peak: f32) -> Result<()> {
    check_target(target_peak)?;

    let peak = peak_abs(samples);
    if !(peak >= NEAR_ZERO_PEAK) || !peak.is_finite() {
        return Err(HarmoniaError::SilentBuffer { peak: peak as f64 });
    }

    let gain = target_peak / peak;
    for s in samples.iter_mut() {
        *s *= gain;
    }
    Ok(())
}

/// Rescale every sample by `target_peak / max(|samples|)` across all channels
///
/// Inter-channel balance is preserved.
pub fn normalize(buffer: &mut AudioBuffer, target_peak: f32) -> Result<()> {
    check_target(target_peak)?;

    let peak = buffer.peak();
    if !(peak >= NEAR_ZERO_PEAK) || !peak.is_finite() {
        return Err(HarmoniaError::SilentBuffer { peak: peak as f64 });
    }

    let gain = target_peak / peak;
    for channel in buffer.channels_mut() {
        for s in channel.iter_mut() {
            *s *= gain;
        }
    }
    debug!("Normalized peak {:.4} -> {:.4}", peak, target_peak);
    Ok(())
}

/// Normalize each channel independently to `target_peak`
///
/// Every channel is checked before any is scaled, so a silent channel
/// leaves the whole buffer untouched.
pub fn normalize_channels(buffer: &mut AudioBuffer, target_peak: f32) -> Result<()> {
    check_target(target_peak)?;

    let peaks: Vec<f32> = (0..buffer.num_channels())
        .map(|ch| peak_abs(buffer.channel(ch)))
        .collect();
    if let Some(&peak) = peaks
        .iter()
        .find(|&&p| !(p >= NEAR_ZERO_PEAK) || !p.is_finite())
    {
        return Err(HarmoniaError::SilentBuffer { peak: peak as f64 });
    }

    for (channel, peak) in buffer.channels_mut().zip(peaks) {
        let gain = target_peak / peak;
        for s in channel.iter_mut() {
            *s *= gain;
        }
    }
    Ok(())
}

/// Min-max rescale `samples` onto `[low, high]`
///
/// A constant input has no range to stretch and maps to `high`.
pub fn rescale_to_range(samples: &mut [f32], low: f32, high: f32) {
    let (min, max) = samples
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)));

    let span = max - min;
    if !(span > 0.0) {
        samples.iter_mut().for_each(|s| *s = high);
        return;
    }

    let scale = (high - low) / span;
    for s in samples.iter_mut() {
        *s = (low + (*s - min) * scale).clamp(low, high);
    }
}

/// Gain of a linear 0→1 ramp of `len` points at index `i`
#[inline]
fn ramp(i: usize, len: usize) -> f32 {
    if len <= 1 {
        0.0
    } else {
        i as f32 / (len - 1) as f32
    }
}

/// Apply a linear fade-in and fade-out of `fade_secs` to every channel
///
/// The first and last `round(fade_secs * sample_rate)` samples are multiplied
/// by a ramp from 0 to 1 and from 1 to 0 respectively, so the very first and
/// very last samples become zero.
///
/// # Errors
/// * `InvalidParameter` - If `fade_secs` is negative or not finite
/// * `InvalidFade` - If one fade region is longer than half the buffer
pub fn fade(buffer: &mut AudioBuffer, fade_secs: f64) -> Result<()> {
    if !fade_secs.is_finite() || fade_secs < 0.0 {
        return Err(HarmoniaError::invalid_parameter(
            "fade_secs",
            fade_secs,
            "a non-negative number of seconds",
        ));
    }

    let fade_samples = (fade_secs * buffer.sample_rate() as f64).round() as usize;
    let len = buffer.num_samples();
    if fade_samples == 0 {
        return Ok(());
    }
    if fade_samples * 2 > len {
        return Err(HarmoniaError::InvalidFade {
            fade_samples,
            buffer_len: len,
        });
    }

    for channel in buffer.channels_mut() {
        for i in 0..fade_samples {
            let gain = ramp(i, fade_samples);
            channel[i] *= gain;
            channel[len - 1 - i] *= gain;
        }
    }
    Ok(())
}
