//! Audio Buffer Management
//!
//! Provides the core audio buffer type shared by every generator, the
//! envelope stage and the exporter. Samples are stored non-interleaved as
//! 32-bit floats, one `Vec<f32>` per channel.

use crate::error::{HarmoniaError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default sample rate for generated tracks (44.1kHz)
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert linear amplitude to decibels
///
/// Returns -f32::INFINITY for zero input.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Number of samples per channel for a duration at a sample rate
///
/// Always `round(duration_secs * sample_rate)`.
///
/// # Errors
/// * `InvalidParameter` - If the duration is not a positive finite number,
///   the sample rate is zero, or the product rounds to zero samples
pub fn frames_for_duration(duration_secs: f64, sample_rate: u32) -> Result<usize> {
    if sample_rate == 0 {
        return Err(HarmoniaError::invalid_parameter(
            "sample_rate",
            sample_rate,
            "> 0 Hz",
        ));
    }
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(HarmoniaError::invalid_parameter(
            "duration_secs",
            duration_secs,
            "a positive number of seconds",
        ));
    }

    let frames = (duration_secs * sample_rate as f64).round() as usize;
    if frames == 0 {
        return Err(HarmoniaError::invalid_parameter(
            "duration_secs",
            duration_secs,
            "at least one sample",
        ));
    }
    Ok(frames)
}

/// Peak absolute value of a slice of samples
#[inline]
pub fn peak_abs(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
}

/// Calculate the RMS level of an audio buffer in dB
///
/// Returns -f32::INFINITY for empty or silent buffers.
pub fn calculate_rms(buffer: &AudioBuffer) -> f32 {
    let total_samples = buffer.num_channels() * buffer.num_samples();
    if total_samples == 0 {
        return f32::NEG_INFINITY;
    }

    let sum_squares: f64 = buffer
        .samples
        .iter()
        .flat_map(|channel| channel.iter())
        .map(|&s| (s as f64) * (s as f64))
        .sum();

    let rms = (sum_squares / total_samples as f64).sqrt() as f32;
    linear_to_db(rms)
}

/// Calculate the peak level of an audio buffer in dB
pub fn calculate_peak(buffer: &AudioBuffer) -> f32 {
    linear_to_db(buffer.peak())
}

// ============================================================================
// Channel Layout
// ============================================================================

/// Audio channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    /// Single channel (mono)
    Mono,
    /// Two channels (stereo: left, right)
    #[default]
    Stereo,
}

impl ChannelLayout {
    /// Returns the number of channels for this layout
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Create a ChannelLayout from a channel count
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Core audio buffer type for every generated track
///
/// All channels always hold the same number of samples. A buffer is created
/// by a generator, mutated in place by the envelope stage and then only read
/// by the exporter.
///
/// # Example
/// ```
/// use harmonia::engine::buffer::{AudioBuffer, ChannelLayout};
///
/// // One second of stereo silence at 44.1kHz
/// let buffer = AudioBuffer::new(44100, ChannelLayout::Stereo, 44100);
/// assert_eq!(buffer.channels(), 2);
/// assert_eq!(buffer.len(), 44100);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Sample data: outer Vec is channels, inner Vec is samples
    pub(crate) samples: Vec<Vec<f32>>,
    /// Sample rate in Hz
    pub(crate) sample_rate: u32,
}

impl AudioBuffer {
    /// Create a new zeroed buffer with the given length, layout and rate
    pub fn new(num_samples: usize, layout: ChannelLayout, sample_rate: u32) -> Self {
        Self {
            samples: vec![vec![0.0_f32; num_samples]; layout.num_channels()],
            sample_rate,
        }
    }

    /// Create a buffer from per-channel sample vectors
    ///
    /// # Errors
    /// * `UnsupportedFormat` - If there are not 1 or 2 channels
    /// * `ChannelMismatch` - If the channels differ in length
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if ChannelLayout::from_count(channels.len()).is_none() {
            return Err(HarmoniaError::UnsupportedFormat {
                format: format!("{}-channel audio (only mono/stereo supported)", channels.len()),
            });
        }

        let expected = channels[0].len();
        if let Some(bad) = channels.iter().find(|ch| ch.len() != expected) {
            return Err(HarmoniaError::ChannelMismatch {
                expected: format!("{} samples per channel", expected),
                actual: format!("{} samples", bad.len()),
            });
        }

        Ok(Self {
            samples: channels,
            sample_rate,
        })
    }

    /// Create a mono buffer that takes ownership of `samples`
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples: vec![samples],
            sample_rate,
        }
    }

    /// Create an audio buffer from interleaved sample data
    ///
    /// # Errors
    /// * `InvalidAudio` - If the data length doesn't match the layout
    pub fn from_interleaved(
        interleaved: &[f32],
        layout: ChannelLayout,
        sample_rate: u32,
    ) -> Result<Self> {
        let num_channels = layout.num_channels();

        if interleaved.len() % num_channels != 0 {
            return Err(HarmoniaError::InvalidAudio {
                reason: format!(
                    "Interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    num_channels
                ),
                source: None,
            });
        }

        let num_samples = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(num_samples); num_channels];

        for frame in interleaved.chunks_exact(num_channels) {
            for (ch, &sample) in frame.iter().enumerate() {
                samples[ch].push(sample);
            }
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Get the number of channels
    #[inline]
    pub fn channels(&self) -> usize {
        self.samples.len()
    }

    /// Alias for channels()
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels()
    }

    /// Get the number of samples per channel
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    /// Check if the buffer is empty (no samples)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Alias for len()
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.len()
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the duration in seconds
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.len() as f64 / self.sample_rate as f64
    }

    /// Get immutable access to a channel's samples
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.samples[index]
    }

    /// Iterate mutably over every channel
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut Vec<f32>> {
        self.samples.iter_mut()
    }

    /// Consume the buffer and return its channels
    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.samples
    }

    /// Peak absolute sample value across all channels (linear)
    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .map(|ch| peak_abs(ch))
            .fold(0.0_f32, f32::max)
    }

    /// Check if all samples are finite (not NaN or Infinity)
    pub fn is_finite(&self) -> bool {
        self.samples
            .iter()
            .flat_map(|ch| ch.iter())
            .all(|s| s.is_finite())
    }
}

// ============================================================================
// Tests
// ============================================================================
