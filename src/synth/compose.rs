//! Channel Composer
//!
//! Every exported track is stereo: mono sources are duplicated to both ears,
//! binaural sources supply one signal per ear.

use crate::engine::buffer::AudioBuffer;
use crate::error::{HarmoniaError, Result};

/// Duplicate a mono signal to both stereo channels
pub fn to_stereo(mono: Vec<f32>, sample_rate: u32) -> AudioBuffer {
    let right = mono.clone();
    AudioBuffer {
        samples: vec![mono, right],
        sample_rate,
    }
}

/// Build a stereo buffer from separate left and right signals
///
/// # Errors
/// * `ChannelMismatch` - If the ears differ in length
pub fn from_ears(left: Vec<f32>, right: Vec<f32>, sample_rate: u32) -> Result<AudioBuffer> {
    AudioBuffer::from_channels(vec![left, right], sample_rate)
}

/// Return `buffer` as stereo, duplicating a mono channel if needed
pub fn ensure_stereo(buffer: AudioBuffer) -> Result<AudioBuffer> {
    match buffer.num_channels() {
        2 => Ok(buffer),
        1 => {
            let sample_rate = buffer.sample_rate();
            let mono = buffer.into_channels().remove(0);
            Ok(to_stereo(mono, sample_rate))
        }
        n => Err(HarmoniaError::ChannelMismatch {
            expected: "mono or stereo".to_string(),
            actual: format!("{} channels", n),
        }),
    }
}
