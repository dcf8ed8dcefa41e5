//! DSP Building Blocks
//!
//! Filter design, envelopes, spectral shaping and the random source used by
//! the generators in [`crate::synth`].

pub mod envelope;
pub mod filter;
pub mod random;
pub mod spectrum;

pub use envelope::{fade, normalize, normalize_channels, normalize_slice, rescale_to_range};
pub use filter::{zero_phase, FilterDesign, FilterType, SosFilter};
pub use random::NoiseSource;
pub use spectrum::{magnitude_spectrum, shape_spectrum, Spectrum};
