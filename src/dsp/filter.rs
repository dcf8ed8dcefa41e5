//! Butterworth Filter Design and Zero-Phase Filtering
//!
//! Filters are designed as cascaded second-order sections. Each pole pair of
//! the analog Butterworth prototype becomes one bilinear-transformed biquad
//! (Audio EQ Cookbook form, which pre-warps the cutoff), odd orders add one
//! first-order section. Band-pass filters cascade a high-pass at the lower
//! edge with a low-pass at the upper edge.
//!
//! Designed coefficients are plain values: [`FilterDesign::design`] is a
//! pure function and [`SosFilter`] holds no state between calls, so filters
//! can be shared freely between tracks rendered on different threads.

use std::f64::consts::PI;

use log::debug;
use rustfft::num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::error::{HarmoniaError, Result};

/// Highest order accepted by the designer
pub const MAX_FILTER_ORDER: usize = 16;

/// Response shape of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Remove above the cutoff
    LowPass,
    /// Remove below the cutoff
    HighPass,
    /// Keep only the band between two edges
    BandPass,
}

/// Parameters of a Butterworth filter, before coefficients are derived
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterDesign {
    /// Response shape
    pub filter_type: FilterType,
    /// Cutoff in Hz, or lower band edge for band-pass
    pub low_hz: f64,
    /// Upper band edge in Hz (band-pass only)
    pub high_hz: Option<f64>,
    /// Filter order (per band edge for band-pass)
    pub order: usize,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl FilterDesign {
    /// Low-pass design
    pub fn low_pass(cutoff_hz: f64, order: usize, sample_rate: u32) -> Self {
        Self {
            filter_type: FilterType::LowPass,
            low_hz: cutoff_hz,
            high_hz: None,
            order,
            sample_rate,
        }
    }

    /// High-pass design
    pub fn high_pass(cutoff_hz: f64, order: usize, sample_rate: u32) -> Self {
        Self {
            filter_type: FilterType::HighPass,
            low_hz: cutoff_hz,
            high_hz: None,
            order,
            sample_rate,
        }
    }

    /// Band-pass design between `low_hz` and `high_hz`
    pub fn band_pass(low_hz: f64, high_hz: f64, order: usize, sample_rate: u32) -> Self {
        Self {
            filter_type: FilterType::BandPass,
            low_hz,
            high_hz: Some(high_hz),
            order,
            sample_rate,
        }
    }

    /// Nyquist frequency for this design
    pub fn nyquist(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    /// Validate the design parameters
    ///
    /// Cutoffs at or above Nyquist and inverted bands are rejected rather than
    /// clamped.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(HarmoniaError::InvalidFilter {
                reason: "sample rate must be positive".to_string(),
            });
        }
        if self.order == 0 || self.order > MAX_FILTER_ORDER {
            return Err(HarmoniaError::InvalidFilter {
                reason: format!(
                    "order {} outside 1..={}",
                    self.order, MAX_FILTER_ORDER
                ),
            });
        }

        self.check_edge("cutoff", self.low_hz)?;

        if self.filter_type == FilterType::BandPass {
            let high = self.high_hz.ok_or_else(|| HarmoniaError::InvalidFilter {
                reason: "band-pass design needs an upper edge".to_string(),
            })?;
            self.check_edge("upper band edge", high)?;
            if self.low_hz >= high {
                return Err(HarmoniaError::InvalidFilter {
                    reason: format!(
                        "inverted band: low edge {} Hz is not below high edge {} Hz",
                        self.low_hz, high
                    ),
                });
            }
        }

        Ok(())
    }

    fn check_edge(&self, name: &str, hz: f64) -> Result<()> {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(HarmoniaError::InvalidFilter {
                reason: format!("{} {} Hz must be a positive frequency", name, hz),
            });
        }
        if hz >= self.nyquist() {
            return Err(HarmoniaError::InvalidFilter {
                reason: format!(
                    "{} {} Hz is at or above Nyquist ({} Hz at {} Hz sample rate)",
                    name,
                    hz,
                    self.nyquist(),
                    self.sample_rate
                ),
            });
        }
        Ok(())
    }

    /// Derive the second-order sections for this design
    pub fn design(&self) -> Result<SosFilter> {
        self.validate()?;

        let fs = self.sample_rate as f64;
        let sections = match self.filter_type {
            FilterType::LowPass => butterworth_sections(Pass::Low, self.low_hz, self.order, fs),
            FilterType::HighPass => butterworth_sections(Pass::High, self.low_hz, self.order, fs),
            FilterType::BandPass => {
                let high = self.high_hz.unwrap_or(self.low_hz);
                let mut sections = butterworth_sections(Pass::High, self.low_hz, self.order, fs);
                sections.extend(butterworth_sections(Pass::Low, high, self.order, fs));
                sections
            }
        };

        debug!(
            "Designed {:?} order {} ({} - {:?} Hz @ {} Hz): {} sections",
            self.filter_type,
            self.order,
            self.low_hz,
            self.high_hz,
            self.sample_rate,
            sections.len()
        );

        Ok(SosFilter { sections })
    }
}

#[derive(Debug, Clone, Copy)]
enum Pass {
    Low,
    High,
}

/// Build the biquad cascade of an order-`order` Butterworth filter
fn butterworth_sections(pass: Pass, cutoff: f64, order: usize, fs: f64) -> Vec<Biquad> {
    let mut sections = Vec::with_capacity(order.div_ceil(2));

    for k in 0..order / 2 {
        let theta = PI * (2 * k + 1) as f64 / (2 * order) as f64;
        let q = 1.0 / (2.0 * theta.cos());
        sections.push(Biquad::second_order(pass, cutoff, q, fs));
    }
    if order % 2 == 1 {
        sections.push(Biquad::first_order(pass, cutoff, fs));
    }

    sections
}

/// Normalized biquad coefficients
///
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Biquad {
    /// Cookbook low/high-pass section with quality factor `q`
    fn second_order(pass: Pass, cutoff: f64, q: f64, fs: f64) -> Self {
        let w0 = 2.0 * PI * cutoff / fs;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let (b0, b1, b2) = match pass {
            Pass::Low => ((1.0 - cos_w0) / 2.0, 1.0 - cos_w0, (1.0 - cos_w0) / 2.0),
            Pass::High => ((1.0 + cos_w0) / 2.0, -(1.0 + cos_w0), (1.0 + cos_w0) / 2.0),
        };
        let a0 = 1.0 + alpha;

        Biquad {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: -2.0 * cos_w0 / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    /// Bilinear-transformed single pole, stored with zero second-order terms
    fn first_order(pass: Pass, cutoff: f64, fs: f64) -> Self {
        let k = (PI * cutoff / fs).tan();
        let norm = 1.0 / (1.0 + k);
        let (b0, b1) = match pass {
            Pass::Low => (k * norm, k * norm),
            Pass::High => (norm, -norm),
        };

        Biquad {
            b0,
            b1,
            b2: 0.0,
            a1: (k - 1.0) * norm,
            a2: 0.0,
        }
    }

    /// DC gain of the section
    fn dc_gain(&self) -> f64 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }

    /// Transposed direct form II state that a constant input `x0` settles to
    fn steady_state(&self, x0: f64) -> (f64, f64) {
        let g = self.dc_gain();
        let z2 = (self.b2 - self.a2 * g) * x0;
        let z1 = (self.b1 - self.a1 * g) * x0 + z2;
        (z1, z2)
    }

    /// Run the section over `signal` in place, starting from steady state
    fn run(&self, signal: &mut [f64]) {
        let Some(&first) = signal.first() else {
            return;
        };
        let (mut z1, mut z2) = self.steady_state(first);

        for x in signal.iter_mut() {
            let input = *x;
            let output = self.b0 * input + z1;
            z1 = self.b1 * input - self.a1 * output + z2;
            z2 = self.b2 * input - self.a2 * output;
            *x = output;
        }
    }

    fn response(&self, z_inv: Complex<f64>) -> Complex<f64> {
        let z_inv2 = z_inv * z_inv;
        let num = z_inv2 * self.b2 + z_inv * self.b1 + self.b0;
        let den = z_inv2 * self.a2 + z_inv * self.a1 + 1.0;
        num / den
    }
}

/// A designed filter: an immutable cascade of second-order sections
#[derive(Debug, Clone, PartialEq)]
pub struct SosFilter {
    sections: Vec<Biquad>,
}

impl SosFilter {
    /// Number of cascaded sections
    pub fn num_sections(&self) -> usize {
        self.sections.len()
    }

    /// Magnitude response |H| at `freq_hz` for a single forward pass
    pub fn magnitude_at(&self, freq_hz: f64, sample_rate: u32) -> f64 {
        let w = 2.0 * PI * freq_hz / sample_rate as f64;
        let z_inv = Complex::new(w.cos(), -w.sin());
        self.sections
            .iter()
            .fold(Complex::new(1.0, 0.0), |acc, s| acc * s.response(z_inv))
            .norm()
    }

    /// Causal filtering of `signal` in place (steady-state initial conditions)
    fn run(&self, signal: &mut [f64]) {
        for section in &self.sections {
            section.run(signal);
        }
    }

    /// Padding applied at each end before zero-phase filtering
    fn pad_len(&self, signal_len: usize) -> usize {
        (3 * (2 * self.sections.len() + 1)).min(signal_len.saturating_sub(1))
    }

    /// Zero-phase (forward-backward) filtering
    ///
    /// The signal is extended at both ends by odd reflection, filtered
    /// forward, reversed, filtered again and reversed back, then trimmed.
    /// The output has the same length as the input and no group delay; the
    /// effective magnitude response is |H|².
    pub fn filtfilt(&self, input: &[f32]) -> Vec<f32> {
        let n = input.len();
        if n == 0 {
            return Vec::new();
        }

        let pad = self.pad_len(n);
        let first = input[0] as f64;
        let last = input[n - 1] as f64;

        let mut ext: Vec<f64> = Vec::with_capacity(n + 2 * pad);
        ext.extend((1..=pad).rev().map(|i| 2.0 * first - input[i] as f64));
        ext.extend(input.iter().map(|&s| s as f64));
        ext.extend((1..=pad).map(|i| 2.0 * last - input[n - 1 - i] as f64));

        self.run(&mut ext);
        ext.reverse();
        self.run(&mut ext);
        ext.reverse();

        ext[pad..pad + n].iter().map(|&s| s as f32).collect()
    }
}

/// Design `design` and apply it with zero-phase filtering
pub fn zero_phase(design: &FilterDesign, input: &[f32]) -> Result<Vec<f32>> {
    Ok(design.design()?.filtfilt(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    const SR: u32 = 44100;

    fn sine(freq: f64, frames: usize) -> Vec<f32> {
        (0..frames)
            .map(|i| (2.0 * PI * freq * i as f64 / SR as f64).sin() as f32)
            .collect()
    }

    #[test_case(2 ; "order 2")]
    #[test_case(3 ; "order 3")]
    #[test_case(4 ; "order 4")]
    fn test_low_pass_is_3db_down_at_cutoff(order: usize) {
        let filter = FilterDesign::low_pass(1000.0, order, SR).design().unwrap();
        assert_abs_diff_eq!(filter.magnitude_at(1000.0, SR), 0.5_f64.sqrt(), epsilon = 1e-6);
        assert_abs_diff_eq!(filter.magnitude_at(50.0, SR), 1.0, epsilon = 1e-3);
        assert!(filter.magnitude_at(10_000.0, SR) < 0.01);
        assert_eq!(filter.num_sections(), order.div_ceil(2));
    }

    #[test]
    fn test_high_pass_response() {
        let filter = FilterDesign::high_pass(2000.0, 4, SR).design().unwrap();
        assert_abs_diff_eq!(filter.magnitude_at(2000.0, SR), 0.5_f64.sqrt(), epsilon = 1e-6);
        assert_abs_diff_eq!(filter.magnitude_at(15_000.0, SR), 1.0, epsilon = 1e-3);
        assert!(filter.magnitude_at(200.0, SR) < 1e-3);
    }

    #[test]
    fn test_band_pass_response() {
        let filter = FilterDesign::band_pass(200.0, 2000.0, 4, SR).design().unwrap();
        let center = (200.0_f64 * 2000.0).sqrt();
        assert_abs_diff_eq!(filter.magnitude_at(center, SR), 1.0, epsilon = 0.01);
        assert!(filter.magnitude_at(20.0, SR) < 1e-3);
        assert!(filter.magnitude_at(15_000.0, SR) < 1e-3);
        assert_eq!(filter.num_sections(), 4);
    }

    #[test]
    fn test_very_low_band_is_stable() {
        // Swell modulation band used by the ocean generator
        let filter = FilterDesign::band_pass(0.5, 2.0, 4, SR).design().unwrap();
        assert_abs_diff_eq!(filter.magnitude_at(1.0, SR), 1.0, epsilon = 0.05);
        assert!(filter.magnitude_at(50.0, SR) < 1e-4);
    }

    #[test_case(FilterDesign::low_pass(22050.0, 4, SR) ; "cutoff at nyquist")]
    #[test_case(FilterDesign::low_pass(30000.0, 4, SR) ; "cutoff above nyquist")]
    #[test_case(FilterDesign::high_pass(0.0, 4, SR) ; "zero cutoff")]
    #[test_case(FilterDesign::high_pass(-10.0, 4, SR) ; "negative cutoff")]
    #[test_case(FilterDesign::low_pass(f64::NAN, 4, SR) ; "nan cutoff")]
    #[test_case(FilterDesign::band_pass(2000.0, 200.0, 4, SR) ; "inverted band")]
    #[test_case(FilterDesign::band_pass(500.0, 500.0, 4, SR) ; "empty band")]
    #[test_case(FilterDesign::band_pass(200.0, 23000.0, 4, SR) ; "band edge above nyquist")]
    #[test_case(FilterDesign::low_pass(100.0, 0, SR) ; "zero order")]
    #[test_case(FilterDesign::low_pass(100.0, 4, 0) ; "zero sample rate")]
    fn test_invalid_designs_fail_fast(design: FilterDesign) {
        match design.design() {
            Err(HarmoniaError::InvalidFilter { reason }) => assert!(!reason.is_empty()),
            other => panic!("Expected InvalidFilter, got {:?}", other),
        }
    }

    #[test]
    fn test_filtfilt_has_no_phase_shift() {
        let input = sine(100.0, 8820);
        let output = zero_phase(&FilterDesign::low_pass(1000.0, 4, SR), &input).unwrap();
        assert_eq!(output.len(), input.len());

        // Away from the edges the passband tone comes through undelayed
        for i in 2000..6000 {
            assert_abs_diff_eq!(output[i], input[i], epsilon = 5e-3);
        }
    }

    #[test]
    fn test_filtfilt_removes_stopband_tone() {
        let input = sine(8000.0, 8820);
        let output = zero_phase(&FilterDesign::low_pass(500.0, 4, SR), &input).unwrap();
        let peak = output[1000..7000].iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        assert!(peak < 1e-3, "stopband peak {}", peak);
    }

    #[test]
    fn test_filtfilt_constant_input() {
        let input = vec![0.5_f32; 4000];

        let low = zero_phase(&FilterDesign::low_pass(50.0, 4, SR), &input).unwrap();
        for &s in &low {
            assert_abs_diff_eq!(s, 0.5, epsilon = 1e-5);
        }

        let high = zero_phase(&FilterDesign::high_pass(50.0, 4, SR), &input).unwrap();
        for &s in &high {
            assert_abs_diff_eq!(s, 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_filtfilt_short_signals() {
        let filter = FilterDesign::low_pass(1000.0, 4, SR).design().unwrap();
        assert!(filter.filtfilt(&[]).is_empty());
        assert_eq!(filter.filtfilt(&[0.25]).len(), 1);
        assert_eq!(filter.filtfilt(&[0.1, 0.2, 0.3, 0.4, 0.5]).len(), 5);
    }
}
