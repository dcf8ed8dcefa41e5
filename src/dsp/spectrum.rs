//! Spectral helpers
//!
//! Frequency-domain shaping for the colored-noise generators and the
//! measurements used to verify generated tracks (dominant frequency, tone
//! amplitude, spectral slope).

use std::f64::consts::PI;

use log::debug;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Shape the spectrum of a real signal with a per-bin real gain
///
/// `gain(f)` is evaluated at every bin frequency `f = i * sample_rate / n`,
/// with the DC bin evaluated at `f = 1` so `1/f`-style curves stay finite.
/// The same gain is applied to each bin and its conjugate mirror, so the
/// result is real. The output has the input's length.
pub fn shape_spectrum<F>(signal: &[f32], sample_rate: u32, gain: F) -> Vec<f32>
where
    F: Fn(f64) -> f64,
{
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    let mut planner = FftPlanner::<f32>::new();
    let forward = planner.plan_fft_forward(n);
    let inverse = planner.plan_fft_inverse(n);

    let mut bins: Vec<Complex<f32>> = signal.iter().map(|&s| Complex::new(s, 0.0)).collect();
    forward.process(&mut bins);

    let bin_hz = sample_rate as f64 / n as f64;
    for i in 0..=n / 2 {
        let freq = if i == 0 { 1.0 } else { i as f64 * bin_hz };
        let g = gain(freq) as f32;
        bins[i] *= g;
        let mirror = n - i;
        if i != 0 && mirror != i {
            bins[mirror] *= g;
        }
    }

    inverse.process(&mut bins);

    debug!("Shaped {} samples ({:.3} Hz bins)", n, bin_hz);

    let norm = 1.0 / n as f32;
    bins.iter().map(|c| c.re * norm).collect()
}

/// One-sided magnitude spectrum of a Hann-windowed signal
#[derive(Debug, Clone)]
pub struct Spectrum {
    /// Width of one bin in Hz
    pub bin_hz: f64,
    /// Magnitude per bin, DC first, Nyquist last
    pub magnitudes: Vec<f64>,
}

impl Spectrum {
    /// Centre frequency of `bin`
    pub fn frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.bin_hz
    }

    /// Frequency of the strongest bin, ignoring DC
    pub fn dominant_frequency(&self) -> f64 {
        let (bin, _) = self
            .magnitudes
            .iter()
            .enumerate()
            .skip(1)
            .fold((0, f64::NEG_INFINITY), |best, (i, &m)| {
                if m > best.1 {
                    (i, m)
                } else {
                    best
                }
            });
        self.frequency(bin)
    }

    /// Energy-summed magnitude of a tone at `freq_hz`
    ///
    /// Sums power over the Hann main lobe (±2 bins), which makes the result
    /// insensitive to where the tone falls between bins. Only ratios between
    /// tones of one spectrum are meaningful.
    ///
    /// Frequencies outside the spectrum measure `0.0`.
    pub fn tone_amplitude(&self, freq_hz: f64) -> f64 {
        if self.magnitudes.is_empty() || !(self.bin_hz > 0.0) {
            return 0.0;
        }
        let center = (freq_hz / self.bin_hz).round() as usize;
        if center >= self.magnitudes.len() {
            return 0.0;
        }
        let lo = center.saturating_sub(2);
        let hi = center.saturating_add(2).min(self.magnitudes.len() - 1);
        self.magnitudes[lo..=hi]
            .iter()
            .map(|m| m * m)
            .sum::<f64>()
            .sqrt()
    }

    /// Least-squares slope of the power spectrum in dB per octave
    ///
    /// Fits `10·log10(|X|²)` against `log2(f)` over bins in `[low_hz, high_hz]`.
    /// Returns `None` when fewer than two bins fall in the range.
    pub fn slope_db_per_octave(&self, low_hz: f64, high_hz: f64) -> Option<f64> {
        let points: Vec<(f64, f64)> = self
            .magnitudes
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(i, m)| {
                let f = self.frequency(*i);
                f >= low_hz && f <= high_hz && **m > 0.0
            })
            .map(|(i, m)| (self.frequency(i).log2(), 20.0 * m.log10()))
            .collect();

        if points.len() < 2 {
            return None;
        }

        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
        let cov: f64 = points.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();
        let var: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();

        if var > 0.0 {
            Some(cov / var)
        } else {
            None
        }
    }
}

/// Hann-windowed magnitude spectrum of `samples`
pub fn magnitude_spectrum(samples: &[f32], sample_rate: u32) -> Spectrum {
    let n = samples.len();
    if n == 0 {
        return Spectrum {
            bin_hz: 0.0,
            magnitudes: Vec::new(),
        };
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);

    let mut bins: Vec<Complex<f64>> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let w = 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos();
            Complex::new(s as f64 * w, 0.0)
        })
        .collect();
    fft.process(&mut bins);

    Spectrum {
        bin_hz: sample_rate as f64 / n as f64,
        magnitudes: bins[..=n / 2].iter().map(|c| c.norm()).collect(),
    }
}
