//! Windowed power spectrum
//!
//! Turns one analysis window of time-domain samples into a one-sided power
//! spectrum: Hamming window, forward FFT, squared magnitudes for the
//! non-redundant bins. Optionally normalizes by the squared coherent gain
//! of the window so that a full-scale sine reads near 1.0 regardless of
//! window length.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Computes one-sided power spectra over fixed-size windows.
pub struct PowerSpectrum {
    window_size: usize,
    fft: Arc<dyn Fft<f32>>,
    /// Precomputed Hamming window coefficients.
    window: Vec<f32>,
    /// Per-bin normalization factor; 1.0 when scaling is disabled.
    scale: f32,
}

impl PowerSpectrum {
    /// Create a spectrum processor for windows of `window_size` samples.
    ///
    /// # Arguments
    /// * `window_size` - Analysis window length in samples
    /// * `scaled` - Normalize bins by `(2 / sum(window))^2`
    pub fn new(window_size: usize, scaled: bool) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(window_size);

        let window: Vec<f32> = (0..window_size)
            .map(|i| {
                0.54 - 0.46
                    * (2.0 * std::f32::consts::PI * i as f32 / (window_size - 1) as f32).cos()
            })
            .collect();

        let scale = if scaled {
            let gain: f32 = window.iter().sum();
            (2.0 / gain) * (2.0 / gain)
        } else {
            1.0
        };

        Self {
            window_size,
            fft,
            window,
            scale,
        }
    }

    /// Number of bins in the one-sided output: `window_size / 2 + 1`.
    pub fn output_size(&self) -> usize {
        self.window_size / 2 + 1
    }

    /// Compute the power spectrum of one window.
    ///
    /// # Arguments
    /// * `samples` - Exactly `window_size` time-domain samples
    ///
    /// # Returns
    /// Power per bin for bins `0..=window_size/2`. The DC and Nyquist bins
    /// use only the real component, which is exact for real input.
    pub fn process(&self, samples: &[f32]) -> Vec<f32> {
        debug_assert_eq!(samples.len(), self.window_size);

        let mut buffer: Vec<Complex<f32>> = samples
            .iter()
            .zip(self.window.iter())
            .map(|(sample, window_val)| Complex::new(sample * window_val, 0.0))
            .collect();

        self.fft.process(&mut buffer);

        let half = self.window_size / 2;
        let mut power = Vec::with_capacity(half + 1);
        power.push(buffer[0].re * buffer[0].re * self.scale);
        for bin in buffer.iter().take(half).skip(1) {
            power.push(bin.norm_sqr() * self.scale);
        }
        if self.window_size % 2 == 0 {
            power.push(buffer[half].re * buffer[half].re * self.scale);
        } else {
            power.push(buffer[half].norm_sqr() * self.scale);
        }
        power
    }
}

/// Square-root of each power bin, the magnitude spectrum.
pub fn magnitude_spectrum(power: &[f32]) -> Vec<f32> {
    power.iter().map(|p| p.sqrt()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_size() {
        let spectrum = PowerSpectrum::new(512, false);
        assert_eq!(spectrum.output_size(), 257);

        let odd = PowerSpectrum::new(255, false);
        assert_eq!(odd.output_size(), 128);
    }

    #[test]
    fn test_dc_signal_concentrates_in_bin_zero() {
        let spectrum = PowerSpectrum::new(512, false);
        let samples = vec![1.0_f32; 512];
        let power = spectrum.process(&samples);

        // All-ones input times the window sums to the window gain
        let gain: f32 = (0..512)
            .map(|i| {
                0.54 - 0.46 * (2.0 * std::f32::consts::PI * i as f32 / 511.0).cos()
            })
            .sum();
        let expected = gain * gain;
        assert!(
            (power[0] - expected).abs() / expected < 1e-4,
            "DC power {} should match squared window gain {}",
            power[0],
            expected
        );
    }

    #[test]
    fn test_scaling_normalizes_dc_to_four() {
        // With (2/sum(w))^2 scaling an all-ones signal wholly inside the
        // window reads exactly 2^2 at DC.
        let spectrum = PowerSpectrum::new(512, true);
        let samples = vec![1.0_f32; 512];
        let power = spectrum.process(&samples);
        assert!(
            (power[0] - 4.0).abs() < 1e-3,
            "scaled DC power should be 4.0, got {}",
            power[0]
        );
    }

    #[test]
    fn test_sine_peaks_at_matching_bin() {
        let spectrum = PowerSpectrum::new(512, false);
        let bin = 16;
        let samples: Vec<f32> = (0..512)
            .map(|i| (2.0 * std::f32::consts::PI * bin as f32 * i as f32 / 512.0).sin())
            .collect();
        let power = spectrum.process(&samples);

        let peak = power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, bin, "sine at bin {} should peak there", bin);
    }

    #[test]
    fn test_magnitude_is_sqrt_of_power() {
        let power = vec![0.0, 4.0, 9.0, 0.25];
        let mag = magnitude_spectrum(&power);
        assert_eq!(mag, vec![0.0, 2.0, 3.0, 0.5]);
    }
}
