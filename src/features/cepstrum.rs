//! Real cepstrum and the pitch features derived from it
//!
//! The cepstrum is a DCT-II of the (log or square-root compressed)
//! magnitude spectrum. A harmonic sound concentrates cepstral energy at
//! the quefrency of its fundamental, so the peak location doubles as a
//! pitch estimate and the peak height as a harmonicity measure.

use crate::config::CepstrumTransform;
use crate::dsp::DctII;
use crate::features::AMPLITUDE_FLOOR;

/// Quefrency-domain transform of the one-sided magnitude spectrum.
pub struct RealCepstrum {
    dct: DctII,
    transform: CepstrumTransform,
}

impl RealCepstrum {
    pub fn new(window_size: usize, transform: CepstrumTransform) -> Self {
        Self {
            dct: DctII::new(window_size / 2 + 1),
            transform,
        }
    }

    /// Cepstrum of one magnitude spectrum, `window_size / 2 + 1` values.
    ///
    /// Magnitudes are floored before compression so silence stays finite.
    /// The leading coefficient is divided by sqrt(2) and the whole output
    /// halved, matching the unitary DCT up to a constant.
    pub fn process(&self, magnitude: &[f32]) -> Vec<f32> {
        debug_assert_eq!(magnitude.len(), self.dct.size());

        let compressed: Vec<f32> = magnitude
            .iter()
            .map(|m| {
                let v = m.max(AMPLITUDE_FLOOR);
                match self.transform {
                    CepstrumTransform::Log => v.ln(),
                    CepstrumTransform::Sqrt => v.sqrt(),
                }
            })
            .collect();

        let mut output = self.dct.process(&compressed);
        output[0] /= std::f32::consts::SQRT_2;
        for c in &mut output {
            *c *= 0.5;
        }
        output
    }
}

/// Pitch band searched for the cepstral peak, in Hz.
const PITCH_MIN_HZ: f32 = 90.0;
const PITCH_MAX_HZ: f32 = 1000.0;

/// Pitch-related scalars extracted from a cepstrum/spectrum pair.
pub struct CepstralFeatures {
    window_size: usize,
    /// Quefrency index of the highest searched pitch.
    lag_min: usize,
    /// One past the quefrency index of the lowest searched pitch.
    lag_max: usize,

    tonality: f32,
    tonality1: f32,
    pitch_density: f32,
}

impl CepstralFeatures {
    pub fn new(sample_rate: u32, window_size: usize) -> Self {
        let cepstrum_size = window_size / 2 + 1;
        let lag_min = ((sample_rate as f32 / PITCH_MAX_HZ).round() as usize).max(1);
        let mut lag_max = (sample_rate as f32 / PITCH_MIN_HZ).round() as usize;
        if lag_max > cepstrum_size {
            log::warn!(
                "[CepstralFeatures] pitch search lag {} exceeds cepstrum size {}; clamping",
                lag_max,
                cepstrum_size
            );
            lag_max = cepstrum_size;
        }

        Self {
            window_size,
            lag_min,
            lag_max,
            tonality: 0.0,
            tonality1: 0.0,
            pitch_density: 0.0,
        }
    }

    /// Update the feature values from one frame.
    ///
    /// `magnitude` and `cepstrum` must come from the same window. Spectral
    /// peak comparisons run on the floored squared magnitude so the values
    /// pair with the compression applied inside the cepstrum.
    pub fn process(&mut self, magnitude: &[f32], cepstrum: &[f32]) {
        if self.lag_min >= self.lag_max || self.lag_min >= cepstrum.len() {
            self.tonality = 0.0;
            self.tonality1 = 0.0;
            self.pitch_density = 0.0;
            return;
        }

        // Strongest cepstral peak in the pitch band; the band's first bin
        // seeds the maximum but is left out of the density sum
        let mut ceps_max = cepstrum[self.lag_min];
        let mut ceps_max_lag = self.lag_min;
        let mut ceps_sum = 0.0_f32;
        for (lag, &value) in cepstrum
            .iter()
            .enumerate()
            .take(self.lag_max)
            .skip(self.lag_min + 1)
        {
            if value > ceps_max {
                ceps_max = value;
                ceps_max_lag = lag;
            }
            ceps_sum += value.abs();
        }

        let power: Vec<f32> = magnitude
            .iter()
            .map(|m| {
                let v = m.max(AMPLITUDE_FLOOR);
                v * v
            })
            .collect();

        // Harmonic partials of the detected pitch: the cepstral lag maps
        // back to a fundamental of window_size / lag spectrum bins
        let ratio = self.window_size as f32 / ceps_max_lag as f32;
        let mut partials = Vec::with_capacity(5);
        for i in 0..5 {
            let bin = (i as f32 * ratio) as usize + 1;
            if bin >= power.len() {
                break;
            }
            partials.push(power[bin]);
        }

        // The same number of strongest bins anywhere in the spectrum
        let mut top_bins = vec![0.0_f32; partials.len()];
        for &value in &power {
            if let Some(slot) = top_bins.iter().position(|top| value > *top) {
                top_bins.insert(slot, value);
                top_bins.truncate(partials.len());
            }
        }
        let top_sum: f32 = top_bins.iter().sum();

        self.tonality = ceps_max;
        self.tonality1 = if top_sum > 0.0 {
            partials.iter().map(|p| p / top_sum).sum()
        } else {
            0.0
        };
        self.pitch_density = ceps_sum / (self.lag_max - self.lag_min) as f32;
    }

    pub fn tonality(&self) -> f32 {
        self.tonality
    }

    pub fn tonality1(&self) -> f32 {
        self.tonality1
    }

    pub fn pitch_density(&self) -> f32 {
        self.pitch_density
    }
}
