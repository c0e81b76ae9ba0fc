//! Window energy and the activity gate
//!
//! Energy is the mean squared amplitude of the raw (unwindowed) samples.
//! The gate smooths the amplitude envelope with a second-order Butterworth
//! lowpass and opens only when the window is loud both absolutely and
//! relative to that smoothed floor, so quiet room tone between takes does
//! not contaminate the gated statistics.

use crate::config::EnergyGateConfig;

/// Mean squared amplitude of one analysis window.
pub fn energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|x| x * x).sum();
    sum / samples.len() as f32
}

/// Second-order IIR section in transposed direct form II.
///
/// State runs in f64; the lowpass pole sits close to the unit circle and
/// f32 state audibly drifts over long files.
#[derive(Debug, Clone)]
struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    s1: f64,
    s2: f64,
}

impl Biquad {
    fn new(b0: f64, b1: f64, b2: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0,
            b1,
            b2,
            a1,
            a2,
            s1: 0.0,
            s2: 0.0,
        }
    }

    fn process(&mut self, x: f64) -> f64 {
        let y = self.b0 * x + self.s1;
        self.s1 = self.b1 * x - self.a1 * y + self.s2;
        self.s2 = self.b2 * x - self.a2 * y;
        y
    }
}

/// Opens when a window is loud enough in absolute terms and relative to
/// the smoothed amplitude envelope.
#[derive(Debug, Clone)]
pub struct EnergyGate {
    filter: Biquad,
    absolute_threshold: f64,
    relative_threshold: f64,
}

impl EnergyGate {
    /// Thresholds are given in decibels of energy (10 dB per decade).
    pub fn new(config: &EnergyGateConfig) -> Self {
        Self {
            // butter(2, 0.015) lowpass on the amplitude envelope
            filter: Biquad::new(5.3717e-4, 1.0743e-3, 5.3717e-4, -1.93338, 0.93553),
            absolute_threshold: 10f64.powf(config.absolute_db / 10.0),
            relative_threshold: 10f64.powf(config.relative_db / 10.0),
        }
    }

    /// Gate value for the next window's energy: 1.0 open, 0.0 closed.
    ///
    /// The smoothing filter runs on the amplitude (square root of energy)
    /// and its output is squared back, so the floor tracks loudness rather
    /// than power spikes.
    pub fn process(&mut self, energy: f32) -> f32 {
        let filtered = self.filter.process((energy as f64).sqrt());
        let floor = filtered * filtered;

        let pass = energy as f64 >= self.absolute_threshold
            && energy as f64 >= floor * self.relative_threshold;
        if pass {
            1.0
        } else {
            0.0
        }
    }
}
