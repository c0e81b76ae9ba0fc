//! Mel-frequency cepstral coefficients
//!
//! Log of the floored mel-filterbank outputs followed by a DCT-II. The
//! first coefficient is divided by sqrt(2) so the basis is orthogonal in
//! the leading term; no overall scaling is applied.

use crate::dsp::DctII;
use crate::features::AMPLITUDE_FLOOR;

pub struct Mfcc {
    dct: DctII,
}

impl Mfcc {
    /// One output coefficient per mel filter.
    pub fn new(coefficient_count: usize) -> Self {
        Self {
            dct: DctII::new(coefficient_count),
        }
    }

    pub fn process(&self, mel_spectrum: &[f32]) -> Vec<f32> {
        debug_assert_eq!(mel_spectrum.len(), self.dct.size());

        let log_mel: Vec<f32> = mel_spectrum
            .iter()
            .map(|m| m.max(AMPLITUDE_FLOOR).ln())
            .collect();

        let mut output = self.dct.process(&log_mel);
        output[0] /= std::f32::consts::SQRT_2;
        output
    }
}
