//! Pitch-distribution entropy
//!
//! Projects the power spectrum onto a semitone filterbank and measures the
//! Shannon entropy of the resulting distribution. A solo singer sustains
//! one strong semitone (low entropy); a choir or instrumental ensemble
//! spreads energy across many (high entropy).

use crate::dsp::Filterbank;

pub struct ChromaticEntropy {
    filterbank: Filterbank,
}

impl ChromaticEntropy {
    pub fn new(sample_rate: u32, window_size: usize, lo_freq: f32, hi_freq: f32) -> Self {
        Self {
            filterbank: Filterbank::chromatic(window_size, sample_rate, lo_freq, hi_freq),
        }
    }

    /// Number of semitone filters in the bank.
    pub fn filter_count(&self) -> usize {
        self.filterbank.len()
    }

    /// Entropy in bits of the semitone distribution of one power spectrum.
    ///
    /// Zero-energy filters are skipped; an all-zero projection (silence)
    /// yields zero entropy.
    pub fn process(&self, power_spectrum: &[f32]) -> f32 {
        let bands = self.filterbank.apply(power_spectrum);
        let sum: f32 = bands.iter().sum();
        if sum == 0.0 {
            return 0.0;
        }

        let mut entropy = 0.0_f32;
        for band in bands {
            let p = band / sum;
            if p != 0.0 {
                entropy += p * p.log2();
            }
        }
        -entropy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_has_zero_entropy() {
        let entropy = ChromaticEntropy::new(11025, 512, 55.0, 2000.0);
        let silence = vec![0.0; 257];
        assert_eq!(entropy.process(&silence), 0.0);
    }

    #[test]
    fn test_single_tone_has_low_entropy() {
        let entropy = ChromaticEntropy::new(11025, 512, 55.0, 2000.0);

        let mut tone = vec![0.0_f32; 257];
        tone[21] = 1.0; // ~452 Hz, a single semitone region

        let mut spread = vec![0.0_f32; 257];
        for bin in 5..90 {
            spread[bin] = 1.0;
        }

        let tone_bits = entropy.process(&tone);
        let spread_bits = entropy.process(&spread);
        assert!(
            tone_bits < spread_bits,
            "tone entropy {} should be below broadband entropy {}",
            tone_bits,
            spread_bits
        );
    }

    #[test]
    fn test_uniform_distribution_approaches_log2_n() {
        let entropy = ChromaticEntropy::new(11025, 512, 55.0, 2000.0);
        let flat = vec![1.0; 257];
        let bits = entropy.process(&flat);

        // Upper bound is log2 of the number of non-empty filters
        let max_bits = (entropy.filter_count() as f32).log2();
        assert!(bits > 0.0);
        assert!(
            bits <= max_bits,
            "entropy {} cannot exceed log2(filters) = {}",
            bits,
            max_bits
        );
    }
}
