// Feature extraction - acoustic descriptors per analysis window
//
// One FeatureExtractor turns each hop of time-domain samples into a
// FeatureFrame of ten scalars. Spectral processing is shared: the power
// spectrum is computed once per window and its derivatives (magnitude,
// mel bands, cepstrum) feed the individual extractors.
//
// Module organization:
// - types: FeatureFrame, DeltaFrame, StatisticsFrame
// - energy: window energy and the smoothed activity gate
// - entropy: semitone-filterbank entropy
// - mfcc: mel-frequency cepstral coefficients
// - cepstrum: real cepstrum and pitch features
// - modulation: 4 Hz envelope modulation
// - mod.rs: coordinator (FeatureExtractor)

mod cepstrum;
mod energy;
mod entropy;
mod mfcc;
mod modulation;
mod types;

pub use types::{DeltaFrame, FeatureFrame, StatisticsFrame};

use crate::config::{FeatureSet, PipelineConfig};
use crate::dsp::{magnitude_spectrum, Filterbank, PowerSpectrum};
use cepstrum::{CepstralFeatures, RealCepstrum};
use energy::EnergyGate;
use entropy::ChromaticEntropy;
use mfcc::Mfcc;
use modulation::FourHzModulation;

pub use energy::energy;

/// Smallest magnitude fed to log or division; -96 dB full scale.
pub(crate) const AMPLITUDE_FLOOR: f32 = 1.0 / 65536.0;

/// Coordinates all per-window extractors.
///
/// Stateless extractors are shared per window; the gate and the 4 Hz
/// history carry state across windows, so frames must be fed in stream
/// order.
pub struct FeatureExtractor {
    feature_set: FeatureSet,
    power_spectrum: PowerSpectrum,
    mel_bank: Filterbank,
    mfcc: Mfcc,
    chromatic_entropy: ChromaticEntropy,
    real_cepstrum: RealCepstrum,
    cepstral: CepstralFeatures,
    energy_gate: EnergyGate,
    modulation: FourHzModulation,
}

impl FeatureExtractor {
    pub fn new(config: &PipelineConfig) -> Self {
        let analysis = &config.analysis;
        Self {
            feature_set: config.feature_set,
            power_spectrum: PowerSpectrum::new(analysis.window_size, analysis.scaled_spectrum),
            mel_bank: Filterbank::mel(
                analysis.window_size,
                analysis.mel_filter_count,
                analysis.sample_rate,
            ),
            mfcc: Mfcc::new(analysis.mel_filter_count),
            chromatic_entropy: ChromaticEntropy::new(
                analysis.sample_rate,
                analysis.window_size,
                analysis.chromatic_lo_freq,
                analysis.chromatic_hi_freq,
            ),
            real_cepstrum: RealCepstrum::new(analysis.window_size, analysis.cepstrum_transform),
            cepstral: CepstralFeatures::new(analysis.sample_rate, analysis.window_size),
            energy_gate: EnergyGate::new(&config.energy_gate),
            modulation: FourHzModulation::new(
                analysis.sample_rate,
                analysis.step_size,
                analysis.mel_filter_count,
            ),
        }
    }

    /// Extract one FeatureFrame from `window_size` samples.
    pub fn process_window(&mut self, window: &[f32]) -> FeatureFrame {
        let energy = energy(window);
        let energy_gate = self.energy_gate.process(energy);

        let power = self.power_spectrum.process(window);
        let magnitude = magnitude_spectrum(&power);

        // The legacy coefficient tables were trained on power-domain mel
        // bands; the extended ones on magnitude-domain bands
        let mel = match self.feature_set {
            FeatureSet::Legacy => self.mel_bank.apply(&power),
            FeatureSet::Extended => self.mel_bank.apply(&magnitude),
        };
        let mfcc = self.mfcc.process(&mel);

        let entropy = self.chromatic_entropy.process(&power);

        let cepstrum = self.real_cepstrum.process(&magnitude);
        self.cepstral.process(&magnitude, &cepstrum);

        let four_hz_mod = self.modulation.process(&mel);

        FeatureFrame {
            energy,
            energy_gate,
            entropy,
            mfcc2: mfcc[2],
            mfcc3: mfcc[3],
            mfcc4: mfcc[4],
            pitch_density: self.cepstral.pitch_density(),
            tonality: self.cepstral.tonality(),
            tonality1: self.cepstral.tonality1(),
            four_hz_mod,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_window(freq: f32, amplitude: f32, size: usize) -> Vec<f32> {
        (0..size)
            .map(|i| {
                amplitude * (2.0 * std::f32::consts::PI * freq * i as f32 / 11025.0).sin()
            })
            .collect()
    }

    #[test]
    fn test_sine_window_produces_sane_frame() {
        let mut extractor = FeatureExtractor::new(&PipelineConfig::default());
        let window = sine_window(440.0, 0.8, 512);
        let frame = extractor.process_window(&window);

        assert!((frame.energy - 0.32).abs() < 0.01, "energy of a 0.8 sine");
        assert_eq!(frame.energy_gate, 1.0, "loud sine should open the gate");
        assert!(frame.entropy >= 0.0);
        assert!(frame.tonality > 0.0, "harmonic input should be tonal");
        for value in [
            frame.mfcc2,
            frame.mfcc3,
            frame.mfcc4,
            frame.pitch_density,
            frame.tonality1,
            frame.four_hz_mod,
        ] {
            assert!(value.is_finite());
        }
    }

    #[test]
    fn test_silent_window_is_finite_and_gated_off() {
        let mut extractor = FeatureExtractor::new(&PipelineConfig::default());
        let window = vec![0.0; 512];
        let frame = extractor.process_window(&window);

        assert_eq!(frame.energy, 0.0);
        assert_eq!(frame.energy_gate, 0.0);
        assert_eq!(frame.entropy, 0.0);
        assert_eq!(frame.four_hz_mod, 0.0);
        for value in [
            frame.mfcc2,
            frame.mfcc3,
            frame.mfcc4,
            frame.pitch_density,
            frame.tonality,
            frame.tonality1,
        ] {
            assert!(value.is_finite(), "silence must not produce NaN");
        }
    }

    #[test]
    fn test_legacy_and_extended_differ_on_same_input() {
        let mut legacy = FeatureExtractor::new(&PipelineConfig::legacy());
        let mut extended = FeatureExtractor::new(&PipelineConfig::default());
        let window = sine_window(330.0, 0.5, 512);

        let a = legacy.process_window(&window);
        let b = extended.process_window(&window);
        // Different mel domains move the cepstral coefficients
        assert!(
            (a.mfcc2 - b.mfcc2).abs() > 1e-6,
            "mel domain choice should affect MFCCs"
        );
    }
}
