//! Configuration for the analysis pipeline
//!
//! All tunable parameters of the pipeline live here as plain scalars with
//! defaults matching the shipped classifier coefficients. A JSON file can
//! override them at runtime; a missing or invalid file falls back to the
//! defaults with a warning so batch jobs never die on configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Which statistics vector / coefficient table pairing the pipeline runs.
///
/// The two sets are not interchangeable: each coefficient table was trained
/// against its own statistics vector, so the selector switches both at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSet {
    /// Nine ungated statistics over entropy, MFCC 2-4 and energy.
    Legacy,
    /// Sixteen gated statistics adding cepstral and modulation features.
    Extended,
}

/// Resampling quality mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleQuality {
    /// Windowed-sinc interpolation, the accurate default.
    Sinc,
    /// Polynomial interpolation, cheaper and audibly fine for analysis.
    Fast,
}

/// Pre-transform applied to the magnitude spectrum before the cepstral DCT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CepstrumTransform {
    /// Natural log of the floored magnitude (classic real cepstrum).
    Log,
    /// Square root of the floored magnitude (harmonicity-tuned variant).
    Sqrt,
}

/// Spectral analysis parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Sample rate the windows are analyzed at; input is resampled to this.
    pub sample_rate: u32,
    /// Analysis window length in samples.
    pub window_size: usize,
    /// Advance between consecutive windows in samples.
    pub step_size: usize,
    /// Normalize power bins by the squared window gain `(2/sum(w))^2`.
    pub scaled_spectrum: bool,
    /// Number of triangular mel filters feeding the MFCC.
    pub mel_filter_count: usize,
    /// Low bound of the semitone filterbank in Hz.
    pub chromatic_lo_freq: f32,
    /// High bound of the semitone filterbank in Hz.
    pub chromatic_hi_freq: f32,
    /// Magnitude pre-transform for the real cepstrum.
    pub cepstrum_transform: CepstrumTransform,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 11025,
            window_size: 512,
            step_size: 256,
            scaled_spectrum: true,
            mel_filter_count: 27,
            chromatic_lo_freq: 55.0,
            chromatic_hi_freq: 2000.0,
            cepstrum_transform: CepstrumTransform::Log,
        }
    }
}

/// Sliding-window statistics parameters, counted in feature frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsConfig {
    /// Frames per statistics window.
    pub window_size: usize,
    /// Frames between consecutive statistics windows.
    pub step_size: usize,
    /// Length of the centered derivative filter; even values round down.
    pub delta_filter_size: usize,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            window_size: 132,
            step_size: 22,
            delta_filter_size: 5,
        }
    }
}

/// Activity gate thresholds in decibels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyGateConfig {
    /// Energy below this absolute level never passes the gate.
    pub absolute_db: f64,
    /// Energy must exceed the smoothed floor by this margin to pass.
    pub relative_db: f64,
}

impl Default for EnergyGateConfig {
    fn default() -> Self {
        Self {
            absolute_db: -40.0,
            relative_db: -20.0,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub analysis: AnalysisConfig,
    pub statistics: StatisticsConfig,
    pub energy_gate: EnergyGateConfig,
    pub feature_set: FeatureSet,
    pub resample_quality: ResampleQuality,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            statistics: StatisticsConfig::default(),
            energy_gate: EnergyGateConfig::default(),
            feature_set: FeatureSet::Extended,
            resample_quality: ResampleQuality::Sinc,
        }
    }
}

impl PipelineConfig {
    /// Standard configuration: resample to 11025 Hz, 512/256 windows.
    pub fn resampled() -> Self {
        Self::default()
    }

    /// Analyze at the input's native rate with longer windows and no
    /// resampling. Used when the recording is already at a low rate or
    /// when resampling artifacts must be ruled out.
    pub fn native_rate(sample_rate: u32) -> Self {
        let mut config = Self::default();
        config.analysis.sample_rate = sample_rate;
        config.analysis.window_size = 2048;
        config.analysis.step_size = 1024;
        config
    }

    /// The legacy pairing: nine ungated statistics, unscaled spectrum.
    pub fn legacy() -> Self {
        let mut config = Self::default();
        config.feature_set = FeatureSet::Legacy;
        config.analysis.scaled_spectrum = false;
        config
    }

    /// Load configuration from a JSON file.
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or the defaults if the file is missing or
    /// malformed (logged as a warning, never an error).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Duration of one analysis step in seconds.
    pub fn step_duration(&self) -> f64 {
        self.analysis.step_size as f64 / self.analysis.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.analysis.sample_rate, 11025);
        assert_eq!(config.analysis.window_size, 512);
        assert_eq!(config.analysis.step_size, 256);
        assert_eq!(config.analysis.mel_filter_count, 27);
        assert_eq!(config.statistics.window_size, 132);
        assert_eq!(config.statistics.step_size, 22);
        assert_eq!(config.statistics.delta_filter_size, 5);
        assert_eq!(config.feature_set, FeatureSet::Extended);
    }

    #[test]
    fn test_native_rate_config() {
        let config = PipelineConfig::native_rate(44100);
        assert_eq!(config.analysis.sample_rate, 44100);
        assert_eq!(config.analysis.window_size, 2048);
        assert_eq!(config.analysis.step_size, 1024);
    }

    #[test]
    fn test_legacy_config_disables_spectrum_scaling() {
        let config = PipelineConfig::legacy();
        assert_eq!(config.feature_set, FeatureSet::Legacy);
        assert!(!config.analysis.scaled_spectrum);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: PipelineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.analysis.sample_rate, config.analysis.sample_rate);
        assert_eq!(parsed.feature_set, config.feature_set);
        assert_eq!(
            parsed.energy_gate.absolute_db,
            config.energy_gate.absolute_db
        );
    }

    #[test]
    fn test_step_duration() {
        let config = PipelineConfig::default();
        let expected = 256.0 / 11025.0;
        assert!((config.step_duration() - expected).abs() < 1e-12);
    }
}
