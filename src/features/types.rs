// Types module - Data structures flowing through the feature pipeline
//
// One FeatureFrame is produced per analysis step, then windowed into
// StatisticsFrame records that feed the classifier.

/// Acoustic features extracted from one analysis window
///
/// All fields describe a single step of the hop grid. The MFCC fields are
/// named by their 0-based index in the cepstral vector: `mfcc2` is the
/// third coefficient.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeatureFrame {
    /// Mean squared amplitude of the window
    pub energy: f32,

    /// Activity gate: 1.0 when the window passes both energy thresholds,
    /// 0.0 otherwise
    pub energy_gate: f32,

    /// Entropy of the semitone-filterbank distribution in bits
    ///
    /// Low for a single sustained pitch, higher for dense or noisy spectra.
    pub entropy: f32,

    /// Mel-frequency cepstral coefficient 2
    pub mfcc2: f32,
    /// Mel-frequency cepstral coefficient 3
    pub mfcc3: f32,
    /// Mel-frequency cepstral coefficient 4
    pub mfcc4: f32,

    /// Mean cepstral amplitude over the pitch lag range (90-1000 Hz)
    pub pitch_density: f32,

    /// Height of the strongest cepstral pitch peak
    pub tonality: f32,

    /// Energy of the harmonic partials at the detected pitch relative to
    /// the five strongest spectral peaks
    pub tonality1: f32,

    /// 4 Hz amplitude-modulation energy summed over the mel bands
    ///
    /// Syllabic rhythm indicator; speech modulates near 4 Hz.
    pub four_hz_mod: f32,
}

/// Centered first derivatives of the contour features
///
/// Computed by FIR filtering each feature sequence across neighboring
/// frames; one DeltaFrame aligns with one FeatureFrame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeltaFrame {
    pub entropy: f32,
    pub mfcc2: f32,
    pub mfcc3: f32,
    pub mfcc4: f32,
}

/// Windowed statistics over a span of feature frames
///
/// `values` is ordered to match the classifier coefficient table of the
/// active feature set. `gate_mean` is the fraction of frames inside the
/// window that passed the energy gate; it is not a classifier input but
/// drives the decision whether to classify the window at all.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsFrame {
    /// Center time of the statistics window in seconds
    pub time: f64,
    /// Classifier inputs in table order
    pub values: Vec<f32>,
    /// Mean of the energy gate over the window, in [0, 1]
    pub gate_mean: f32,
}
