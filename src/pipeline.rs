//! End-to-end analysis pipeline
//!
//! Accepts raw mono samples in chunks of any size and drives them through
//! resampling, windowed feature extraction, windowed statistics and
//! classification. All stages buffer internally, so the emitted frames,
//! statistics and classifications depend only on the sample stream, never
//! on how it was chunked. `finish` flushes the resampler tail and the
//! statistics padding; a stream that was fed and finished yields exactly
//! the same output as the same samples pushed in one call.

use crate::classify::{average_class, Classifier};
use crate::config::{FeatureSet, PipelineConfig};
use crate::error::PipelineError;
use crate::features::{FeatureExtractor, FeatureFrame, StatisticsFrame};
use crate::resample::StreamResampler;
use crate::stats::StatisticsAggregator;

/// A window's classification noise floor: below this fraction of gated
/// frames the previous distribution is held instead of reclassifying.
const CLASSIFY_GATE_THRESHOLD: f32 = 0.4;

/// One feature frame with its position on the analysis hop grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedFrame {
    /// Start time of the analysis window in seconds of the input stream.
    pub time: f64,
    pub features: FeatureFrame,
}

/// Classification of one statistics window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// Center time of the statistics window in seconds.
    pub time: f64,
    /// Probability per class, all zero until the first window passes the
    /// classification gate.
    pub distribution: [f32; 5],
    /// Center of mass of `distribution` on the class axis.
    pub average_class: f32,
}

/// Everything one `process` or `finish` call produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    pub frames: Vec<TimedFrame>,
    pub statistics: Vec<StatisticsFrame>,
    pub classifications: Vec<Classification>,
}

pub struct Pipeline {
    config: PipelineConfig,
    resampler: StreamResampler,
    extractor: FeatureExtractor,
    aggregator: StatisticsAggregator,
    classifier: Classifier,

    /// Resampled samples not yet consumed by a full analysis window.
    carry: Vec<f32>,
    frame_index: u64,
    /// Last classified distribution, held across gated-out windows.
    held_distribution: [f32; 5],
    finished: bool,
}

impl Pipeline {
    pub fn new(input_rate: u32, config: PipelineConfig) -> Result<Self, PipelineError> {
        let resampler = StreamResampler::new(
            input_rate,
            config.analysis.sample_rate,
            config.resample_quality,
        )?;

        tracing::debug!(
            "[Pipeline] Ready: {} Hz -> {} Hz, window {} step {}, {:?} feature set",
            input_rate,
            config.analysis.sample_rate,
            config.analysis.window_size,
            config.analysis.step_size,
            config.feature_set
        );

        Ok(Self {
            extractor: FeatureExtractor::new(&config),
            aggregator: StatisticsAggregator::new(&config),
            classifier: Classifier::new(config.feature_set),
            config,
            resampler,
            carry: Vec::new(),
            frame_index: 0,
            held_distribution: [0.0; 5],
            finished: false,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn input_rate(&self) -> u32 {
        self.resampler.input_rate()
    }

    /// Feed one chunk of mono samples.
    pub fn process(&mut self, chunk: &[f32]) -> Result<PipelineOutput, PipelineError> {
        if self.finished {
            tracing::warn!("[Pipeline] process called after finish; chunk ignored");
            return Ok(PipelineOutput::default());
        }

        self.resampler.push(chunk, &mut self.carry)?;

        let mut output = PipelineOutput::default();
        self.analyze_carry(&mut output);
        self.classify(&mut output);
        Ok(output)
    }

    /// Flush all buffered state and emit the trailing windows.
    ///
    /// Repeated calls return empty output.
    pub fn finish(&mut self) -> Result<PipelineOutput, PipelineError> {
        if self.finished {
            return Ok(PipelineOutput::default());
        }
        self.finished = true;

        self.resampler.finish(&mut self.carry)?;

        let mut output = PipelineOutput::default();
        self.analyze_carry(&mut output);
        self.aggregator.finish(&mut output.statistics);
        self.classify(&mut output);
        self.carry.clear();

        tracing::debug!("[Pipeline] Finished after {} frames", self.frame_index);
        Ok(output)
    }

    /// Run the window loop over the resampled carry buffer. A trailing
    /// span shorter than one window stays buffered (and is dropped at
    /// finish; only complete windows are analyzed).
    fn analyze_carry(&mut self, output: &mut PipelineOutput) {
        let window_size = self.config.analysis.window_size;
        let step_size = self.config.analysis.step_size;
        let step_duration = self.config.step_duration();

        let mut start = 0;
        while start + window_size <= self.carry.len() {
            let features = self
                .extractor
                .process_window(&self.carry[start..start + window_size]);

            output.frames.push(TimedFrame {
                time: self.frame_index as f64 * step_duration,
                features,
            });
            self.aggregator.process(features, &mut output.statistics);

            self.frame_index += 1;
            start += step_size;
        }
        self.carry.drain(..start);
    }

    /// Classify the windows gathered in `output.statistics`.
    ///
    /// With the extended feature set a window dominated by gated-out
    /// frames keeps the previous distribution; the legacy set classifies
    /// unconditionally.
    fn classify(&mut self, output: &mut PipelineOutput) {
        for stat in &output.statistics {
            let update = match self.config.feature_set {
                FeatureSet::Legacy => true,
                FeatureSet::Extended => stat.gate_mean > CLASSIFY_GATE_THRESHOLD,
            };
            if update {
                self.held_distribution = self.classifier.process(&stat.values);
            }
            output.classifications.push(Classification {
                time: stat.time,
                distribution: self.held_distribution,
                average_class: average_class(&self.held_distribution),
            });
        }
    }
}
