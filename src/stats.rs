//! Windowed statistics over the feature stream
//!
//! Collects FeatureFrames into overlapping windows (132 frames advancing
//! by 22 at the default rates, roughly 3 s every 0.5 s) and summarizes
//! each window into the vector the classifier consumes. Derivative
//! features are computed first with a centered FIR filter, which needs
//! future context; the buffers therefore run behind the input and the
//! stream must be finished to flush the trailing windows.
//!
//! The input buffer is padded with repeats of the first frame when the
//! stream starts and of the last frame when it ends, so every input frame
//! has a full derivative neighborhood. Processed frames are dropped from
//! the front of both buffers in lockstep, keeping window placement
//! independent of how the stream was chunked.

use crate::config::{FeatureSet, PipelineConfig};
use crate::features::{DeltaFrame, FeatureFrame, StatisticsFrame};

/// Number of classifier inputs produced per window for each feature set.
pub const LEGACY_STAT_COUNT: usize = 9;
pub const EXTENDED_STAT_COUNT: usize = 16;

pub struct StatisticsAggregator {
    window_size: usize,
    step_size: usize,
    feature_set: FeatureSet,

    delta_filter: Vec<f32>,
    half_filter_len: usize,

    input_buffer: Vec<FeatureFrame>,
    delta_buffer: Vec<DeltaFrame>,

    step_duration: f64,
    emitted: usize,
    first: bool,
    drained: bool,
}

impl StatisticsAggregator {
    pub fn new(config: &PipelineConfig) -> Self {
        let stats = &config.statistics;
        let half_filter_len = (stats.delta_filter_size - 1) / 2;
        debug_assert!(half_filter_len >= 1, "delta filter needs neighbors");

        // Slope filter: coefficients i / sum(i^2) for i in [-h, h]
        let norm: f32 = (1..=half_filter_len as i32).map(|i| 2 * i * i).sum::<i32>() as f32;
        let delta_filter = (-(half_filter_len as i32)..=half_filter_len as i32)
            .map(|i| i as f32 / norm)
            .collect();

        Self {
            window_size: stats.window_size,
            step_size: stats.step_size,
            feature_set: config.feature_set,
            delta_filter,
            half_filter_len,
            input_buffer: Vec::new(),
            delta_buffer: Vec::new(),
            step_duration: config.step_duration(),
            emitted: 0,
            first: true,
            drained: false,
        }
    }

    /// Number of values in each emitted `StatisticsFrame`.
    pub fn output_size(&self) -> usize {
        match self.feature_set {
            FeatureSet::Legacy => LEGACY_STAT_COUNT,
            FeatureSet::Extended => EXTENDED_STAT_COUNT,
        }
    }

    /// Feed one frame; completed windows append to `output`.
    pub fn process(&mut self, frame: FeatureFrame, output: &mut Vec<StatisticsFrame>) {
        if self.first {
            self.first = false;
            let pad = vec![frame; self.half_filter_len];
            self.input_buffer.splice(0..0, pad);
        }
        self.input_buffer.push(frame);
        self.run(output);
    }

    /// Pad out the derivative context of the final frames and emit what
    /// remains. Further calls do nothing.
    pub fn finish(&mut self, output: &mut Vec<StatisticsFrame>) {
        if self.drained || self.input_buffer.is_empty() {
            self.drained = true;
            return;
        }

        let last = *self.input_buffer.last().unwrap();
        self.input_buffer
            .extend(std::iter::repeat(last).take(2 * self.half_filter_len));
        self.run(output);

        self.input_buffer.clear();
        self.delta_buffer.clear();
        self.drained = true;
    }

    fn run(&mut self, output: &mut Vec<StatisticsFrame>) {
        let filter_len = self.delta_filter.len();
        if self.input_buffer.len() < filter_len {
            return;
        }

        // Extend the delta buffer over every frame with full context
        for idx in self.delta_buffer.len()..=self.input_buffer.len() - filter_len {
            let neighborhood = &self.input_buffer[idx..idx + filter_len];
            self.delta_buffer.push(DeltaFrame {
                entropy: Self::slope(&self.delta_filter, neighborhood, |f| f.entropy),
                mfcc2: Self::slope(&self.delta_filter, neighborhood, |f| f.mfcc2),
                mfcc3: Self::slope(&self.delta_filter, neighborhood, |f| f.mfcc3),
                mfcc4: Self::slope(&self.delta_filter, neighborhood, |f| f.mfcc4),
            });
        }

        // Summarize every complete window, then drop what was consumed
        let mut idx = 0;
        while idx + self.window_size <= self.delta_buffer.len() {
            let deltas = &self.delta_buffer[idx..idx + self.window_size];
            let start = idx + self.half_filter_len;
            let inputs = &self.input_buffer[start..start + self.window_size];

            let time = (self.window_size as f64 / 2.0
                + (self.emitted * self.step_size) as f64)
                * self.step_duration;
            output.push(self.summarize(inputs, deltas, time));
            self.emitted += 1;

            idx += self.step_size;
        }
        self.input_buffer.drain(..idx);
        self.delta_buffer.drain(..idx);
    }

    fn slope(filter: &[f32], frames: &[FeatureFrame], get: impl Fn(&FeatureFrame) -> f32) -> f32 {
        filter
            .iter()
            .zip(frames.iter())
            .map(|(c, f)| c * get(f))
            .sum()
    }

    fn summarize(
        &self,
        inputs: &[FeatureFrame],
        deltas: &[DeltaFrame],
        time: f64,
    ) -> StatisticsFrame {
        let gate_mean = mean(&collect(inputs, |f| f.energy_gate));

        let values = match self.feature_set {
            FeatureSet::Legacy => self.summarize_legacy(inputs, deltas),
            FeatureSet::Extended => self.summarize_extended(inputs, deltas),
        };

        StatisticsFrame {
            time,
            values,
            gate_mean,
        }
    }

    /// Ungated statistics paired with the legacy coefficient table.
    fn summarize_legacy(&self, inputs: &[FeatureFrame], deltas: &[DeltaFrame]) -> Vec<f32> {
        let energy = collect(inputs, |f| f.energy);
        let energy_mean = mean(&energy);

        vec![
            mean(&collect(inputs, |f| f.entropy)),
            variance_of(&collect(inputs, |f| f.mfcc2)),
            variance_of(&collect(inputs, |f| f.mfcc3)),
            variance_of(&collect(inputs, |f| f.mfcc4)),
            variance_of(&collect_deltas(deltas, |d| d.entropy)),
            variance_of(&collect_deltas(deltas, |d| d.mfcc2)),
            variance_of(&collect_deltas(deltas, |d| d.mfcc3)),
            variance_of(&collect_deltas(deltas, |d| d.mfcc4)),
            flux(&energy, energy_mean),
        ]
    }

    /// Gated statistics paired with the extended coefficient table.
    ///
    /// Frame statistics run only over frames that passed the energy gate;
    /// derivative variances keep the full window since the slope filter
    /// already spans gated and ungated frames alike.
    fn summarize_extended(&self, inputs: &[FeatureFrame], deltas: &[DeltaFrame]) -> Vec<f32> {
        let gated: Vec<&FeatureFrame> =
            inputs.iter().filter(|f| f.energy_gate != 0.0).collect();

        let gated_vals = |get: fn(&FeatureFrame) -> f32| -> Vec<f32> {
            gated.iter().map(|&f| get(f)).collect()
        };

        let energy = gated_vals(|f| f.energy);
        let energy_mean = mean(&energy);

        vec![
            mean(&gated_vals(|f| f.entropy)),
            mean(&gated_vals(|f| f.tonality)),
            mean(&gated_vals(|f| f.tonality1)),
            mean(&gated_vals(|f| f.pitch_density)),
            mean(&gated_vals(|f| f.four_hz_mod)),
            std_dev(&gated_vals(|f| f.entropy)),
            std_dev(&gated_vals(|f| f.mfcc2)),
            std_dev(&gated_vals(|f| f.mfcc3)),
            std_dev(&gated_vals(|f| f.mfcc4)),
            variance_of(&collect_deltas(deltas, |d| d.entropy)),
            std_dev(&gated_vals(|f| f.pitch_density)),
            std_dev(&gated_vals(|f| f.tonality)),
            variance_of(&collect_deltas(deltas, |d| d.mfcc2)),
            variance_of(&collect_deltas(deltas, |d| d.mfcc3)),
            variance_of(&collect_deltas(deltas, |d| d.mfcc4)),
            flux(&energy, energy_mean),
        ]
    }
}

fn collect(frames: &[FeatureFrame], get: impl Fn(&FeatureFrame) -> f32) -> Vec<f32> {
    frames.iter().map(get).collect()
}

fn collect_deltas(deltas: &[DeltaFrame], get: impl Fn(&DeltaFrame) -> f32) -> Vec<f32> {
    deltas.iter().map(get).collect()
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

fn variance(values: &[f32], mean: f32) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum: f32 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    sum / (values.len() - 1) as f32
}

fn variance_of(values: &[f32]) -> f32 {
    variance(values, mean(values))
}

fn std_dev(values: &[f32]) -> f32 {
    variance_of(values).sqrt()
}

/// Normalized variance of the energy contour.
fn flux(energy: &[f32], energy_mean: f32) -> f32 {
    if energy_mean == 0.0 {
        return 0.0;
    }
    variance(energy, energy_mean) / (energy_mean * energy_mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(entropy: f32, gate: f32) -> FeatureFrame {
        FeatureFrame {
            energy: 1.0,
            energy_gate: gate,
            entropy,
            ..Default::default()
        }
    }

    fn default_aggregator(feature_set: FeatureSet) -> StatisticsAggregator {
        let mut config = PipelineConfig::default();
        config.feature_set = feature_set;
        StatisticsAggregator::new(&config)
    }

    #[test]
    fn test_delta_filter_coefficients() {
        let agg = default_aggregator(FeatureSet::Extended);
        let expected = [-0.2, -0.1, 0.0, 0.1, 0.2];
        assert_eq!(agg.delta_filter.len(), 5);
        for (c, e) in agg.delta_filter.iter().zip(expected.iter()) {
            assert!((c - e).abs() < 1e-7, "filter {:?}", agg.delta_filter);
        }
    }

    #[test]
    fn test_first_window_needs_full_derivative_context() {
        // With window 132 and filter half-length 2, the first window
        // completes at frame 134 while streaming
        let mut agg = default_aggregator(FeatureSet::Legacy);
        let mut output = Vec::new();
        for i in 0..133 {
            agg.process(frame(i as f32, 1.0), &mut output);
        }
        assert!(output.is_empty(), "no window before enough context");

        agg.process(frame(133.0, 1.0), &mut output);
        assert_eq!(output.len(), 1, "window emits exactly at frame 134");
    }

    #[test]
    fn test_flush_window_count() {
        // After finishing, F frames yield floor((F + 2 - 132) / 22) + 1
        // windows for F >= 130
        for (frames, expected) in [(129, 0), (130, 1), (131, 1), (132, 1), (151, 1), (152, 2), (200, 4)] {
            let mut agg = default_aggregator(FeatureSet::Legacy);
            let mut output = Vec::new();
            for i in 0..frames {
                agg.process(frame(i as f32, 1.0), &mut output);
            }
            agg.finish(&mut output);
            assert_eq!(
                output.len(),
                expected,
                "{} frames should flush to {} windows",
                frames,
                expected
            );
        }
    }

    #[test]
    fn test_finish_twice_adds_nothing() {
        let mut agg = default_aggregator(FeatureSet::Legacy);
        let mut output = Vec::new();
        for i in 0..150 {
            agg.process(frame(i as f32, 1.0), &mut output);
        }
        agg.finish(&mut output);
        let after_first = output.len();
        agg.finish(&mut output);
        assert_eq!(output.len(), after_first);
    }

    #[test]
    fn test_window_timing() {
        let mut agg = default_aggregator(FeatureSet::Legacy);
        let mut output = Vec::new();
        for i in 0..300 {
            agg.process(frame(i as f32, 1.0), &mut output);
        }

        let step = 256.0 / 11025.0;
        assert!(output.len() >= 2);
        assert!((output[0].time - 66.0 * step).abs() < 1e-9);
        assert!((output[1].time - 88.0 * step).abs() < 1e-9);
    }

    #[test]
    fn test_ramp_has_constant_slope_and_matching_mean() {
        // entropy = 0.01 * i; interior deltas are exactly the slope, so
        // their variance vanishes once the start padding leaves the window
        let mut agg = default_aggregator(FeatureSet::Legacy);
        let mut output = Vec::new();
        for i in 0..300 {
            agg.process(frame(0.01 * i as f32, 1.0), &mut output);
        }

        assert!(output.len() >= 2);
        let second = &output[1];
        // The second window summarizes frames 22..=153 after start padding
        let expected_mean = 0.01 * (22.0 + 153.0) / 2.0;
        assert!(
            (second.values[0] - expected_mean).abs() < 1e-3,
            "entropy mean {} vs expected {}",
            second.values[0],
            expected_mean
        );
        assert!(
            second.values[4] < 1e-8,
            "delta variance of a pure ramp should vanish, got {}",
            second.values[4]
        );
    }

    #[test]
    fn test_gated_statistics_ignore_closed_frames() {
        let mut agg = default_aggregator(FeatureSet::Extended);
        let mut output = Vec::new();
        // Gated frames carry entropy 2.0; closed frames a wild 99.0
        for i in 0..200 {
            let f = if i % 2 == 0 {
                frame(2.0, 1.0)
            } else {
                frame(99.0, 0.0)
            };
            agg.process(f, &mut output);
        }
        agg.finish(&mut output);

        assert!(!output.is_empty());
        for window in &output {
            assert!(
                (window.values[0] - 2.0).abs() < 1e-5,
                "gated entropy mean should ignore closed frames, got {}",
                window.values[0]
            );
            assert!((window.gate_mean - 0.5).abs() < 0.01);
        }
    }

    #[test]
    fn test_fully_closed_window_zeroes_gated_statistics() {
        let mut agg = default_aggregator(FeatureSet::Extended);
        let mut output = Vec::new();
        for i in 0..200 {
            agg.process(frame(3.0 + i as f32, 0.0), &mut output);
        }
        agg.finish(&mut output);

        assert!(!output.is_empty());
        for window in &output {
            assert_eq!(window.gate_mean, 0.0);
            // Gated means and deviations collapse to zero
            for idx in [0, 1, 2, 3, 4, 5, 6, 7, 8, 10, 11, 15] {
                assert_eq!(
                    window.values[idx], 0.0,
                    "gated statistic {} should be zero in a closed window",
                    idx
                );
            }
        }
    }

    #[test]
    fn test_output_sizes_per_feature_set() {
        let mut legacy = default_aggregator(FeatureSet::Legacy);
        let mut extended = default_aggregator(FeatureSet::Extended);
        assert_eq!(legacy.output_size(), LEGACY_STAT_COUNT);
        assert_eq!(extended.output_size(), EXTENDED_STAT_COUNT);

        let mut out_legacy = Vec::new();
        let mut out_extended = Vec::new();
        for i in 0..150 {
            legacy.process(frame(i as f32, 1.0), &mut out_legacy);
            extended.process(frame(i as f32, 1.0), &mut out_extended);
        }
        legacy.finish(&mut out_legacy);
        extended.finish(&mut out_extended);
        assert_eq!(out_legacy[0].values.len(), LEGACY_STAT_COUNT);
        assert_eq!(out_extended[0].values.len(), EXTENDED_STAT_COUNT);
    }
}
