//! Output sinks for feature and statistics records
//!
//! Two encodings of the same records: tab-separated text with fixed
//! six-decimal columns, or a float WAV whose channel count equals the
//! record width (one WAV frame per record). Every row leads with the
//! record timestamp; statistics rows append the class probabilities and
//! the weighted class scalar.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::FeatureSet;
use crate::error::AudioFileError;
use crate::features::{FeatureFrame, StatisticsFrame};
use crate::pipeline::{Classification, TimedFrame};
use crate::stats::{EXTENDED_STAT_COUNT, LEGACY_STAT_COUNT};

/// Columns per feature row: timestamp plus the ten frame fields.
pub const FEATURE_RECORD_COLUMNS: u16 = 11;

/// Columns per statistics row: timestamp, the classifier inputs, the
/// energy-gate mean, five class probabilities and the class scalar.
pub fn statistics_record_columns(feature_set: FeatureSet) -> u16 {
    let stats = match feature_set {
        FeatureSet::Legacy => LEGACY_STAT_COUNT,
        FeatureSet::Extended => EXTENDED_STAT_COUNT,
    };
    1 + stats as u16 + 1 + 5 + 1
}

enum Sink {
    Text(BufWriter<File>),
    Binary(hound::WavWriter<BufWriter<File>>),
}

/// Writes analysis records to a text or binary file.
pub struct RecordWriter {
    path: String,
    sink: Sink,
}

impl RecordWriter {
    /// Open a tab-separated text sink.
    pub fn create_text(path: &Path) -> Result<Self, AudioFileError> {
        let display = path.display().to_string();
        let file = File::create(path).map_err(|err| write_error(&display, err))?;
        Ok(Self {
            path: display,
            sink: Sink::Text(BufWriter::new(file)),
        })
    }

    /// Open a float WAV sink with `channels` values per record.
    ///
    /// The WAV header's sample rate field carries the input file's rate,
    /// which downstream tooling uses to relate records back to the source
    /// recording.
    pub fn create_binary(
        path: &Path,
        sample_rate: u32,
        channels: u16,
    ) -> Result<Self, AudioFileError> {
        let display = path.display().to_string();
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let writer =
            hound::WavWriter::create(path, spec).map_err(|err| write_error(&display, err))?;
        Ok(Self {
            path: display,
            sink: Sink::Binary(writer),
        })
    }

    pub fn write_features(&mut self, frame: &TimedFrame) -> Result<(), AudioFileError> {
        let values = feature_values(&frame.features);
        self.write_record(frame.time, &values)
    }

    pub fn write_classified(
        &mut self,
        statistics: &StatisticsFrame,
        classification: &Classification,
    ) -> Result<(), AudioFileError> {
        let mut values = Vec::with_capacity(statistics.values.len() + 7);
        values.extend_from_slice(&statistics.values);
        values.push(statistics.gate_mean);
        values.extend_from_slice(&classification.distribution);
        values.push(classification.average_class);
        self.write_record(statistics.time, &values)
    }

    fn write_record(&mut self, time: f64, values: &[f32]) -> Result<(), AudioFileError> {
        match &mut self.sink {
            Sink::Text(out) => {
                write!(out, "{:.6}", time).map_err(|err| write_error(&self.path, err))?;
                for value in values {
                    write!(out, "\t{:.6}", value).map_err(|err| write_error(&self.path, err))?;
                }
                writeln!(out).map_err(|err| write_error(&self.path, err))?;
            }
            Sink::Binary(writer) => {
                writer
                    .write_sample(time as f32)
                    .map_err(|err| write_error(&self.path, err))?;
                for &value in values {
                    writer
                        .write_sample(value)
                        .map_err(|err| write_error(&self.path, err))?;
                }
            }
        }
        Ok(())
    }

    /// Flush buffered records and, for binary sinks, patch the WAV header.
    pub fn finalize(self) -> Result<(), AudioFileError> {
        match self.sink {
            Sink::Text(mut out) => out.flush().map_err(|err| write_error(&self.path, err)),
            Sink::Binary(writer) => writer
                .finalize()
                .map_err(|err| write_error(&self.path, err)),
        }
    }
}

fn feature_values(frame: &FeatureFrame) -> [f32; 10] {
    [
        frame.energy,
        frame.energy_gate,
        frame.entropy,
        frame.mfcc2,
        frame.mfcc3,
        frame.mfcc4,
        frame.pitch_density,
        frame.tonality,
        frame.tonality1,
        frame.four_hz_mod,
    ]
}

fn write_error(path: &str, err: impl std::fmt::Display) -> AudioFileError {
    AudioFileError::Write {
        path: path.to_string(),
        reason: err.to_string(),
    }
}
