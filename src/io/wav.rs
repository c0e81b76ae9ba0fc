//! WAV input for the command-line driver
//!
//! Streams a mono WAV file as normalized f32 chunks. Integer formats are
//! scaled by their bit depth so every format lands in [-1, 1]; multi-channel
//! files are rejected rather than mixed down, matching the pipeline's
//! mono-only contract.

use std::fs::File;
use std::path::Path;

use crate::error::AudioFileError;

/// How the on-disk samples decode to f32.
#[derive(Debug, Clone, Copy)]
enum SampleCoding {
    Float,
    /// Integer PCM divided by `scale` (half the format's value range).
    Int { scale: f32 },
}

/// Chunked reader over a mono WAV file.
pub struct WavSource {
    reader: hound::WavReader<std::io::BufReader<File>>,
    coding: SampleCoding,
    sample_rate: u32,
    total_frames: u64,
    path: String,
}

impl WavSource {
    pub fn open(path: &Path) -> Result<Self, AudioFileError> {
        let display = path.display().to_string();
        let reader = hound::WavReader::open(path).map_err(|err| AudioFileError::Open {
            path: display.clone(),
            reason: err.to_string(),
        })?;

        let spec = reader.spec();
        if spec.channels != 1 {
            return Err(AudioFileError::NotMono {
                path: display,
                channels: spec.channels,
            });
        }

        let coding = match spec.sample_format {
            hound::SampleFormat::Float => SampleCoding::Float,
            hound::SampleFormat::Int => match spec.bits_per_sample {
                bits @ (8 | 16 | 24 | 32) => SampleCoding::Int {
                    scale: (1i64 << (bits - 1)) as f32,
                },
                bits => {
                    return Err(AudioFileError::UnsupportedFormat {
                        path: display,
                        detail: format!("{} bits per sample", bits),
                    })
                }
            },
        };

        let total_frames = reader.duration() as u64;
        Ok(Self {
            reader,
            coding,
            sample_rate: spec.sample_rate,
            total_frames,
            path: display,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total sample count of the file, for progress reporting.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Read up to `max_samples` into `buffer`, replacing its contents.
    ///
    /// Returns the number of samples read; 0 means end of file.
    pub fn read_chunk(
        &mut self,
        buffer: &mut Vec<f32>,
        max_samples: usize,
    ) -> Result<usize, AudioFileError> {
        buffer.clear();
        let path = &self.path;

        match self.coding {
            SampleCoding::Float => {
                for sample in self.reader.samples::<f32>().take(max_samples) {
                    buffer.push(sample.map_err(|err| read_error(path, err))?);
                }
            }
            SampleCoding::Int { scale } => {
                for sample in self.reader.samples::<i32>().take(max_samples) {
                    let value = sample.map_err(|err| read_error(path, err))?;
                    buffer.push(value as f32 / scale);
                }
            }
        }

        Ok(buffer.len())
    }
}

fn read_error(path: &str, err: hound::Error) -> AudioFileError {
    AudioFileError::Read {
        path: path.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_wav(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("segmenter-{}-{}.wav", name, std::process::id()))
    }

    fn write_mono_i16(path: &Path, sample_rate: u32, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).expect("create test wav");
        for &s in samples {
            writer.write_sample(s).expect("write test sample");
        }
        writer.finalize().expect("finalize test wav");
    }

    #[test]
    fn test_reads_i16_in_chunks() {
        let path = temp_wav("i16-chunks");
        let samples: Vec<i16> = (0..100).map(|i| (i * 300) as i16).collect();
        write_mono_i16(&path, 22050, &samples);

        let mut source = WavSource::open(&path).expect("open test wav");
        assert_eq!(source.sample_rate(), 22050);
        assert_eq!(source.total_frames(), 100);

        let mut decoded = Vec::new();
        let mut chunk = Vec::new();
        loop {
            let count = source.read_chunk(&mut chunk, 7).expect("read chunk");
            if count == 0 {
                break;
            }
            decoded.extend_from_slice(&chunk);
        }

        assert_eq!(decoded.len(), 100, "every sample should be delivered");
        for (i, &value) in decoded.iter().enumerate() {
            let expected = (i as i32 * 300) as f32 / 32768.0;
            assert!(
                (value - expected).abs() < 1e-6,
                "sample {} decoded as {} instead of {}",
                i,
                value,
                expected
            );
        }

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_rejects_stereo_input() {
        let path = temp_wav("stereo");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).expect("create test wav");
        for _ in 0..8 {
            writer.write_sample(0i16).expect("write left");
            writer.write_sample(0i16).expect("write right");
        }
        writer.finalize().expect("finalize test wav");

        match WavSource::open(&path) {
            Err(AudioFileError::NotMono { channels, .. }) => assert_eq!(channels, 2),
            other => panic!("expected NotMono error, got {:?}", other.map(|_| ())),
        }

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_reads_float_samples_verbatim() {
        let path = temp_wav("float");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 11025,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).expect("create test wav");
        let samples = [0.0f32, 0.25, -0.5, 1.0];
        for &s in &samples {
            writer.write_sample(s).expect("write test sample");
        }
        writer.finalize().expect("finalize test wav");

        let mut source = WavSource::open(&path).expect("open test wav");
        let mut chunk = Vec::new();
        source.read_chunk(&mut chunk, 16).expect("read chunk");
        assert_eq!(chunk, samples);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let path = PathBuf::from("/nonexistent/segmenter-test.wav");
        match WavSource::open(&path) {
            Err(AudioFileError::Open { .. }) => {}
            other => panic!("expected Open error, got {:?}", other.map(|_| ())),
        }
    }
}
