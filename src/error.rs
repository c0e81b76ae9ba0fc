// Error types for the segmenter pipeline
//
// Structured errors for the two failure surfaces that can abort a stream:
// sample-rate conversion and audio file access. Numeric edge cases inside
// the feature extractors are not errors; they resolve to defined values.

use std::fmt;

/// Errors raised by the streaming sample-rate converter.
///
/// Any of these is fatal for the current stream: the resampler clears its
/// buffered input before returning, and the caller must discard the stream
/// or rebuild the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ResampleError {
    /// The converter could not be constructed for the requested rate pair.
    Construction { input_rate: u32, output_rate: u32, reason: String },

    /// The conversion library rejected a processing call.
    Process { reason: String },
}

impl fmt::Display for ResampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResampleError::Construction {
                input_rate,
                output_rate,
                reason,
            } => write!(
                f,
                "failed to construct resampler {} Hz -> {} Hz: {}",
                input_rate, output_rate, reason
            ),
            ResampleError::Process { reason } => {
                write!(f, "resampling failed: {}", reason)
            }
        }
    }
}

impl std::error::Error for ResampleError {}

/// Errors raised while reading or writing audio files.
#[derive(Debug)]
pub enum AudioFileError {
    /// The file could not be opened or parsed as WAV.
    Open { path: String, reason: String },

    /// The pipeline only accepts mono input.
    NotMono { path: String, channels: u16 },

    /// The sample format is not one the reader supports.
    UnsupportedFormat { path: String, detail: String },

    /// A sample failed to decode mid-stream.
    Read { path: String, reason: String },

    /// Output file creation or writing failed.
    Write { path: String, reason: String },
}

impl fmt::Display for AudioFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioFileError::Open { path, reason } => {
                write!(f, "failed to open {}: {}", path, reason)
            }
            AudioFileError::NotMono { path, channels } => {
                write!(f, "{} has {} channels, only mono input is supported", path, channels)
            }
            AudioFileError::UnsupportedFormat { path, detail } => {
                write!(f, "unsupported sample format in {}: {}", path, detail)
            }
            AudioFileError::Read { path, reason } => {
                write!(f, "error reading {}: {}", path, reason)
            }
            AudioFileError::Write { path, reason } => {
                write!(f, "error writing {}: {}", path, reason)
            }
        }
    }
}

impl std::error::Error for AudioFileError {}

/// Top-level pipeline error, wrapping whichever stage failed.
#[derive(Debug)]
pub enum PipelineError {
    Resample(ResampleError),
    AudioFile(AudioFileError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Resample(err) => write!(f, "{}", err),
            PipelineError::AudioFile(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Resample(err) => Some(err),
            PipelineError::AudioFile(err) => Some(err),
        }
    }
}

impl From<ResampleError> for PipelineError {
    fn from(err: ResampleError) -> Self {
        PipelineError::Resample(err)
    }
}

impl From<AudioFileError> for PipelineError {
    fn from(err: AudioFileError) -> Self {
        PipelineError::AudioFile(err)
    }
}
