// Segmenter Core - streaming acoustic analysis engine
// Feature extraction and sound-type classification for monophonic field recordings

// Module declarations
pub mod classify;
pub mod config;
pub mod dsp;
pub mod error;
pub mod features;
pub mod io;
pub mod pipeline;
pub mod resample;
pub mod stats;
pub mod testing;

// Re-exports for convenience
pub use classify::{Classifier, CLASS_NAMES};
pub use config::{FeatureSet, PipelineConfig, ResampleQuality};
pub use error::{AudioFileError, PipelineError, ResampleError};
pub use features::{FeatureFrame, StatisticsFrame};
pub use pipeline::{Classification, Pipeline, PipelineOutput, TimedFrame};
