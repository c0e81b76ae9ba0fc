// File I/O for the command-line driver
//
// The pipeline itself never touches the filesystem; these collaborators
// feed it from WAV files and persist its two output streams.
//
// Module organization:
// - wav: chunked mono WAV reader (hound)
// - writer: tab-separated text and float-WAV record sinks

mod wav;
mod writer;

pub use wav::WavSource;
pub use writer::{statistics_record_columns, RecordWriter, FEATURE_RECORD_COLUMNS};
