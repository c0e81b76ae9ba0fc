//! File-to-file analysis driver.
//!
//! Reads a mono WAV recording, runs the segmentation pipeline over it in
//! fixed-size chunks and writes either the per-step feature frames or the
//! classified statistics windows to a text or binary sink.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use segmenter_core::config::{PipelineConfig, ResampleQuality};
use segmenter_core::io::{
    statistics_record_columns, RecordWriter, WavSource, FEATURE_RECORD_COLUMNS,
};
use segmenter_core::pipeline::{Pipeline, PipelineOutput};

/// Samples fed to the pipeline per call; output is identical for any value.
const CHUNK_SIZE: usize = 4096;

#[derive(Parser, Debug)]
#[command(
    name = "segmenter",
    about = "Acoustic feature extraction and sound-type classification for field recordings"
)]
struct Cli {
    /// Mono WAV file to analyze.
    input: PathBuf,

    /// Output path (defaults to segmenter.out.txt, or .wav in binary mode).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit per-step feature frames instead of statistics and classification.
    #[arg(short, long)]
    features: bool,

    /// Write records as an interleaved float WAV instead of text.
    #[arg(short, long)]
    binary: bool,

    /// Stop after this percentage of the input file.
    #[arg(short, long, value_name = "PERCENT")]
    limit: Option<u8>,

    /// Resampler quality.
    #[arg(short, long, value_enum, default_value_t = QualityArg::Sinc)]
    quality: QualityArg,

    /// Analyze at the file's native rate with 2048/1024 windows, skipping
    /// resampling entirely.
    #[arg(long)]
    native_rate: bool,

    /// JSON configuration file overriding the defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum QualityArg {
    Sinc,
    Fast,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut source = WavSource::open(&cli.input)?;

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load_from_file(path),
        None => PipelineConfig::default(),
    };
    if cli.native_rate {
        config.analysis.sample_rate = source.sample_rate();
        config.analysis.window_size = 2048;
        config.analysis.step_size = 1024;
    }
    config.resample_quality = match cli.quality {
        QualityArg::Sinc => ResampleQuality::Sinc,
        QualityArg::Fast => ResampleQuality::Fast,
    };

    let output_path = cli.output.clone().unwrap_or_else(|| {
        PathBuf::from(if cli.binary {
            "segmenter.out.wav"
        } else {
            "segmenter.out.txt"
        })
    });

    let mut writer = if cli.binary {
        let channels = if cli.features {
            FEATURE_RECORD_COLUMNS
        } else {
            statistics_record_columns(config.feature_set)
        };
        RecordWriter::create_binary(&output_path, source.sample_rate(), channels)?
    } else {
        RecordWriter::create_text(&output_path)?
    };

    tracing::info!(
        "[Segmenter] Analyzing {} at {} Hz, window {} step {}",
        cli.input.display(),
        config.analysis.sample_rate,
        config.analysis.window_size,
        config.analysis.step_size
    );

    let mut pipeline = Pipeline::new(source.sample_rate(), config)?;

    let total_frames = source.total_frames();
    let mut frames_read: u64 = 0;
    let mut progress = 0u64;
    let mut chunk = Vec::with_capacity(CHUNK_SIZE);
    let mut stdout = std::io::stdout();

    loop {
        let count = source.read_chunk(&mut chunk, CHUNK_SIZE)?;
        if count == 0 {
            break;
        }

        let output = pipeline.process(&chunk)?;
        write_output(&mut writer, &output, cli.features)?;

        frames_read += count as u64;
        if total_frames > 0 {
            let current = frames_read * 100 / total_frames;

            if let Some(limit) = cli.limit {
                if current >= limit as u64 {
                    println!("{}%", current);
                    break;
                }
            }

            if current > progress {
                if current % 5 == 0 {
                    println!("{}%", current);
                } else {
                    print!(".");
                }
                stdout.flush().ok();
            }
            progress = current;
        }
    }

    // Flush even on a limited run so trailing windows are not lost
    let tail = pipeline.finish()?;
    write_output(&mut writer, &tail, cli.features)?;
    writer.finalize()?;

    tracing::info!("[Segmenter] Output written to {}", output_path.display());

    Ok(ExitCode::SUCCESS)
}

fn write_output(writer: &mut RecordWriter, output: &PipelineOutput, features: bool) -> Result<()> {
    if features {
        for frame in &output.frames {
            writer.write_features(frame)?;
        }
    } else {
        for (statistics, classification) in output.statistics.iter().zip(&output.classifications) {
            writer.write_classified(statistics, classification)?;
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    if verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt::init();
    }
}
