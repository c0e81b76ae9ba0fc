//! Streaming sample-rate conversion
//!
//! Wraps rubato's fixed-input-size resamplers behind a push interface that
//! accepts arbitrary chunk sizes. Incoming samples collect in a backlog and
//! are handed to the converter in constant 1024-frame blocks, so the block
//! sequence the converter sees is a function of the stream content alone.
//! Identical streams produce identical output no matter how callers slice
//! their pushes.

use rubato::{
    FastFixedIn, PolynomialDegree, Resampler, SincFixedIn, SincInterpolationParameters,
    SincInterpolationType, WindowFunction,
};

use crate::config::ResampleQuality;
use crate::error::ResampleError;

/// Frames per conversion block handed to rubato.
const BLOCK_SIZE: usize = 1024;

enum Engine {
    Sinc(SincFixedIn<f32>),
    Fast(FastFixedIn<f32>),
}

impl Engine {
    fn process_block(&mut self, block: &[f32]) -> Result<Vec<f32>, rubato::ResampleError> {
        let input = [block];
        let mut frames = match self {
            Engine::Sinc(resampler) => resampler.process(&input, None)?,
            Engine::Fast(resampler) => resampler.process(&input, None)?,
        };
        Ok(frames.swap_remove(0))
    }

    fn process_tail(&mut self, tail: Option<&[f32]>) -> Result<Vec<f32>, rubato::ResampleError> {
        let mut frames = match (self, tail) {
            (Engine::Sinc(resampler), Some(tail)) => {
                let input = [tail];
                resampler.process_partial(Some(&input[..]), None)?
            }
            (Engine::Sinc(resampler), None) => resampler.process_partial::<&[f32]>(None, None)?,
            (Engine::Fast(resampler), Some(tail)) => {
                let input = [tail];
                resampler.process_partial(Some(&input[..]), None)?
            }
            (Engine::Fast(resampler), None) => resampler.process_partial::<&[f32]>(None, None)?,
        };
        Ok(frames.swap_remove(0))
    }
}

/// Chunk-size-independent mono resampler.
///
/// When input and output rates match, samples pass through untouched.
pub struct StreamResampler {
    engine: Option<Engine>,
    backlog: Vec<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl StreamResampler {
    pub fn new(
        input_rate: u32,
        output_rate: u32,
        quality: ResampleQuality,
    ) -> Result<Self, ResampleError> {
        let engine = if input_rate == output_rate {
            None
        } else {
            let ratio = output_rate as f64 / input_rate as f64;
            let engine = match quality {
                ResampleQuality::Sinc => {
                    let params = SincInterpolationParameters {
                        sinc_len: 256,
                        f_cutoff: 0.95,
                        interpolation: SincInterpolationType::Linear,
                        oversampling_factor: 256,
                        window: WindowFunction::BlackmanHarris2,
                    };
                    SincFixedIn::<f32>::new(ratio, 2.0, params, BLOCK_SIZE, 1)
                        .map(Engine::Sinc)
                        .map_err(|e| ResampleError::Construction {
                            input_rate,
                            output_rate,
                            reason: e.to_string(),
                        })?
                }
                ResampleQuality::Fast => {
                    FastFixedIn::<f32>::new(ratio, 2.0, PolynomialDegree::Linear, BLOCK_SIZE, 1)
                        .map(Engine::Fast)
                        .map_err(|e| ResampleError::Construction {
                            input_rate,
                            output_rate,
                            reason: e.to_string(),
                        })?
                }
            };
            Some(engine)
        };

        Ok(Self {
            engine,
            backlog: Vec::new(),
            input_rate,
            output_rate,
        })
    }

    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Push a chunk of any size; converted samples append to `output`.
    ///
    /// Samples short of a full conversion block stay in the backlog until
    /// the next push or the final `finish`.
    pub fn push(&mut self, samples: &[f32], output: &mut Vec<f32>) -> Result<(), ResampleError> {
        let Some(engine) = self.engine.as_mut() else {
            output.extend_from_slice(samples);
            return Ok(());
        };

        self.backlog.extend_from_slice(samples);

        let mut consumed = 0;
        while self.backlog.len() - consumed >= BLOCK_SIZE {
            let block = &self.backlog[consumed..consumed + BLOCK_SIZE];
            match engine.process_block(block) {
                Ok(frames) => output.extend_from_slice(&frames),
                Err(e) => {
                    self.backlog.clear();
                    return Err(ResampleError::Process {
                        reason: e.to_string(),
                    });
                }
            }
            consumed += BLOCK_SIZE;
        }
        self.backlog.drain(..consumed);
        Ok(())
    }

    /// Convert the backlog remainder and drain the converter's filter tail.
    pub fn finish(&mut self, output: &mut Vec<f32>) -> Result<(), ResampleError> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(());
        };

        let tail = std::mem::take(&mut self.backlog);
        if !tail.is_empty() {
            match engine.process_tail(Some(&tail)) {
                Ok(frames) => output.extend_from_slice(&frames),
                Err(e) => {
                    return Err(ResampleError::Process {
                        reason: e.to_string(),
                    })
                }
            }
        }
        match engine.process_tail(None) {
            Ok(frames) => output.extend_from_slice(&frames),
            Err(e) => {
                return Err(ResampleError::Process {
                    reason: e.to_string(),
                })
            }
        }
        Ok(())
    }
}
