//! Deterministic signal generators for tests.
//!
//! Both the unit tests and the integration tests feed the pipeline
//! synthetic material; generating it here keeps expectations reproducible
//! (the noise generator is seeded) and avoids fixture files.

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f32::consts::PI;

/// Pure sine tone with phase-accumulator generation.
pub fn sine(sample_rate: u32, frequency_hz: f32, amplitude: f32, len: usize) -> Vec<f32> {
    let mut phase = 0.0f32;
    let step = frequency_hz / sample_rate as f32;
    (0..len)
        .map(|_| {
            let value = (2.0 * PI * phase).sin() * amplitude;
            phase += step;
            if phase >= 1.0 {
                phase -= 1.0;
            }
            value
        })
        .collect()
}

/// Sine tone whose amplitude is modulated by `mod_hz`; a 4 Hz setting
/// produces the syllabic envelope the modulation feature responds to.
pub fn modulated_sine(
    sample_rate: u32,
    frequency_hz: f32,
    mod_hz: f32,
    amplitude: f32,
    len: usize,
) -> Vec<f32> {
    let carrier = sine(sample_rate, frequency_hz, amplitude, len);
    carrier
        .into_iter()
        .enumerate()
        .map(|(i, sample)| {
            let t = i as f32 / sample_rate as f32;
            let envelope = 0.5 * (1.0 + (2.0 * PI * mod_hz * t).cos());
            sample * envelope
        })
        .collect()
}

/// Uniform white noise from a fixed seed.
pub fn white_noise(amplitude: f32, len: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| rng.gen_range(-amplitude..amplitude))
        .collect()
}

pub fn silence(len: usize) -> Vec<f32> {
    vec![0.0; len]
}

/// Unit impulses every `interval` samples, starting at sample 0.
pub fn impulse_train(amplitude: f32, interval: usize, len: usize) -> Vec<f32> {
    let interval = interval.max(1);
    (0..len)
        .map(|i| if i % interval == 0 { amplitude } else { 0.0 })
        .collect()
}
