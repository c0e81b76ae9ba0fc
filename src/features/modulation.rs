//! 4 Hz amplitude-modulation energy
//!
//! Speech carries a strong syllabic amplitude modulation around 4 Hz.
//! This extractor correlates the recent history of each mel band with a
//! 4 Hz cosine over a half-second horizon and sums the normalized
//! responses, yielding one scalar per frame.

/// Measures 4 Hz modulation of the mel band envelopes.
pub struct FourHzModulation {
    /// Cosine kernel, one tap per frame of history.
    kernel: Vec<f32>,
    /// Ring buffer of the last `kernel.len()` mel frames, oldest first
    /// starting at `write_index`.
    frames: Vec<Vec<f32>>,
    write_index: usize,
}

impl FourHzModulation {
    /// History covers half a second of hops at the given rate.
    pub fn new(sample_rate: u32, step_size: usize, band_count: usize) -> Self {
        let dt = step_size as f64 / sample_rate as f64;
        let history_len = (0.5 / dt).ceil() as usize;

        let kernel = (0..history_len)
            .map(|i| (4.0 * 2.0 * std::f64::consts::PI * i as f64 * dt).cos() as f32)
            .collect();

        Self {
            kernel,
            frames: vec![vec![0.0; band_count]; history_len],
            write_index: 0,
        }
    }

    /// Push one mel frame and return the modulation energy over the
    /// current history. Bands with no energy in the horizon contribute 0.
    pub fn process(&mut self, mel_spectrum: &[f32]) -> f32 {
        let history_len = self.frames.len();
        self.frames[self.write_index].copy_from_slice(mel_spectrum);
        self.write_index = (self.write_index + 1) % history_len;

        let mut modulation = 0.0_f32;
        for band in 0..mel_spectrum.len() {
            let mut filtered = 0.0_f32;
            let mut total = 0.0_f32;
            let ordered = (self.write_index..history_len).chain(0..self.write_index);
            for (tap, frame) in ordered.enumerate() {
                let x = self.frames[frame][band];
                filtered += x * self.kernel[tap];
                total += x;
            }
            if total != 0.0 {
                modulation += filtered.abs() / total;
            }
        }
        modulation
    }
}
