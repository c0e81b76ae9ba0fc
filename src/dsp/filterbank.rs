//! Triangular filterbanks over the one-sided spectrum
//!
//! Two frequency layouts share one representation:
//!
//! - a mel-spaced bank feeding the cepstral coefficients, with band edges
//!   derived log-linearly between 0 Hz and 5512.5 Hz independent of the
//!   analysis rate, and
//! - a chromatic bank with one filter per equal-tempered semitone, used by
//!   the pitch-entropy measure.
//!
//! Each filter keeps only its contiguous run of nonzero coefficients plus
//! the spectral bin it starts at, so applying the whole bank touches each
//! spectrum bin at most twice.

/// One triangular filter: a contiguous span of weights into the spectrum.
#[derive(Debug, Clone)]
pub struct TriangularFilter {
    /// Index of the first spectrum bin this filter weights.
    pub offset: usize,
    /// Weights for bins `offset..offset + coeffs.len()`.
    pub coeffs: Vec<f32>,
}

impl TriangularFilter {
    fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }
}

/// A bank of triangular filters over a fixed spectrum size.
pub struct Filterbank {
    filters: Vec<TriangularFilter>,
    spectrum_size: usize,
}

impl Filterbank {
    /// Mel-spaced bank of `filter_count` filters for `window_size` FFT bins.
    ///
    /// Band edges are spaced uniformly on a log-frequency axis from DC up to
    /// 5512.5 Hz, expressed in bins of the given rate. When the top edge
    /// lands past the Nyquist bin it is clamped with a warning; this happens
    /// when `sample_rate` is below 11025 Hz.
    pub fn mel(window_size: usize, filter_count: usize, sample_rate: u32) -> Self {
        let n = window_size as f64;
        let fs = sample_rate as f64;
        let fn2 = window_size / 2;
        let p = filter_count;

        // Normalized corner and top frequencies of the mel warp
        let f0 = 700.0 / fs;
        let fl = 0.0_f64;
        let fh = 0.5 * 11025.0 / fs;

        let lr = ((f0 + fh) / (f0 + fl)).ln() / (p as f64 + 1.0);
        let edge_bin = |k: f64| n * ((f0 + fl) * (k * lr).exp() - f0);

        let b1 = (edge_bin(0.0).floor() + 1.0) as usize;
        let b2 = edge_bin(1.0).ceil() as usize;
        let b3 = edge_bin(p as f64).floor() as usize;
        let top = edge_bin(p as f64 + 1.0).ceil() as usize;
        let b4 = if top > fn2 {
            log::warn!(
                "[Filterbank] mel top edge bin {} exceeds Nyquist bin {}; clamping",
                top,
                fn2
            );
            fn2 - 1
        } else {
            top - 1
        };

        // Fractional filter index of every candidate bin
        let pf: Vec<f64> = (0..=b4 - b1)
            .map(|idx| ((f0 + (idx + b1) as f64 / n) / (f0 + fl)).ln() / lr)
            .collect();

        let mut offsets: Vec<Option<usize>> = vec![None; p];
        let mut coeffs: Vec<Vec<f32>> = vec![Vec::new(); p];
        let mut push = |filter: usize, bin: usize, value: f64| {
            if offsets[filter].is_none() {
                offsets[filter] = Some(bin);
            }
            coeffs[filter].push(value as f32);
        };

        // Rising slopes: bin idx contributes to the filter it sits under
        for idx in 0..=b3 - b1 {
            let fp = pf[idx].floor();
            let pm = pf[idx] - fp;
            let filter = fp as usize;
            if filter < p {
                push(filter, idx + b1, 2.0 * pm);
            }
        }
        // Falling slopes: the same bin also tails off the previous filter
        for idx in b2 - b1..=b4 - b1 {
            let fp = pf[idx].floor();
            let pm = pf[idx] - fp;
            let filter = fp as isize - 1;
            if filter >= 0 && (filter as usize) < p {
                push(filter as usize, idx + b1, 2.0 * (1.0 - pm));
            }
        }

        let filters = offsets
            .into_iter()
            .zip(coeffs)
            .map(|(offset, coeffs)| TriangularFilter {
                offset: offset.unwrap_or(0),
                coeffs,
            })
            .collect();

        Self {
            filters,
            spectrum_size: window_size / 2 + 1,
        }
    }

    /// Semitone-spaced bank between `lo_freq` and `hi_freq`.
    ///
    /// Filter centers sit on the equal-tempered scale anchored at `lo_freq`;
    /// each triangle spans its two neighboring semitones and is normalized
    /// to unit area. With short windows the lowest triangles can be narrower
    /// than one bin and stay empty. The Nyquist bin never contributes.
    pub fn chromatic(window_size: usize, sample_rate: u32, lo_freq: f32, hi_freq: f32) -> Self {
        let lo = lo_freq as f64;
        let hi = hi_freq as f64;
        let max_index = (12.0 * (hi / lo).log2()).floor() as i64 + 1;

        let freqs: Vec<f64> = (-1..=max_index)
            .map(|idx| lo * 2f64.powf(idx as f64 / 12.0))
            .collect();
        let filter_count = freqs.len() - 2;

        let spectrum_size = window_size / 2 + 1;
        let bin_hz = (sample_rate as f64 / 2.0) / (spectrum_size - 1) as f64;

        let mut filters = Vec::with_capacity(filter_count);
        for i in 0..filter_count {
            let height = 2.0 / (freqs[i + 2] - freqs[i]);
            let mut offset = None;
            let mut coeffs = Vec::new();
            for j in 0..spectrum_size - 1 {
                let f = j as f64 * bin_hz;
                let value = if f > freqs[i] && f <= freqs[i + 1] {
                    height * (f - freqs[i]) / (freqs[i + 1] - freqs[i])
                } else if f > freqs[i + 1] && f < freqs[i + 2] {
                    height * (freqs[i + 2] - f) / (freqs[i + 2] - freqs[i + 1])
                } else {
                    continue;
                };
                if offset.is_none() {
                    offset = Some(j);
                }
                coeffs.push(value as f32);
            }
            filters.push(TriangularFilter {
                offset: offset.unwrap_or(0),
                coeffs,
            });
        }

        Self {
            filters,
            spectrum_size,
        }
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn filters(&self) -> &[TriangularFilter] {
        &self.filters
    }

    /// Weighted sum of spectrum bins per filter. Empty filters yield 0.
    pub fn apply(&self, spectrum: &[f32]) -> Vec<f32> {
        debug_assert_eq!(spectrum.len(), self.spectrum_size);

        self.filters
            .iter()
            .map(|filter| {
                filter
                    .coeffs
                    .iter()
                    .zip(spectrum.iter().skip(filter.offset))
                    .map(|(c, s)| c * s)
                    .sum()
            })
            .collect()
    }
}
