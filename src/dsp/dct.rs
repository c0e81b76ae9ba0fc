//! Type-II discrete cosine transform
//!
//! Small fixed-size DCT used for cepstral coefficients. Sizes here are tiny
//! (dozens of points, computed ~43 times per second) so a precomputed
//! cosine table beats dragging in another FFT round-trip. The convention
//! matches the unnormalized DCT-II:
//!
//! `Y[k] = 2 * sum_{j=0}^{N-1} x[j] * cos(pi * (j + 0.5) * k / N)`

/// Unnormalized DCT-II over a fixed input length.
pub struct DctII {
    size: usize,
    /// Row-major cosine table, `table[k * size + j]`.
    table: Vec<f64>,
}

impl DctII {
    pub fn new(size: usize) -> Self {
        let mut table = Vec::with_capacity(size * size);
        for k in 0..size {
            for j in 0..size {
                let angle = std::f64::consts::PI * (j as f64 + 0.5) * k as f64 / size as f64;
                table.push(angle.cos());
            }
        }
        Self { size, table }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Transform one block. Accumulates in f64 to keep the small output
    /// coefficients stable.
    pub fn process(&self, input: &[f32]) -> Vec<f32> {
        debug_assert_eq!(input.len(), self.size);

        let mut output = Vec::with_capacity(self.size);
        for k in 0..self.size {
            let row = &self.table[k * self.size..(k + 1) * self.size];
            let sum: f64 = input
                .iter()
                .zip(row.iter())
                .map(|(x, c)| *x as f64 * c)
                .sum();
            output.push((2.0 * sum) as f32);
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_input_maps_to_dc_only() {
        let dct = DctII::new(16);
        let input = vec![0.5_f32; 16];
        let output = dct.process(&input);

        // Y[0] = 2 * N * c, all other coefficients vanish
        assert!(
            (output[0] - 2.0 * 16.0 * 0.5).abs() < 1e-4,
            "DC coefficient should be 16.0, got {}",
            output[0]
        );
        for (k, y) in output.iter().enumerate().skip(1) {
            assert!(y.abs() < 1e-4, "coefficient {} should be ~0, got {}", k, y);
        }
    }

    #[test]
    fn test_unit_impulse() {
        let dct = DctII::new(8);
        let mut input = vec![0.0_f32; 8];
        input[0] = 1.0;
        let output = dct.process(&input);

        for (k, y) in output.iter().enumerate() {
            let expected = 2.0 * (std::f64::consts::PI * 0.5 * k as f64 / 8.0).cos() as f32;
            assert!(
                (y - expected).abs() < 1e-5,
                "impulse coefficient {}: got {}, expected {}",
                k,
                y,
                expected
            );
        }
    }
}
