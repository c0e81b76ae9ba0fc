// DSP primitives shared by the feature extractors
//
// Module organization:
// - spectrum: Hamming-windowed one-sided power spectrum (rustfft)
// - filterbank: triangular mel and semitone filterbanks
// - dct: fixed-size type-II DCT for cepstral transforms
//
// Everything here is stateless per window; streaming state (carry buffers,
// smoothing filters, frame histories) lives with the extractors that own it.

mod dct;
mod filterbank;
mod spectrum;

pub use dct::DctII;
pub use filterbank::{Filterbank, TriangularFilter};
pub use spectrum::{magnitude_spectrum, PowerSpectrum};
