//! Spectral analysis for fused motion windows
//!
//! - [`fft`]: FFT magnitude spectra and the analyzer the pipeline runs

pub mod fft;
