//! FFT magnitude spectra for motion windows
//!
//! The firmware pipeline feeds 156-sample fused windows into a 256-point
//! FFT; the tail is zero-padded rather than windowed, so band energies here
//! match the device bin for bin.

use rustfft::{num_complex::Complex, FftPlanner};

use pdstate_core::error::SpectrumError;
use pdstate_core::spectrum::MagnitudeSpectrum;

/// FFT-based magnitude spectrum analyzer.
///
/// Buffers are allocated once; each [`SpectralAnalyzer::analyze`] call
/// overwrites them in place.
pub struct SpectralAnalyzer {
    fft_size: usize,
    sample_rate_hz: f32,
    planner: FftPlanner<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl SpectralAnalyzer {
    /// Create an analyzer.
    ///
    /// # Arguments
    ///
    /// * `fft_size` - FFT length in points (should be a power of 2)
    /// * `sample_rate_hz` - Sample rate in Hz
    #[must_use]
    pub fn new(fft_size: usize, sample_rate_hz: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        Self {
            fft_size,
            sample_rate_hz,
            planner,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch: vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()],
        }
    }

    /// Frequency resolution (Hz per bin).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn frequency_resolution(&self) -> f32 {
        self.sample_rate_hz / self.fft_size as f32
    }

    /// Compute the single-sided magnitude spectrum of a time-domain window.
    ///
    /// Inputs shorter than the FFT length are zero-padded; longer inputs are
    /// truncated to the first `fft_size` samples.
    ///
    /// # Errors
    ///
    /// Returns [`SpectrumError::EmptyInput`] for an empty slice.
    pub fn analyze(&mut self, samples: &[f32]) -> Result<MagnitudeSpectrum, SpectrumError> {
        if samples.is_empty() {
            return Err(SpectrumError::EmptyInput);
        }
        let used = samples.len().min(self.fft_size);

        // Copy and zero-pad
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let re = if i < used { samples[i] } else { 0.0 };
            *slot = Complex::new(re, 0.0);
        }

        let fft = self.planner.plan_fft_forward(self.fft_size);
        fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        // Magnitudes up to Nyquist
        let mut spectrum =
            MagnitudeSpectrum::with_len(self.fft_size / 2, self.frequency_resolution());
        for (bin, c) in spectrum.bins_mut().iter_mut().zip(self.buffer.iter()) {
            *bin = c.norm();
        }
        Ok(spectrum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdstate_core::config::constants;
    use pdstate_core::config::BandPlan;

    fn sine(freq_hz: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                (2.0 * std::f32::consts::PI * freq_hz * i as f32
                    / constants::SAMPLE_RATE_HZ as f32)
                    .sin()
            })
            .collect()
    }

    #[test]
    fn test_resolution_matches_device() {
        let analyzer = SpectralAnalyzer::new(256, 52.0);
        assert!((analyzer.frequency_resolution() - 0.203_125).abs() < 1e-6);
    }

    #[test]
    fn test_tremor_sine_lands_in_tremor_band() {
        let mut analyzer = SpectralAnalyzer::new(256, 52.0);
        let window = sine(4.0, constants::WINDOW_SAMPLES);
        let spectrum = analyzer.analyze(&window).unwrap();

        // 4 Hz maps to bin 19.7; the peak should land on bin 19 or 20
        let peak_bin = spectrum
            .bins()
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert!((19..=20).contains(&peak_bin), "peak at bin {peak_bin}");

        let bands = BandPlan::STANDARD;
        let tremor = spectrum.band_energy(bands.tremor);
        let dyskinesia = spectrum.band_energy(bands.dyskinesia);
        let gait = spectrum.band_energy(bands.gait);
        assert!(tremor > 3.0 * dyskinesia);
        assert!(tremor > 3.0 * gait);
    }

    #[test]
    fn test_dc_concentrates_at_bin_zero() {
        let mut analyzer = SpectralAnalyzer::new(256, 52.0);
        let window = vec![1.0_f32; constants::WINDOW_SAMPLES];
        let spectrum = analyzer.analyze(&window).unwrap();

        let dc = spectrum.bins()[0];
        assert!((dc - 156.0).abs() < 1e-2);
        for &bin in &spectrum.bins()[1..] {
            assert!(bin < dc);
        }
    }

    #[test]
    fn test_empty_input_rejected() {
        let mut analyzer = SpectralAnalyzer::new(256, 52.0);
        assert!(matches!(analyzer.analyze(&[]), Err(SpectrumError::EmptyInput)));
    }

    #[test]
    fn test_long_input_truncates_to_fft_size() {
        let mut analyzer = SpectralAnalyzer::new(256, 52.0);
        let long = sine(4.0, 400);
        let truncated = analyzer.analyze(&long).unwrap();
        let exact = analyzer.analyze(&long[..256]).unwrap();

        for (a, b) in truncated.bins().iter().zip(exact.bins()) {
            assert!((a - b).abs() < 1e-5);
        }
    }
}
