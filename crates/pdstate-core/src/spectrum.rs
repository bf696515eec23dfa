//! Magnitude spectrum container and band energy queries
//!
//! The FFT itself runs in the host or firmware analysis stage; this module
//! holds the resulting single-sided magnitude spectrum and answers the band
//! queries the classifier asks.

use crate::config::{constants, FreqBand};

/// Single-sided magnitude spectrum up to Nyquist.
///
/// Bin `i` covers frequency `i * bin_width_hz`. Only the first `used` bins
/// are meaningful; for the deployed 256-point FFT at 52 Hz that is 128 bins
/// of 0.203 Hz each.
#[derive(Clone, Debug)]
pub struct MagnitudeSpectrum {
    bins: [f32; constants::SPECTRUM_BINS],
    used: usize,
    bin_width_hz: f32,
}

impl MagnitudeSpectrum {
    /// Create a zeroed spectrum with all bins in use.
    #[must_use]
    pub const fn new(bin_width_hz: f32) -> Self {
        Self {
            bins: [0.0; constants::SPECTRUM_BINS],
            used: constants::SPECTRUM_BINS,
            bin_width_hz,
        }
    }

    /// Create a zeroed spectrum with only the first `len` bins in use,
    /// clamped to the backing capacity. Used when the FFT length differs
    /// from the deployed 256 points.
    #[must_use]
    pub const fn with_len(len: usize, bin_width_hz: f32) -> Self {
        let used = if len > constants::SPECTRUM_BINS {
            constants::SPECTRUM_BINS
        } else {
            len
        };
        Self {
            bins: [0.0; constants::SPECTRUM_BINS],
            used,
            bin_width_hz,
        }
    }

    /// Valid bins.
    #[inline]
    #[must_use]
    pub fn bins(&self) -> &[f32] {
        &self.bins[..self.used]
    }

    /// Mutable view of the valid bins, for the analysis stage to fill.
    #[inline]
    pub fn bins_mut(&mut self) -> &mut [f32] {
        &mut self.bins[..self.used]
    }

    /// Width of one bin in Hz.
    #[inline]
    #[must_use]
    pub const fn bin_width_hz(&self) -> f32 {
        self.bin_width_hz
    }

    /// Number of valid bins.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.used
    }

    /// True when the spectrum holds no bins.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Center frequency of a bin in Hz.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn freq_of_bin(&self, bin: usize) -> f32 {
        bin as f32 * self.bin_width_hz
    }

    /// Map a frequency to its bin index, truncating toward zero and clamping
    /// into the valid range.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn bin_of_freq(&self, freq_hz: f32) -> usize {
        if self.used == 0 || self.bin_width_hz <= 0.0 {
            return 0;
        }
        let raw = freq_hz / self.bin_width_hz;
        if raw <= 0.0 {
            return 0;
        }
        let bin = raw as usize;
        bin.min(self.used - 1)
    }

    /// Inclusive bin range for a frequency band, both ends clamped into the
    /// spectrum.
    fn band_bins(&self, band: FreqBand) -> (usize, usize) {
        (self.bin_of_freq(band.low_hz), self.bin_of_freq(band.high_hz))
    }

    /// Sum of bin magnitudes over a band (inclusive at both bin edges).
    #[must_use]
    pub fn band_energy(&self, band: FreqBand) -> f32 {
        if self.used == 0 {
            return 0.0;
        }
        let (start, end) = self.band_bins(band);
        self.bins[start..=end].iter().sum()
    }

    /// Largest bin magnitude in a band.
    #[must_use]
    pub fn band_max(&self, band: FreqBand) -> f32 {
        if self.used == 0 {
            return 0.0;
        }
        let (start, end) = self.band_bins(band);
        self.bins[start..=end]
            .iter()
            .fold(0.0_f32, |max, &v| if v > max { v } else { max })
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MagnitudeSpectrum {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Spectrum({} bins @ {}Hz)", self.used, self.bin_width_hz);
    }
}

// ============================================================================
// Tests
// ============================================================================
