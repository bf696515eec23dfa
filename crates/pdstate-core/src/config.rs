//! Pipeline configuration and frequency band plans
//!
//! The firmware runs with a single fixed configuration (the constants below);
//! the host tier accepts the same parameters at runtime so that band plans
//! and thresholds can be compared without reflashing.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Firmware defaults shared across tiers.
pub mod constants {
    /// IMU output data rate in Hz
    pub const SAMPLE_RATE_HZ: u32 = 52;

    /// FFT length in points (power of two) and window buffer capacity
    pub const FFT_SIZE: usize = 256;

    /// Number of valid spectrum bins (up to Nyquist, exclusive)
    pub const SPECTRUM_BINS: usize = FFT_SIZE / 2;

    /// Analysis window duration in seconds
    pub const WINDOW_SECONDS: u32 = 3;

    /// Samples per analysis window (sample rate x duration)
    pub const WINDOW_SAMPLES: usize = (SAMPLE_RATE_HZ * WINDOW_SECONDS) as usize;

    /// Blend weight for accel magnitude in the fused scalar
    pub const FUSION_ALPHA: f32 = 0.7;

    /// EMA coefficient for the acceleration low-pass filter
    pub const LOWPASS_ALPHA: f32 = 0.1;

    /// Biased-variance threshold below which a window counts as stationary
    pub const STATIONARY_VARIANCE: f32 = 0.01;

    /// Energy-ratio threshold for the tremor flag
    pub const TREMOR_RATIO: f32 = 0.1;

    /// Energy-ratio threshold for the dyskinesia flag
    pub const DYSKINESIA_RATIO: f32 = 0.1;

    /// Energy-ratio threshold for the gait flag
    pub const GAIT_RATIO: f32 = 0.2;

    /// Consecutive stationary windows after gait that trigger a FOG event
    pub const FOG_DEBOUNCE_WINDOWS: u8 = 2;
}

// ============================================================================
// Frequency Bands
// ============================================================================

/// A frequency range in Hz used for band energy queries.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FreqBand {
    /// Lower edge in Hz (inclusive)
    pub low_hz: f32,
    /// Upper edge in Hz (inclusive at bin granularity)
    pub high_hz: f32,
}

impl FreqBand {
    /// Create a new band
    #[inline]
    #[must_use]
    pub const fn new(low_hz: f32, high_hz: f32) -> Self {
        Self { low_hz, high_hz }
    }

    /// Check that the edges are ordered and non-negative
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.low_hz < 0.0 || self.high_hz <= self.low_hz {
            return Err(ConfigError::InvalidBand {
                low_hz: self.low_hz,
                high_hz: self.high_hz,
            });
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FreqBand {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}-{}Hz", self.low_hz, self.high_hz);
    }
}

/// Symptom band assignments for the classifier.
///
/// Two tunings were trialled on the device; both are kept selectable because
/// the "correct" bands are a clinical decision, not a structural one. Ratios
/// are always taken against [`BandPlan::total`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandPlan {
    /// Resting tremor band
    pub tremor: FreqBand,
    /// Dyskinesia band
    pub dyskinesia: FreqBand,
    /// Gait/step band
    pub gait: FreqBand,
    /// Reference band for total energy
    pub total: FreqBand,
}

impl BandPlan {
    /// Canonical band assignment: tremor 3-5 Hz, dyskinesia 5-7 Hz,
    /// gait 1-2.5 Hz. This is the plan the deployed loop runs.
    pub const STANDARD: Self = Self {
        tremor: FreqBand::new(3.0, 5.0),
        dyskinesia: FreqBand::new(5.0, 7.0),
        gait: FreqBand::new(1.0, 2.5),
        total: FreqBand::new(0.5, 10.0),
    };

    /// Earlier tuning kept for comparison runs: tremor 2-3 Hz,
    /// dyskinesia 4-5 Hz, gait 3-5 Hz.
    pub const ALTERNATE: Self = Self {
        tremor: FreqBand::new(2.0, 3.0),
        dyskinesia: FreqBand::new(4.0, 5.0),
        gait: FreqBand::new(3.0, 5.0),
        total: FreqBand::new(0.5, 10.0),
    };

    /// Check that every band is well-formed
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tremor.validate()?;
        self.dyskinesia.validate()?;
        self.gait.validate()?;
        self.total.validate()?;
        Ok(())
    }
}

impl Default for BandPlan {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BandPlan {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "T:{} D:{} G:{}", self.tremor, self.dyskinesia, self.gait);
    }
}

// ============================================================================
// Pipeline Configuration
// ============================================================================

/// Full configuration for the classification pipeline.
///
/// `Default` reproduces the firmware constants exactly.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Sampling rate in Hz
    pub sample_rate_hz: u32,
    /// FFT length (power of two, also the window buffer capacity)
    pub fft_size: usize,
    /// Samples per analysis window (must fit both `fft_size` and the fixed
    /// window buffer)
    pub window_samples: usize,
    /// Blend weight for accel magnitude in the fused scalar, in [0, 1]
    pub fusion_alpha: f32,
    /// EMA coefficient for the acceleration low-pass, in (0, 1]
    pub lowpass_alpha: f32,
    /// Variance threshold for the stationarity gate
    pub stationary_variance: f32,
    /// Symptom band assignment
    pub bands: BandPlan,
    /// Energy-ratio threshold for the tremor flag
    pub tremor_ratio: f32,
    /// Energy-ratio threshold for the dyskinesia flag
    pub dyskinesia_ratio: f32,
    /// Energy-ratio threshold for the gait flag
    pub gait_ratio: f32,
    /// Consecutive stationary windows (after gait) that trigger FOG
    pub fog_debounce_windows: u8,
}

impl PipelineConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate_hz == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if !self.fft_size.is_power_of_two() {
            return Err(ConfigError::FftSizeNotPowerOfTwo { fft_size: self.fft_size });
        }
        // The window buffer is a fixed array; the capacity is the smaller of
        // the FFT length and that backing store
        let capacity = if self.fft_size < constants::FFT_SIZE {
            self.fft_size
        } else {
            constants::FFT_SIZE
        };
        if self.window_samples > capacity {
            return Err(ConfigError::WindowExceedsCapacity {
                window_samples: self.window_samples,
                capacity,
            });
        }
        if !(0.0..=1.0).contains(&self.fusion_alpha) {
            return Err(ConfigError::FusionWeightOutOfRange { alpha: self.fusion_alpha });
        }
        if self.lowpass_alpha <= 0.0 || self.lowpass_alpha > 1.0 {
            return Err(ConfigError::FilterCoefficientOutOfRange {
                coefficient: self.lowpass_alpha,
            });
        }
        if self.fog_debounce_windows == 0 {
            return Err(ConfigError::ZeroFogDebounce);
        }
        self.bands.validate()
    }

    /// Frequency covered by one spectrum bin in Hz.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bin_width_hz(&self) -> f32 {
        self.sample_rate_hz as f32 / self.fft_size as f32
    }

    /// Sampling period in milliseconds (the tick cadence).
    #[inline]
    #[must_use]
    pub const fn tick_period_ms(&self) -> u32 {
        1000 / self.sample_rate_hz
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: constants::SAMPLE_RATE_HZ,
            fft_size: constants::FFT_SIZE,
            window_samples: constants::WINDOW_SAMPLES,
            fusion_alpha: constants::FUSION_ALPHA,
            lowpass_alpha: constants::LOWPASS_ALPHA,
            stationary_variance: constants::STATIONARY_VARIANCE,
            bands: BandPlan::STANDARD,
            tremor_ratio: constants::TREMOR_RATIO,
            dyskinesia_ratio: constants::DYSKINESIA_RATIO,
            gait_ratio: constants::GAIT_RATIO,
            fog_debounce_windows: constants::FOG_DEBOUNCE_WINDOWS,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
