//! Error types for the PD-State pipeline
//!
//! This module provides custom error types that work in `no_std`
//! environments. All errors carry the context needed for debugging without
//! requiring heap allocation. Nothing in the core pipeline is fatal: every
//! failure path degrades to "no symptom detected" at the call site.

use core::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Configuration Errors
// ============================================================================

/// Errors from pipeline configuration validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConfigError {
    /// Sample rate must be positive
    ZeroSampleRate,
    /// Window length exceeds the FFT buffer capacity
    WindowExceedsCapacity {
        /// Configured window length in samples
        window_samples: usize,
        /// FFT buffer capacity
        capacity: usize,
    },
    /// Fusion weight must lie in [0, 1]
    FusionWeightOutOfRange {
        /// The rejected weight
        alpha: f32,
    },
    /// Low-pass coefficient must lie in (0, 1]
    FilterCoefficientOutOfRange {
        /// The rejected coefficient
        coefficient: f32,
    },
    /// A frequency band has low >= high or a negative edge
    InvalidBand {
        /// Band lower edge in Hz
        low_hz: f32,
        /// Band upper edge in Hz
        high_hz: f32,
    },
    /// FFT size must be a power of two
    FftSizeNotPowerOfTwo {
        /// The rejected size
        fft_size: usize,
    },
    /// FOG debounce must require at least one stationary window
    ZeroFogDebounce,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSampleRate => write!(f, "Sample rate must be positive"),
            Self::WindowExceedsCapacity { window_samples, capacity } => {
                write!(f, "Window of {window_samples} samples exceeds capacity {capacity}")
            }
            Self::FusionWeightOutOfRange { alpha } => {
                write!(f, "Fusion weight {alpha} outside [0, 1]")
            }
            Self::FilterCoefficientOutOfRange { coefficient } => {
                write!(f, "Filter coefficient {coefficient} outside (0, 1]")
            }
            Self::InvalidBand { low_hz, high_hz } => {
                write!(f, "Invalid band: {low_hz}Hz..{high_hz}Hz")
            }
            Self::FftSizeNotPowerOfTwo { fft_size } => {
                write!(f, "FFT size {fft_size} is not a power of two")
            }
            Self::ZeroFogDebounce => write!(f, "FOG debounce must be at least 1 window"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::ZeroSampleRate => defmt::write!(f, "zero sample rate"),
            Self::WindowExceedsCapacity { window_samples, capacity } => {
                defmt::write!(f, "window {} > cap {}", window_samples, capacity);
            }
            Self::FusionWeightOutOfRange { alpha } => {
                defmt::write!(f, "alpha {} out of range", alpha);
            }
            Self::FilterCoefficientOutOfRange { coefficient } => {
                defmt::write!(f, "coeff {} out of range", coefficient);
            }
            Self::InvalidBand { low_hz, high_hz } => {
                defmt::write!(f, "bad band {}..{}Hz", low_hz, high_hz);
            }
            Self::FftSizeNotPowerOfTwo { fft_size } => {
                defmt::write!(f, "FFT size {} not pow2", fft_size);
            }
            Self::ZeroFogDebounce => defmt::write!(f, "zero FOG debounce"),
        }
    }
}

// ============================================================================
// Spectral Analysis Errors
// ============================================================================

/// Errors from the spectral analysis engine.
///
/// A rejected analysis is a no-op window: the caller skips flag updates and
/// publishes nothing for that window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpectrumError {
    /// Input window was empty; nothing was computed
    EmptyInput,
}

impl fmt::Display for SpectrumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "Spectral analysis rejected: empty input window"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SpectrumError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::EmptyInput => defmt::write!(f, "empty FFT input"),
        }
    }
}

// ============================================================================
// Protocol Errors
// ============================================================================

/// Errors from the status wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolError {
    /// Not enough bytes for a status packet
    ShortPacket {
        /// Bytes received
        received: usize,
        /// Bytes expected
        expected: usize,
    },
    /// Checksum mismatch
    ChecksumMismatch {
        /// Expected checksum
        expected: u8,
        /// Computed checksum
        computed: u8,
    },
    /// State byte outside the 0-3 range
    InvalidState {
        /// The rejected state code
        code: u8,
    },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortPacket { received, expected } => {
                write!(f, "Short packet: got {received}/{expected} bytes")
            }
            Self::ChecksumMismatch { expected, computed } => {
                write!(f, "Checksum mismatch: expected 0x{expected:02X}, got 0x{computed:02X}")
            }
            Self::InvalidState { code } => {
                write!(f, "Invalid state code: {code} (valid range 0-3)")
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ProtocolError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::ShortPacket { received, expected } => {
                defmt::write!(f, "short pkt: {}/{}", received, expected);
            }
            Self::ChecksumMismatch { expected, computed } => {
                defmt::write!(f, "checksum: {:02X} != {:02X}", expected, computed);
            }
            Self::InvalidState { code } => {
                defmt::write!(f, "bad state: {}", code);
            }
        }
    }
}

// ============================================================================
// LSM6DSL Driver Errors
// ============================================================================

/// Errors from the LSM6DSL IMU driver.
///
/// "No new data" is deliberately not an error: the driver returns a zero
/// vector for that case and the pipeline carries on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lsm6dslError<E> {
    /// I2C communication failure
    Bus(E),
    /// WHO_AM_I returned an unexpected chip ID (expected 0x6A)
    BadChipId {
        /// The ID value that was read
        got: u8,
    },
}

impl<E: fmt::Debug> fmt::Display for Lsm6dslError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "I2C communication error: {e:?}"),
            Self::BadChipId { got } => {
                write!(f, "Bad chip ID: got 0x{got:02X}, expected 0x6A")
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for Lsm6dslError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Bus(e) => defmt::write!(f, "I2C error: {}", e),
            Self::BadChipId { got } => {
                defmt::write!(f, "bad chip ID: 0x{:02X}", got);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_context() {
        let err = ConfigError::WindowExceedsCapacity { window_samples: 300, capacity: 256 };
        assert!(matches!(
            err,
            ConfigError::WindowExceedsCapacity { window_samples: 300, capacity: 256 }
        ));

        let err = ConfigError::FusionWeightOutOfRange { alpha: 1.5 };
        assert!(matches!(err, ConfigError::FusionWeightOutOfRange { .. }));
    }

    #[test]
    fn test_protocol_error_variants() {
        let err = ProtocolError::ShortPacket { received: 3, expected: 5 };
        assert!(matches!(err, ProtocolError::ShortPacket { received: 3, expected: 5 }));

        let err = ProtocolError::InvalidState { code: 7 };
        assert!(matches!(err, ProtocolError::InvalidState { code: 7 }));
    }

    #[test]
    fn test_driver_error_wraps_bus() {
        #[derive(Debug, Clone, PartialEq, Eq)]
        struct FakeBusError;

        let err: Lsm6dslError<FakeBusError> = Lsm6dslError::Bus(FakeBusError);
        assert!(matches!(err, Lsm6dslError::Bus(_)));

        let err: Lsm6dslError<FakeBusError> = Lsm6dslError::BadChipId { got: 0x00 };
        assert!(matches!(err, Lsm6dslError::BadChipId { got: 0x00 }));
    }
}
