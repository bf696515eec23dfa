//! Core types for the PD-State pipeline
//!
//! This module provides the fundamental types shared across all tiers:
//! - Three-axis vectors for calibrated IMU readings
//! - Per-tick motion samples (acceleration + angular rate)
//! - The priority-encoded motion state reported over BLE
//! - Per-window symptom flags and the published status update

use serde::{Deserialize, Serialize};

// ============================================================================
// Vectors and Samples
// ============================================================================

/// Three-axis vector of calibrated sensor values.
///
/// Units depend on context: g for acceleration, degrees/second for angular
/// rate. A zero vector doubles as the "no new data" reading from the IMU.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X axis component
    pub x: f32,
    /// Y axis component
    pub y: f32,
    /// Z axis component
    pub z: f32,
}

impl Vec3 {
    /// Zero vector (also the "no new data" convention)
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    /// Create a new vector
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean magnitude of the vector
    #[inline]
    #[must_use]
    pub fn magnitude(self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }

    /// Check whether all components are exactly zero
    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Vec3 {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "({}, {}, {})", self.x, self.y, self.z);
    }
}

/// One tick's worth of IMU data.
///
/// Acceleration is in g, angular rate in degrees/second. Either field may
/// be the zero vector when the sensor had no fresh data for that tick.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionSample {
    /// Calibrated acceleration (g)
    pub accel: Vec3,
    /// Calibrated angular rate (degrees/second)
    pub gyro: Vec3,
}

impl MotionSample {
    /// Create a new sample
    #[inline]
    #[must_use]
    pub const fn new(accel: Vec3, gyro: Vec3) -> Self {
        Self { accel, gyro }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MotionSample {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "a={} w={}", self.accel, self.gyro);
    }
}

// ============================================================================
// Motion State
// ============================================================================

/// Priority-encoded motion state published on the state characteristic.
///
/// Encoding priority does not follow the numeric codes: tremor outranks
/// dyskinesia even though its code is lower. See [`MotionState::encode`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum MotionState {
    /// No symptom detected
    #[default]
    Normal = 0,
    /// Resting tremor detected
    Tremor = 1,
    /// Dyskinesia detected
    Dyskinesia = 2,
    /// Freezing-of-gait episode detected
    Fog = 3,
}

impl MotionState {
    /// All states in code order
    pub const ALL: [Self; 4] = [Self::Normal, Self::Tremor, Self::Dyskinesia, Self::Fog];

    /// Get the wire code for this state (0-3)
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Get state from a wire code (returns None if out of range)
    #[inline]
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Normal),
            1 => Some(Self::Tremor),
            2 => Some(Self::Dyskinesia),
            3 => Some(Self::Fog),
            _ => None,
        }
    }

    /// Get the display name for this state
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Tremor => "Tremor",
            Self::Dyskinesia => "Dyskinesia",
            Self::Fog => "FOG",
        }
    }

    /// Encode per-window flags into a single state.
    ///
    /// Fixed priority: FOG first, then tremor, then dyskinesia. Tremor is
    /// deliberately checked before dyskinesia even though its code (1) is
    /// lower than dyskinesia's (2); the check order, not the code value,
    /// decides precedence.
    #[inline]
    #[must_use]
    pub const fn encode(tremor: bool, dyskinesia: bool, fog: bool) -> Self {
        if fog {
            Self::Fog
        } else if tremor {
            Self::Tremor
        } else if dyskinesia {
            Self::Dyskinesia
        } else {
            Self::Normal
        }
    }

    /// Check whether this state reports any symptom
    #[inline]
    #[must_use]
    pub const fn is_symptomatic(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MotionState {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.name());
    }
}

// ============================================================================
// Symptom Flags and Status Update
// ============================================================================

/// Per-window symptom flags produced by the classifier.
///
/// All three are recomputed from scratch for each analyzed window; there is
/// no cross-window memory here. The one sticky bit (`had_steps`) lives in
/// [`crate::fog::FogDetector`], not in these flags.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SymptomFlags {
    /// Tremor-band energy ratio above threshold
    pub tremor: bool,
    /// Dyskinesia-band energy ratio above threshold
    pub dyskinesia: bool,
    /// Gait-band energy ratio above threshold (walking)
    pub gait: bool,
}

impl SymptomFlags {
    /// Flags with nothing detected
    pub const NONE: Self = Self { tremor: false, dyskinesia: false, gait: false };

    /// Check whether any flag is set
    #[inline]
    #[must_use]
    pub const fn any(self) -> bool {
        self.tremor || self.dyskinesia || self.gait
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SymptomFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "T={} D={} G={}", self.tremor, self.dyskinesia, self.gait);
    }
}

/// One window's published status: the encoded state plus the raw flags.
///
/// This is exactly what goes out on the four BLE characteristics. The gait
/// flag is internal to the pipeline and is not transmitted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Priority-encoded state
    pub state: MotionState,
    /// Tremor flag for this window
    pub tremor: bool,
    /// Dyskinesia flag for this window
    pub dyskinesia: bool,
    /// FOG event flag for this window
    pub fog: bool,
}

impl StatusUpdate {
    /// Build an update from per-window flags, encoding the state.
    #[inline]
    #[must_use]
    pub const fn from_flags(flags: SymptomFlags, fog: bool) -> Self {
        Self {
            state: MotionState::encode(flags.tremor, flags.dyskinesia, fog),
            tremor: flags.tremor,
            dyskinesia: flags.dyskinesia,
            fog,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusUpdate {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "{} (T={} D={} F={})",
            self.state,
            self.tremor,
            self.dyskinesia,
            self.fog
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
