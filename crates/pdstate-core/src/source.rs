//! Motion sample acquisition seam
//!
//! The pipeline does not care whether samples come from the IMU over I2C or
//! from a synthetic generator in a test rig; it pulls one [`MotionSample`]
//! per tick through this trait.

use crate::types::MotionSample;

/// One-sample-per-tick motion data source.
pub trait MotionSource {
    /// Source-specific failure type.
    type Error;

    /// Read the current accel/gyro pair.
    ///
    /// Sources that have no fresh data return a zeroed sample rather than
    /// blocking; the tick cadence belongs to the caller.
    ///
    /// # Errors
    ///
    /// Returns the source's error when the underlying read fails.
    fn read_sample(&mut self) -> Result<MotionSample, Self::Error>;
}
