//! Hardware drivers for the wrist unit
//!
//! - [`lsm6dsl`]: ST LSM6DSL 6-axis IMU (accelerometer + gyroscope, I2C)

pub mod lsm6dsl;
