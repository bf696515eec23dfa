//! PD-State Embedded - wrist unit drivers and reporting
//!
//! This crate provides the hardware tier of the PD-State wearable:
//! - LSM6DSL 6-axis IMU driver (I2C)
//! - Portable BLE peripheral state for the motion state GATT service
//!
//! The windowing and classification logic lives in `pdstate-core` and is
//! `no_std`; the firmware binary wires these drivers to it and to the
//! vendor BLE stack.
//!
//! # Hardware Requirements
//!
//! - ESP32-WROOM-32 wrist unit
//! - ST LSM6DSL 6-axis IMU (accelerometer + gyroscope)
//! - On-chip BLE 4.2 radio
//!
//! # GPIO Assignments
//!
//! ```text
//! I2C (LSM6DSL):  SDA=21, SCL=22, addr 0x6A (SA0 low)
//! Status LED:     GPIO 2
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod ble;
pub mod drivers;

// Re-export the driver and peripheral types
pub use ble::{BlePeripheral, PeripheralConfig};
pub use drivers::lsm6dsl::{AccelScale, GyroScale, Lsm6dsl, OutputDataRate};
