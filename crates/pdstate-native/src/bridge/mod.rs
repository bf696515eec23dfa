//! Bridges to a live wearable
//!
//! - [`ble`]: BLE monitor that subscribes to the device's state service

pub mod ble;

pub use ble::{MonitorEvent, StateMonitor};
