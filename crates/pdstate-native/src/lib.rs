//! PD State Native - Host-side motion analysis
//!
//! This crate runs the full classification pipeline on a host machine:
//! - Spectral analysis (FFT, band energy) over fused motion windows
//! - The tick-driven pipeline: filter, window, classify, publish
//! - Bridge to a live wearable over BLE
//!
//! # Modules
//!
//! - [`processing`]: Spectral analysis
//! - [`pipeline`]: The end-to-end classification pipeline
//! - [`bridge`]: BLE monitor for a running device (requires `ble` feature)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

/// BLE bridge module (requires `ble` feature)
#[cfg(feature = "ble")]
pub mod bridge;
pub mod pipeline;
pub mod processing;

// Re-export key types
pub use pipeline::{MotionPipeline, PipelineError, WindowReport};
pub use processing::fft::SpectralAnalyzer;
