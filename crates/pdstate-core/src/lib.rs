//! PD-State Core - `no_std` compatible motion classification
//!
//! This crate provides the foundational types and classification logic for
//! the PD-State wearable, a wrist-worn monitor that detects Parkinson's
//! motor symptoms (tremor, dyskinesia, freezing of gait) from IMU data. It
//! is designed to work in `no_std` environments (the STM32L4 firmware) as
//! well as `std` environments (host-side replay and simulation).
//!
//! # Modules
//!
//! - [`types`]: Core data types (vectors, samples, states, flags)
//! - [`error`]: Error types for drivers, analysis, and protocol
//! - [`config`]: Pipeline configuration and frequency band plans
//! - [`math`]: Filters and statistics (EMA, moving average, variance)
//! - [`window`]: Fixed-capacity fusion window buffer
//! - [`spectrum`]: Magnitude spectrum with band energy/peak queries
//! - [`classify`]: Per-window symptom classification
//! - [`fog`]: Freezing-of-gait hysteresis state machine
//! - [`protocol`]: Status wire format for the BLE characteristics
//! - [`source`]: Motion sample source trait (IMU or simulation)
//! - [`transport`]: Status transport trait consumed by the pipeline
//!
//! # Features
//!
//! - `std`: Enable standard library support
//! - `defmt`: Enable `defmt` formatting for embedded logging
//!
//! # Example
//!
//! ```rust
//! use pdstate_core::types::MotionState;
//!
//! // Freezing of gait outranks everything else
//! let state = MotionState::encode(true, true, true);
//! assert_eq!(state, MotionState::Fog);
//! assert_eq!(state.code(), 3);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

#[cfg(feature = "std")]
extern crate std;

pub mod classify;
pub mod config;
pub mod error;
pub mod fog;
pub mod math;
pub mod protocol;
pub mod source;
pub mod spectrum;
pub mod transport;
pub mod types;
pub mod window;

// Re-export commonly used types at crate root
pub use classify::{BandRatios, SymptomClassifier};
pub use config::{BandPlan, FreqBand, PipelineConfig};
pub use error::{ConfigError, Lsm6dslError, ProtocolError, SpectrumError};
pub use fog::FogDetector;
pub use math::{EmaFilter, MovingAverage, VectorEma};
pub use protocol::StatusPacket;
pub use source::MotionSource;
pub use spectrum::MagnitudeSpectrum;
pub use transport::{NullTransport, StatusTransport};
pub use types::{MotionSample, MotionState, StatusUpdate, SymptomFlags, Vec3};
pub use window::{FusionWindow, WindowStatus};
