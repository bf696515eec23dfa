//! Transport abstraction for publishing classification results
//!
//! The firmware publishes over BLE, the host tools publish into logs or
//! recordings. The pipeline only sees this trait, and it deliberately
//! ignores publish failures: a dropped notification must never stall the
//! sampling loop.

use crate::types::StatusUpdate;

/// Sink for per-window classification results.
pub trait StatusTransport {
    /// Transport-specific failure type.
    type Error;

    /// Push one completed window's result toward subscribers.
    ///
    /// # Errors
    ///
    /// Returns the transport's error when delivery fails. Callers in the
    /// sampling loop treat failures as non-fatal.
    fn publish(&mut self, update: &StatusUpdate) -> Result<(), Self::Error>;

    /// Run transport housekeeping. Called once per tick regardless of
    /// whether anything was published; BLE stacks pump their event queue
    /// here. Default is a no-op.
    fn service(&mut self) {}
}

/// Transport that discards everything. Stands in when no radio or host link
/// is attached.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullTransport;

impl StatusTransport for NullTransport {
    type Error = core::convert::Infallible;

    fn publish(&mut self, _update: &StatusUpdate) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Transport that appends every update to a vector, for tests and offline
/// analysis runs.
#[cfg(feature = "std")]
#[derive(Clone, Debug, Default)]
pub struct RecordingTransport {
    updates: std::vec::Vec<StatusUpdate>,
    service_calls: u64,
}

#[cfg(feature = "std")]
impl RecordingTransport {
    /// Create an empty recorder.
    #[must_use]
    pub const fn new() -> Self {
        Self { updates: std::vec::Vec::new(), service_calls: 0 }
    }

    /// Everything published so far, oldest first.
    #[must_use]
    pub fn updates(&self) -> &[StatusUpdate] {
        &self.updates
    }

    /// The most recent update, if any.
    #[must_use]
    pub fn last(&self) -> Option<&StatusUpdate> {
        self.updates.last()
    }

    /// How many times [`StatusTransport::service`] has run.
    #[must_use]
    pub const fn service_calls(&self) -> u64 {
        self.service_calls
    }

    /// Drop the recorded history.
    pub fn clear(&mut self) {
        self.updates.clear();
    }
}

#[cfg(feature = "std")]
impl StatusTransport for RecordingTransport {
    type Error = core::convert::Infallible;

    fn publish(&mut self, update: &StatusUpdate) -> Result<(), Self::Error> {
        self.updates.push(*update);
        Ok(())
    }

    fn service(&mut self) {
        self.service_calls += 1;
    }
}

// ============================================================================
// Tests
// ============================================================================
