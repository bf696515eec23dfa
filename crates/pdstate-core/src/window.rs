//! Fused magnitude accumulation window
//!
//! Each tick contributes one fused scalar (a weighted blend of the smoothed
//! acceleration magnitude and the gyro magnitude). When a full window has
//! accumulated, the caller runs spectral analysis over it and the window
//! starts refilling in place.

use crate::config::constants;

/// Result of pushing one fused sample.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WindowStatus {
    /// Window is still filling
    Accumulating,
    /// A full window just completed and is ready for analysis
    WindowReady,
}

#[cfg(feature = "defmt")]
impl defmt::Format for WindowStatus {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Accumulating => defmt::write!(f, "Accumulating"),
            Self::WindowReady => defmt::write!(f, "WindowReady"),
        }
    }
}

/// Ring-less accumulation buffer for fused motion magnitudes.
///
/// The backing store is sized for the FFT length so the analysis stage can
/// zero-pad without copying into a second buffer. Only the first
/// `window_samples` slots are ever written; completion rewinds the write
/// index but leaves the data in place, so [`FusionWindow::window`] remains
/// valid until the next push overwrites it.
#[derive(Clone, Debug)]
pub struct FusionWindow {
    samples: [f32; constants::FFT_SIZE],
    idx: usize,
    window_samples: usize,
    fusion_alpha: f32,
}

impl FusionWindow {
    /// Buffer capacity (FFT length).
    pub const CAPACITY: usize = constants::FFT_SIZE;

    /// Create an empty window.
    ///
    /// `window_samples` must not exceed [`FusionWindow::CAPACITY`]; the
    /// pipeline config validation enforces this before construction.
    #[must_use]
    pub const fn new(window_samples: usize, fusion_alpha: f32) -> Self {
        Self {
            samples: [0.0; constants::FFT_SIZE],
            idx: 0,
            window_samples,
            fusion_alpha,
        }
    }

    /// Blend one accel/gyro magnitude pair into the window.
    ///
    /// Returns [`WindowStatus::WindowReady`] on the push that completes the
    /// window. The write index rewinds to zero at that point, so the next
    /// push starts the following window.
    pub fn push(&mut self, accel_mag: f32, gyro_mag: f32) -> WindowStatus {
        let fused = self.fusion_alpha * accel_mag + (1.0 - self.fusion_alpha) * gyro_mag;
        self.samples[self.idx] = fused;
        self.idx += 1;
        if self.idx >= self.window_samples {
            self.idx = 0;
            WindowStatus::WindowReady
        } else {
            WindowStatus::Accumulating
        }
    }

    /// The most recent full window of fused samples.
    ///
    /// Valid immediately after [`WindowStatus::WindowReady`]; earlier slots
    /// hold data from the previous window (or zeros before the first one).
    #[inline]
    #[must_use]
    pub fn window(&self) -> &[f32] {
        &self.samples[..self.window_samples]
    }

    /// Samples accumulated toward the next window.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.idx
    }

    /// True when no samples have accumulated since the last completion.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.idx == 0
    }

    /// Clear all samples and rewind.
    pub fn reset(&mut self) {
        self.samples = [0.0; constants::FFT_SIZE];
        self.idx = 0;
    }
}

// ============================================================================
// Tests
// ============================================================================
