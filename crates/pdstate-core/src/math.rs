//! Smoothing filters and window statistics
//!
//! All filters run per tick on the device, so everything here is allocation
//! free and `f32`.

use crate::types::Vec3;

// ============================================================================
// Exponential Moving Average
// ============================================================================

/// Single-channel exponential moving average low-pass.
///
/// `y[n] = alpha * x[n] + (1 - alpha) * y[n-1]`, with `y` starting at zero.
/// The zero start means the first few outputs ramp up from rest; the window
/// is long enough that this settles well before the first classification.
#[derive(Copy, Clone, Debug)]
pub struct EmaFilter {
    alpha: f32,
    state: f32,
}

impl EmaFilter {
    /// Create a filter with the given coefficient in (0, 1].
    #[inline]
    #[must_use]
    pub const fn new(alpha: f32) -> Self {
        Self { alpha, state: 0.0 }
    }

    /// Feed one sample and return the smoothed value.
    #[inline]
    pub fn filter(&mut self, input: f32) -> f32 {
        self.state = self.alpha * input + (1.0 - self.alpha) * self.state;
        self.state
    }

    /// Last output without advancing the filter.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.state
    }

    /// Reset state to zero.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}

/// Per-axis EMA over a 3-vector, used to low-pass raw acceleration before
/// the magnitude is taken.
#[derive(Copy, Clone, Debug)]
pub struct VectorEma {
    x: EmaFilter,
    y: EmaFilter,
    z: EmaFilter,
}

impl VectorEma {
    /// Create three identical axis filters.
    #[inline]
    #[must_use]
    pub const fn new(alpha: f32) -> Self {
        Self {
            x: EmaFilter::new(alpha),
            y: EmaFilter::new(alpha),
            z: EmaFilter::new(alpha),
        }
    }

    /// Feed one vector sample and return the smoothed vector.
    #[inline]
    pub fn filter(&mut self, input: Vec3) -> Vec3 {
        Vec3 {
            x: self.x.filter(input.x),
            y: self.y.filter(input.y),
            z: self.z.filter(input.z),
        }
    }

    /// Reset all axes to zero.
    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.z.reset();
    }
}

// ============================================================================
// Moving Average
// ============================================================================

/// Fixed-length moving average over the last `N` samples.
///
/// Reports the mean over however many samples have arrived until the ring
/// fills. Not part of the deployed tick path (the EMA replaced it there) but
/// still used for offline smoothing comparisons.
#[derive(Clone, Debug)]
pub struct MovingAverage<const N: usize> {
    buf: [f32; N],
    idx: usize,
    len: usize,
    sum: f32,
}

impl<const N: usize> MovingAverage<N> {
    /// Create an empty averager.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: [0.0; N], idx: 0, len: 0, sum: 0.0 }
    }

    /// Feed one sample and return the current mean.
    #[allow(clippy::cast_precision_loss)]
    pub fn filter(&mut self, input: f32) -> f32 {
        self.sum -= self.buf[self.idx];
        self.buf[self.idx] = input;
        self.sum += input;
        self.idx = (self.idx + 1) % N;
        if self.len < N {
            self.len += 1;
        }
        self.sum / self.len as f32
    }

    /// Number of samples currently contributing to the mean.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True until the first sample arrives.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reset to empty.
    pub fn reset(&mut self) {
        self.buf = [0.0; N];
        self.idx = 0;
        self.len = 0;
        self.sum = 0.0;
    }
}

impl<const N: usize> Default for MovingAverage<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Window Statistics
// ============================================================================

/// Arithmetic mean of a slice. Returns 0 for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().sum();
    sum / samples.len() as f32
}

/// Population (biased) variance of a slice. Returns 0 for an empty slice.
///
/// The stationarity threshold was tuned against this definition, so the
/// divisor is `N`, not `N - 1`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn variance(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let mu = mean(samples);
    let sum_sq: f32 = samples.iter().map(|&x| (x - mu) * (x - mu)).sum();
    sum_sq / samples.len() as f32
}

/// Stationarity gate: true when the variance of the window falls below the
/// threshold. Strictly-below, so a window sitting exactly at the threshold
/// still counts as moving.
#[inline]
#[must_use]
pub fn is_stationary(samples: &[f32], variance_threshold: f32) -> bool {
    variance(samples) < variance_threshold
}

// ============================================================================
// Tests
// ============================================================================
