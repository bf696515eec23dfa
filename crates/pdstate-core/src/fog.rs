//! Freezing-of-gait detection
//!
//! FOG is a sequence pattern, not a band signature: the wearer was walking
//! recently and then the signal goes still for consecutive windows. The
//! detector keeps a sticky "walked recently" latch that only the classifier
//! sets and only a fired event clears.

/// Debounced walking-then-frozen detector.
///
/// Evaluated once per completed window. A single stationary window after
/// gait is usually just a pause; the debounce requires the stillness to
/// persist before an event fires.
#[derive(Copy, Clone, Debug)]
pub struct FogDetector {
    debounce_windows: u8,
    had_steps: bool,
    stationary_streak: u8,
}

impl FogDetector {
    /// Create a detector that fires after `debounce_windows` consecutive
    /// stationary windows following gait.
    #[inline]
    #[must_use]
    pub const fn new(debounce_windows: u8) -> Self {
        Self {
            debounce_windows,
            had_steps: false,
            stationary_streak: 0,
        }
    }

    /// Latch that gait was seen. Called by the classifier whenever the gait
    /// band crosses threshold; only [`FogDetector::observe_window`] clears
    /// the latch, and only when an event fires.
    #[inline]
    pub fn note_gait(&mut self) {
        self.had_steps = true;
    }

    /// Fold in one completed window's stationarity verdict.
    ///
    /// Returns true exactly on the window where a FOG event fires. A moving
    /// window resets the stationary streak but leaves the gait latch set, so
    /// a later freeze can still be caught.
    pub fn observe_window(&mut self, stationary: bool) -> bool {
        if !self.had_steps {
            return false;
        }
        if stationary {
            self.stationary_streak += 1;
            if self.stationary_streak >= self.debounce_windows {
                self.had_steps = false;
                self.stationary_streak = 0;
                return true;
            }
        } else {
            self.stationary_streak = 0;
        }
        false
    }

    /// Whether the gait latch is currently set.
    #[inline]
    #[must_use]
    pub const fn had_recent_gait(&self) -> bool {
        self.had_steps
    }

    /// Consecutive stationary windows observed since gait.
    #[inline]
    #[must_use]
    pub const fn stationary_streak(&self) -> u8 {
        self.stationary_streak
    }

    /// Clear the latch and streak.
    pub fn reset(&mut self) {
        self.had_steps = false;
        self.stationary_streak = 0;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FogDetector {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Fog(gait:{} streak:{}/{})",
            self.had_steps,
            self.stationary_streak,
            self.debounce_windows
        );
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_on_second_stationary_window_after_gait() {
        let mut fog = FogDetector::new(2);
        fog.note_gait();
        assert!(!fog.observe_window(true));
        assert!(fog.observe_window(true));
    }

    #[test]
    fn test_no_event_without_gait() {
        let mut fog = FogDetector::new(2);
        for _ in 0..10 {
            assert!(!fog.observe_window(true));
        }
        assert_eq!(fog.stationary_streak(), 0);
    }

    #[test]
    fn test_movement_resets_streak_but_not_latch() {
        let mut fog = FogDetector::new(2);
        fog.note_gait();
        assert!(!fog.observe_window(true));
        assert!(!fog.observe_window(false));
        assert!(fog.had_recent_gait());

        // The freeze that follows still fires
        assert!(!fog.observe_window(true));
        assert!(fog.observe_window(true));
    }

    #[test]
    fn test_event_clears_latch() {
        let mut fog = FogDetector::new(2);
        fog.note_gait();
        fog.observe_window(true);
        assert!(fog.observe_window(true));
        assert!(!fog.had_recent_gait());

        // No second event without new gait
        assert!(!fog.observe_window(true));
        assert!(!fog.observe_window(true));
    }

    #[test]
    fn test_gait_during_streak_keeps_latch() {
        let mut fog = FogDetector::new(3);
        fog.note_gait();
        assert!(!fog.observe_window(true));
        fog.note_gait();
        assert!(!fog.observe_window(true));
        assert!(fog.observe_window(true));
    }

    #[test]
    fn test_reset() {
        let mut fog = FogDetector::new(2);
        fog.note_gait();
        fog.observe_window(true);
        fog.reset();
        assert!(!fog.had_recent_gait());
        assert!(!fog.observe_window(true));
    }
}
