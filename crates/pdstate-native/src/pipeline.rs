//! End-to-end motion classification pipeline
//!
//! Mirrors the firmware tick loop: smooth the accelerometer, fuse the
//! magnitudes into the window, and on each completed window gate on
//! stationarity, run the FFT band analysis, fold the verdict into the FOG
//! detector, and publish one status update. Publish failures are logged and
//! dropped so a flaky link never stalls classification.

use thiserror::Error;
use tracing::{debug, warn};

use pdstate_core::classify::{BandRatios, SymptomClassifier};
use pdstate_core::config::PipelineConfig;
use pdstate_core::error::ConfigError;
use pdstate_core::fog::FogDetector;
use pdstate_core::math::{is_stationary, VectorEma};
use pdstate_core::transport::StatusTransport;
use pdstate_core::types::{MotionSample, MotionState, StatusUpdate, SymptomFlags};
use pdstate_core::window::{FusionWindow, WindowStatus};

use crate::processing::fft::SpectralAnalyzer;

/// Pipeline construction errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration rejected by validation
    #[error("invalid pipeline configuration: {0}")]
    Config(ConfigError),
}

/// Everything one completed window produced, for logs and offline tools.
/// The published [`StatusUpdate`] is derived from this.
#[derive(Copy, Clone, Debug)]
pub struct WindowReport {
    /// Completed-window counter, starting at 0
    pub index: u64,
    /// Stationarity gate verdict for this window
    pub stationary: bool,
    /// Per-band threshold flags (all clear on stationary windows)
    pub flags: SymptomFlags,
    /// Normalized band energies (zeros on stationary windows)
    pub ratios: BandRatios,
    /// Whether the FOG debounce fired on this window
    pub fog_event: bool,
    /// Encoded state that was published
    pub state: MotionState,
}

impl WindowReport {
    /// The update this report was published as.
    #[must_use]
    pub const fn update(&self) -> StatusUpdate {
        StatusUpdate {
            state: self.state,
            tremor: self.flags.tremor,
            dyskinesia: self.flags.dyskinesia,
            fog: self.fog_event,
        }
    }
}

/// Tick-driven classification pipeline over a status transport.
pub struct MotionPipeline<T: StatusTransport> {
    config: PipelineConfig,
    filter: VectorEma,
    window: FusionWindow,
    analyzer: SpectralAnalyzer,
    classifier: SymptomClassifier,
    fog: FogDetector,
    transport: T,
    windows_completed: u64,
}

impl<T: StatusTransport> MotionPipeline<T> {
    /// Build a pipeline from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] when the configuration fails
    /// validation.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(config: PipelineConfig, transport: T) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;
        Ok(Self {
            filter: VectorEma::new(config.lowpass_alpha),
            window: FusionWindow::new(config.window_samples, config.fusion_alpha),
            analyzer: SpectralAnalyzer::new(config.fft_size, config.sample_rate_hz as f32),
            classifier: SymptomClassifier::new(&config),
            fog: FogDetector::new(config.fog_debounce_windows),
            transport,
            windows_completed: 0,
            config,
        })
    }

    /// Feed one tick's accel/gyro sample.
    ///
    /// Returns a report on the tick that completes a window and leads to a
    /// published update; `None` otherwise. The transport is serviced on
    /// every tick either way.
    pub fn process_sample(&mut self, sample: MotionSample) -> Option<WindowReport> {
        let smoothed = self.filter.filter(sample.accel);
        let accel_mag = smoothed.magnitude();
        let gyro_mag = sample.gyro.magnitude();

        let report = match self.window.push(accel_mag, gyro_mag) {
            WindowStatus::Accumulating => None,
            WindowStatus::WindowReady => {
                let mut fused = [0.0_f32; FusionWindow::CAPACITY];
                let view = self.window.window();
                let len = view.len();
                fused[..len].copy_from_slice(view);
                self.process_window(&fused[..len])
            }
        };

        self.transport.service();
        report
    }

    /// Classify one complete fused window and publish the result.
    ///
    /// This is the per-window half of [`MotionPipeline::process_sample`],
    /// exposed so prerecorded fused traces can be replayed window by window.
    /// An empty window is a no-op: nothing is classified or published.
    pub fn process_window(&mut self, fused: &[f32]) -> Option<WindowReport> {
        if fused.is_empty() {
            warn!("empty fused window, skipping");
            return None;
        }

        let index = self.windows_completed;
        self.windows_completed += 1;

        let stationary = is_stationary(fused, self.config.stationary_variance);
        let (flags, ratios) = if stationary {
            // No spectral analysis on still windows; only FOG can fire
            (SymptomFlags::NONE, BandRatios::default())
        } else {
            match self.analyzer.analyze(fused) {
                Ok(spectrum) => {
                    let ratios = self.classifier.ratios(&spectrum);
                    let flags = self.classifier.classify(&spectrum, &mut self.fog);
                    (flags, ratios)
                }
                Err(err) => {
                    // No valid spectrum means no flag updates and nothing
                    // published, but the FOG streak still observes movement
                    warn!(window = index, "spectrum rejected: {err}");
                    self.fog.observe_window(false);
                    return None;
                }
            }
        };

        let fog_event = self.fog.observe_window(stationary);
        let state = MotionState::encode(flags.tremor, flags.dyskinesia, fog_event);
        let report = WindowReport { index, stationary, flags, ratios, fog_event, state };

        debug!(
            window = index,
            state = state.name(),
            stationary,
            tremor = flags.tremor,
            dyskinesia = flags.dyskinesia,
            gait = flags.gait,
            fog = fog_event,
            "window classified"
        );

        if self.transport.publish(&report.update()).is_err() {
            warn!(window = index, "status publish failed, continuing");
        }
        Some(report)
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Completed windows since construction.
    #[must_use]
    pub const fn windows_completed(&self) -> u64 {
        self.windows_completed
    }

    /// Whether the FOG detector currently holds a gait latch.
    #[must_use]
    pub const fn gait_latched(&self) -> bool {
        self.fog.had_recent_gait()
    }

    /// Borrow the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Tear down and recover the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }
}

// ============================================================================
// Tests
// ============================================================================
