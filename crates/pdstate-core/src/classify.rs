//! Band-ratio symptom classification
//!
//! Each symptom band's energy is compared against the total motion energy
//! between 0.5 and 10 Hz. Ratios make the flags insensitive to overall
//! movement amplitude: vigorous walking and faint tremor both classify on
//! the shape of the spectrum, not its scale.

use serde::{Deserialize, Serialize};

use crate::config::{BandPlan, PipelineConfig};
use crate::fog::FogDetector;
use crate::spectrum::MagnitudeSpectrum;
use crate::types::SymptomFlags;

/// Band energies normalized by total energy, kept for diagnostics.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BandRatios {
    /// Tremor band energy over total
    pub tremor: f32,
    /// Dyskinesia band energy over total
    pub dyskinesia: f32,
    /// Gait band energy over total
    pub gait: f32,
    /// Raw total energy in the reference band
    pub total_energy: f32,
}

#[cfg(feature = "defmt")]
impl defmt::Format for BandRatios {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "ratios t:{} d:{} g:{} (total {})",
            self.tremor,
            self.dyskinesia,
            self.gait,
            self.total_energy
        );
    }
}

/// Threshold classifier over a magnitude spectrum.
#[derive(Copy, Clone, Debug)]
pub struct SymptomClassifier {
    bands: BandPlan,
    tremor_ratio: f32,
    dyskinesia_ratio: f32,
    gait_ratio: f32,
}

impl SymptomClassifier {
    /// Build a classifier from the pipeline configuration.
    #[inline]
    #[must_use]
    pub const fn new(config: &PipelineConfig) -> Self {
        Self {
            bands: config.bands,
            tremor_ratio: config.tremor_ratio,
            dyskinesia_ratio: config.dyskinesia_ratio,
            gait_ratio: config.gait_ratio,
        }
    }

    /// Band plan in use.
    #[inline]
    #[must_use]
    pub const fn bands(&self) -> BandPlan {
        self.bands
    }

    /// Compute normalized band ratios.
    ///
    /// When the reference band carries no energy (an all-zero or rejected
    /// spectrum) every ratio is zero, which in turn keeps every flag clear.
    #[must_use]
    pub fn ratios(&self, spectrum: &MagnitudeSpectrum) -> BandRatios {
        let total = spectrum.band_energy(self.bands.total);
        if total <= 0.0 {
            return BandRatios { total_energy: total, ..BandRatios::default() };
        }
        BandRatios {
            tremor: spectrum.band_energy(self.bands.tremor) / total,
            dyskinesia: spectrum.band_energy(self.bands.dyskinesia) / total,
            gait: spectrum.band_energy(self.bands.gait) / total,
            total_energy: total,
        }
    }

    /// Classify one window's spectrum and update the FOG gait latch.
    ///
    /// Thresholds are strict: a ratio exactly at its threshold does not set
    /// the flag. A gait detection latches [`FogDetector::note_gait`]; this is
    /// the only place the latch is set.
    pub fn classify(&self, spectrum: &MagnitudeSpectrum, fog: &mut FogDetector) -> SymptomFlags {
        let ratios = self.ratios(spectrum);
        let flags = SymptomFlags {
            tremor: ratios.tremor > self.tremor_ratio,
            dyskinesia: ratios.dyskinesia > self.dyskinesia_ratio,
            gait: ratios.gait > self.gait_ratio,
        };
        if flags.gait {
            fog.note_gait();
        }
        flags
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FreqBand;

    const BIN_WIDTH: f32 = 52.0 / 256.0;

    fn spectrum_with(bins: &[(usize, f32)]) -> MagnitudeSpectrum {
        let mut spectrum = MagnitudeSpectrum::new(BIN_WIDTH);
        for &(i, v) in bins {
            spectrum.bins_mut()[i] = v;
        }
        spectrum
    }

    fn classifier() -> SymptomClassifier {
        SymptomClassifier::new(&PipelineConfig::default())
    }

    #[test]
    fn test_tremor_energy_sets_tremor_flag() {
        // Bin 20 sits at 4.06 Hz, inside the 3-5 Hz tremor band
        let spectrum = spectrum_with(&[(20, 10.0), (40, 1.0)]);
        let mut fog = FogDetector::new(2);
        let flags = classifier().classify(&spectrum, &mut fog);
        assert!(flags.tremor);
        assert!(!flags.dyskinesia);
        assert!(!flags.gait);
        assert!(!fog.had_recent_gait());
    }

    #[test]
    fn test_dyskinesia_band_is_five_to_seven_hz() {
        // Bin 30 sits at 6.09 Hz
        let spectrum = spectrum_with(&[(30, 10.0), (40, 1.0)]);
        let mut fog = FogDetector::new(2);
        let flags = classifier().classify(&spectrum, &mut fog);
        assert!(flags.dyskinesia);
        assert!(!flags.tremor);
    }

    #[test]
    fn test_gait_detection_latches_fog() {
        // Bin 8 sits at 1.63 Hz, inside the 1-2.5 Hz gait band
        let spectrum = spectrum_with(&[(8, 10.0)]);
        let mut fog = FogDetector::new(2);
        let flags = classifier().classify(&spectrum, &mut fog);
        assert!(flags.gait);
        assert!(fog.had_recent_gait());
    }

    #[test]
    fn test_zero_spectrum_clears_everything() {
        let spectrum = MagnitudeSpectrum::new(BIN_WIDTH);
        let mut fog = FogDetector::new(2);
        let ratios = classifier().ratios(&spectrum);
        assert!((ratios.total_energy - 0.0).abs() < 1e-9);
        assert!((ratios.tremor - 0.0).abs() < 1e-9);

        let flags = classifier().classify(&spectrum, &mut fog);
        assert_eq!(flags, SymptomFlags::NONE);
        assert!(!fog.had_recent_gait());
    }

    #[test]
    fn test_threshold_is_strict() {
        // Gait bin 5 carries 2.0 of a 10.0 total: ratio exactly 0.2
        let spectrum = spectrum_with(&[(5, 2.0), (40, 8.0)]);
        let mut fog = FogDetector::new(2);
        let flags = classifier().classify(&spectrum, &mut fog);
        assert!(!flags.gait);
        assert!(!fog.had_recent_gait());

        // Push it just over
        let spectrum = spectrum_with(&[(5, 2.1), (40, 8.0)]);
        let flags = classifier().classify(&spectrum, &mut fog);
        assert!(flags.gait);
        assert!(fog.had_recent_gait());
    }

    #[test]
    fn test_alternate_band_plan_moves_tremor_band() {
        let config = PipelineConfig { bands: BandPlan::ALTERNATE, ..PipelineConfig::default() };
        let classifier = SymptomClassifier::new(&config);
        // Bin 12 sits at 2.44 Hz: tremor under the alternate plan, gait
        // under the standard plan
        let spectrum = spectrum_with(&[(12, 10.0), (40, 1.0)]);
        let mut fog = FogDetector::new(2);
        let flags = classifier.classify(&spectrum, &mut fog);
        assert!(flags.tremor);
        assert!(!flags.gait);
    }

    #[test]
    fn test_ratios_sum_against_total_band() {
        let spectrum = spectrum_with(&[(20, 3.0), (30, 3.0), (8, 4.0)]);
        let ratios = classifier().ratios(&spectrum);
        assert!((ratios.total_energy - 10.0).abs() < 1e-6);
        assert!((ratios.tremor - 0.3).abs() < 1e-6);
        assert!((ratios.dyskinesia - 0.3).abs() < 1e-6);
        assert!((ratios.gait - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_band_overlap_at_five_hz() {
        // Bin 24 (4.875 Hz) is the shared inclusive edge of the tremor and
        // dyskinesia bands under the standard plan
        let spectrum = spectrum_with(&[(24, 10.0)]);
        let bands = classifier().bands();
        assert!((spectrum.band_energy(bands.tremor) - 10.0).abs() < 1e-6);
        assert!((spectrum.band_energy(bands.dyskinesia) - 10.0).abs() < 1e-6);
        assert!((spectrum.band_energy(FreqBand::new(3.0, 4.8)) - 0.0).abs() < 1e-9);
    }
}
