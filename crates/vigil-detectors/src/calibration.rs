//! Audio calibration
//!
//! Two-phase sub-machine: `Calibrating` collects loudness samples until a
//! fixed deadline, then transitions once to `Active` with the median of the
//! collected values as the room baseline. RMS and band dB are collected
//! separately; a measure with no usable samples falls back to its fixed
//! threshold for the rest of the session.

use serde::{Deserialize, Serialize};
use vigil_signals::AudioFeatures;

/// Calibration window and threshold policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Length of the calibration window after session start
    pub window_ms: u64,
    /// RMS threshold used when no baseline exists
    pub fallback_rms: f32,
    /// Band dB threshold used when no baseline exists
    pub fallback_db: f32,
    /// Baseline RMS multiplier
    pub rms_gain: f32,
    pub rms_floor: f32,
    pub rms_ceiling: f32,
    /// Added to the baseline band dB
    pub db_offset: f32,
    /// "Very loud" multiplier applied to the RMS threshold
    pub very_loud_rms_gain: f32,
    pub very_loud_rms_floor: f32,
    /// Subtracted from the dB threshold for "very loud"
    pub very_loud_db_drop: f32,
    pub very_loud_db_floor: f32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            window_ms: 5_000,
            fallback_rms: 0.0016,
            fallback_db: -78.0,
            rms_gain: 1.25,
            rms_floor: 0.0015,
            rms_ceiling: 0.02,
            db_offset: 0.5,
            very_loud_rms_gain: 1.25,
            very_loud_rms_floor: 0.004,
            very_loud_db_drop: 8.0,
            very_loud_db_floor: -68.0,
        }
    }
}

/// Room loudness measured during calibration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioBaseline {
    pub rms: Option<f32>,
    pub db: Option<f32>,
}

/// Thresholds in effect for one audio tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioThresholds {
    pub rms: f32,
    pub db: f32,
    pub very_loud_rms: f32,
    pub very_loud_db: f32,
}

impl AudioThresholds {
    pub fn derive(baseline: Option<&AudioBaseline>, config: &CalibrationConfig) -> Self {
        let rms = baseline
            .and_then(|b| b.rms)
            .map(|r| (r * config.rms_gain).clamp(config.rms_floor, config.rms_ceiling))
            .unwrap_or(config.fallback_rms);
        let db = baseline
            .and_then(|b| b.db)
            .map(|d| d + config.db_offset)
            .unwrap_or(config.fallback_db);
        Self {
            rms,
            db,
            very_loud_rms: (rms * config.very_loud_rms_gain).max(config.very_loud_rms_floor),
            very_loud_db: (db - config.very_loud_db_drop).max(config.very_loud_db_floor),
        }
    }

    /// Above the background-voice threshold on either measure.
    pub fn is_loud(&self, f: &AudioFeatures) -> bool {
        f.rms > self.rms || f.band_db > self.db
    }

    pub fn is_very_loud(&self, f: &AudioFeatures) -> bool {
        f.rms > self.very_loud_rms || f.band_db > self.very_loud_db
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationPhase {
    Calibrating {
        deadline_us: i64,
        rms: Vec<f32>,
        db: Vec<f32>,
    },
    Active {
        baseline: Option<AudioBaseline>,
    },
}

/// Median of a sample set; even counts average the two middle values.
pub fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    })
}

/// Audio Calibrator
#[derive(Debug, Clone)]
pub struct AudioCalibrator {
    config: CalibrationConfig,
    phase: CalibrationPhase,
}

impl AudioCalibrator {
    /// A calibrator that has not been started reads as active with no baseline.
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            phase: CalibrationPhase::Active { baseline: None },
        }
    }

    /// Open a fresh calibration window at `now_us`.
    pub fn start(&mut self, now_us: i64) {
        let window_us = (self.config.window_ms as i64).saturating_mul(1_000);
        self.phase = CalibrationPhase::Calibrating {
            deadline_us: now_us.saturating_add(window_us),
            rms: Vec::new(),
            db: Vec::new(),
        };
    }

    /// Feed one tick. Returns `None` while the sample was absorbed into the
    /// collector, otherwise the thresholds to classify this tick with.
    pub fn observe(&mut self, features: &AudioFeatures, now_us: i64) -> Option<AudioThresholds> {
        if let CalibrationPhase::Calibrating {
            deadline_us,
            rms,
            db,
        } = &mut self.phase
        {
            if now_us < *deadline_us {
                // silent spectra read as -inf; keep them out of the median
                if features.rms.is_finite() {
                    rms.push(features.rms);
                }
                if features.band_db.is_finite() {
                    db.push(features.band_db);
                }
                return None;
            }
        }
        self.advance(now_us)
    }

    /// Tick without a sample (no buffer was delivered). Finishes calibration
    /// once the deadline has passed.
    pub fn advance(&mut self, now_us: i64) -> Option<AudioThresholds> {
        if let CalibrationPhase::Calibrating {
            deadline_us,
            rms,
            db,
        } = &mut self.phase
        {
            if now_us < *deadline_us {
                return None;
            }

            let baseline = match (median(rms), median(db)) {
                (None, None) => None,
                (rms, db) => Some(AudioBaseline { rms, db }),
            };
            match &baseline {
                Some(b) => log::info!(
                    "Audio calibration complete: rms={:?}, band_db={:?}",
                    b.rms,
                    b.db
                ),
                None => log::info!("Audio calibration collected no samples, using fallback thresholds"),
            }
            self.phase = CalibrationPhase::Active { baseline };
        }
        Some(self.thresholds())
    }

    pub fn is_calibrating(&self) -> bool {
        matches!(self.phase, CalibrationPhase::Calibrating { .. })
    }

    pub fn baseline(&self) -> Option<&AudioBaseline> {
        match &self.phase {
            CalibrationPhase::Active { baseline } => baseline.as_ref(),
            CalibrationPhase::Calibrating { .. } => None,
        }
    }

    /// Thresholds implied by the current baseline (fallback when unset).
    pub fn thresholds(&self) -> AudioThresholds {
        AudioThresholds::derive(self.baseline(), &self.config)
    }

    pub fn phase(&self) -> &CalibrationPhase {
        &self.phase
    }
}

impl Default for AudioCalibrator {
    fn default() -> Self {
        Self::new(CalibrationConfig::default())
    }
}
