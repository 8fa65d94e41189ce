//! Mouth openness
//!
//! Ratio of vertical to horizontal mouth aperture on the outer lip outline,
//! both normalized by inter-pupil distance. The audio side uses it to tell
//! the candidate's own speech (mouth open) from background voices.

use serde::{Deserialize, Serialize};
use vigil_signals::{distance, non_zero_or_one, FaceDetection};

/// Mouth outline indices (outer lip, starting at the left corner)
pub mod mouth_indices {
    pub const LEFT_CORNER: usize = 0;
    pub const TOP: usize = 3;
    pub const RIGHT_CORNER: usize = 6;
    pub const BOTTOM: usize = 9;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MouthConfig {
    /// Ratio below which the mouth counts as closed
    pub closed_threshold: f32,
    /// Minimum outline points needed to measure
    pub min_points: usize,
}

impl Default for MouthConfig {
    fn default() -> Self {
        Self {
            closed_threshold: 0.28,
            min_points: 12,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MouthEstimator {
    config: MouthConfig,
}

impl MouthEstimator {
    pub fn new() -> Self {
        Self::with_config(MouthConfig::default())
    }

    pub fn with_config(config: MouthConfig) -> Self {
        Self { config }
    }

    /// Openness ratio of one face, 0 when the outline is too short.
    pub fn openness(&self, face: &FaceDetection) -> f32 {
        let mouth = &face.mouth;
        if mouth.len() < self.config.min_points.max(mouth_indices::BOTTOM + 1) {
            return 0.0;
        }
        let ipd = face
            .inter_pupil_distance()
            .map(non_zero_or_one)
            .unwrap_or(1.0);

        let vertical = distance(mouth[mouth_indices::TOP], mouth[mouth_indices::BOTTOM]) / ipd;
        let horizontal =
            distance(mouth[mouth_indices::LEFT_CORNER], mouth[mouth_indices::RIGHT_CORNER]) / ipd;

        vertical / non_zero_or_one(horizontal)
    }

    /// Openness for a whole tick: only a single visible face is measured.
    pub fn openness_for(&self, faces: &[FaceDetection]) -> f32 {
        match faces {
            [face] => self.openness(face),
            _ => 0.0,
        }
    }

    /// Closed when below threshold or not a finite number.
    pub fn is_closed(&self, ratio: f32) -> bool {
        !ratio.is_finite() || ratio < self.config.closed_threshold
    }
}
