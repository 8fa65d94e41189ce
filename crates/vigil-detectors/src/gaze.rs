//! Gaze Classification
//!
//! Decides "looking away" from one face's landmarks:
//! - Eye midpoint from the left/right eye centroids
//! - Nose tip approximated by the centroid of the lower half of the nose ridge
//! - Nose offset from the eye midpoint, normalized by inter-pupil distance
//!
//! The normalization makes the decision independent of distance from the
//! camera and of frame resolution.

use serde::{Deserialize, Serialize};
use vigil_signals::{centroid, distance, midpoint, non_zero_or_one, FaceDetection};

/// Gaze classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Maximum horizontal nose deviation (in inter-pupil units) still on screen
    pub horizontal_threshold: f32,
    /// Maximum vertical nose deviation (in inter-pupil units) still on screen
    pub vertical_threshold: f32,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            horizontal_threshold: 0.35,
            vertical_threshold: 0.45,
        }
    }
}

/// Result of classifying one face
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GazeReading {
    /// |nose.x - eye_mid.x| / inter-pupil distance
    pub horizontal_deviation: f32,
    /// |nose.y - eye_mid.y| / inter-pupil distance
    pub vertical_deviation: f32,
    pub looking_away: bool,
}

/// Gaze Classifier
#[derive(Debug, Clone, Default)]
pub struct GazeClassifier {
    config: GazeConfig,
}

impl GazeClassifier {
    pub fn new() -> Self {
        Self::with_config(GazeConfig::default())
    }

    pub fn with_config(config: GazeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GazeConfig {
        &self.config
    }

    /// Classify one face. Missing eye or nose points read as "not away".
    pub fn classify(&self, face: &FaceDetection) -> GazeReading {
        let Some((left, right)) = face.eye_centers() else {
            return GazeReading::default();
        };
        let Some(nose_tip) = centroid(&face.nose[face.nose.len() / 2..]) else {
            return GazeReading::default();
        };

        let eye_mid = midpoint(left, right);
        let ipd = non_zero_or_one(distance(left, right));

        let horizontal_deviation = (nose_tip[0] - eye_mid[0]).abs() / ipd;
        let vertical_deviation = (nose_tip[1] - eye_mid[1]).abs() / ipd;

        GazeReading {
            horizontal_deviation,
            vertical_deviation,
            looking_away: horizontal_deviation > self.config.horizontal_threshold
                || vertical_deviation > self.config.vertical_threshold,
        }
    }

    pub fn is_looking_away(&self, face: &FaceDetection) -> bool {
        self.classify(face).looking_away
    }
}
