//! Per-frame classifiers for the vigil proctoring engine
//!
//! # Modules
//! - `gaze`: looking-away classification from eye and nose landmarks
//! - `mouth`: normalized mouth aperture, used to attribute speech
//! - `calibration`: rolling audio baseline and the loudness thresholds it implies
//! - `objects`: suspicious object label filter
//!
//! Every classifier degrades to a safe default on missing or malformed input
//! instead of failing.

pub mod calibration;
pub mod gaze;
pub mod mouth;
pub mod objects;

pub use calibration::{
    median, AudioBaseline, AudioCalibrator, AudioThresholds, CalibrationConfig, CalibrationPhase,
};
pub use gaze::{GazeClassifier, GazeConfig, GazeReading};
pub use mouth::{MouthConfig, MouthEstimator};
pub use objects::{BoundingBox, ObjectDetection, ObjectFilterConfig, SuspiciousObjectFilter};
