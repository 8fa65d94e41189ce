//! Landmark fixtures shared by the integration tests.
#![allow(dead_code)]

use vigil_core::{Engine, EventLog, SessionId};
use vigil_detectors::{BoundingBox, ObjectDetection};
use vigil_signals::{FaceDetection, Point};

pub const SEC: i64 = 1_000_000;
pub const MS: i64 = 1_000;

/// Mouth outline with the corners at 0/6 and the lips at 3/9.
fn mouth(gap: f32) -> Vec<Point> {
    let mut pts: Vec<Point> = (0..20).map(|i| [50.0 + i as f32, 80.0]).collect();
    pts[0] = [50.0, 80.0];
    pts[6] = [70.0, 80.0];
    pts[3] = [60.0, 80.0 - gap / 2.0];
    pts[9] = [60.0, 80.0 + gap / 2.0];
    pts
}

/// Face with eye centres at (42, 50) / (78, 50); the nose tip sits
/// `nose_dx` to the side of the eye midpoint.
fn face_with(nose_dx: f32, mouth_gap: f32) -> FaceDetection {
    FaceDetection {
        left_eye: vec![[40.0, 50.0], [44.0, 50.0]],
        right_eye: vec![[76.0, 50.0], [80.0, 50.0]],
        nose: vec![
            [60.0, 52.0],
            [60.0, 54.0],
            [60.0 + nose_dx, 56.0],
            [60.0 + nose_dx, 58.0],
        ],
        mouth: mouth(mouth_gap),
    }
}

pub fn frontal_face() -> FaceDetection {
    face_with(0.0, 2.0)
}

pub fn away_face() -> FaceDetection {
    face_with(20.0, 2.0)
}

pub fn talking_face() -> FaceDetection {
    face_with(0.0, 16.0)
}

pub fn object(label: &str, confidence: f32) -> ObjectDetection {
    ObjectDetection {
        class_label: label.to_string(),
        confidence,
        bbox: BoundingBox {
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 40.0,
        },
    }
}

pub fn started_engine(start_us: i64) -> (Engine<EventLog>, EventLog) {
    let log = EventLog::new();
    let mut engine = Engine::with_default_config(log.clone());
    engine.start(SessionId::new(), start_us);
    (engine, log)
}
