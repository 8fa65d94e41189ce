//! Face landmark groups
//!
//! A face detection carries four point groups: left eye, right eye, nose
//! ridge and mouth outline. Detectors that emit the common 68-point layout
//! can be converted with [`FaceDetection::from_points68`].

use serde::{Deserialize, Serialize};

use crate::geometry::{centroid, distance, midpoint, Point};

/// 68-point face layout index ranges
pub mod layout68 {
    use std::ops::Range;

    pub const NOSE: Range<usize> = 27..36;
    pub const LEFT_EYE: Range<usize> = 36..42;
    pub const RIGHT_EYE: Range<usize> = 42..48;
    pub const MOUTH: Range<usize> = 48..68;
    pub const POINT_COUNT: usize = 68;
}

/// Landmarks of one detected face.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceDetection {
    pub left_eye: Vec<Point>,
    pub right_eye: Vec<Point>,
    /// Nose ridge, top to tip
    pub nose: Vec<Point>,
    /// Outer mouth outline starting at the left corner
    pub mouth: Vec<Point>,
}

impl FaceDetection {
    /// Split a flat 68-point landmark set into its groups.
    pub fn from_points68(points: &[Point]) -> Option<Self> {
        if points.len() < layout68::POINT_COUNT {
            return None;
        }
        Some(Self {
            left_eye: points[layout68::LEFT_EYE].to_vec(),
            right_eye: points[layout68::RIGHT_EYE].to_vec(),
            nose: points[layout68::NOSE].to_vec(),
            mouth: points[layout68::MOUTH].to_vec(),
        })
    }

    /// Left and right eye centroids, if both eyes have points.
    pub fn eye_centers(&self) -> Option<(Point, Point)> {
        Some((centroid(&self.left_eye)?, centroid(&self.right_eye)?))
    }

    pub fn eye_midpoint(&self) -> Option<Point> {
        self.eye_centers().map(|(l, r)| midpoint(l, r))
    }

    /// Raw inter-pupil distance; callers apply their own zero guard.
    pub fn inter_pupil_distance(&self) -> Option<f32> {
        self.eye_centers().map(|(l, r)| distance(l, r))
    }

    /// Uniformly scale every point about the origin.
    pub fn scaled(&self, factor: f32) -> Self {
        let scale = |pts: &[Point]| -> Vec<Point> {
            pts.iter().map(|p| [p[0] * factor, p[1] * factor]).collect()
        };
        Self {
            left_eye: scale(&self.left_eye),
            right_eye: scale(&self.right_eye),
            nose: scale(&self.nose),
            mouth: scale(&self.mouth),
        }
    }
}
