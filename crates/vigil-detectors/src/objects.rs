//! Suspicious object filter
//!
//! The object detector reports labeled boxes; only a small set of classes
//! (phones, books, laptops) matters for exam integrity.

use serde::{Deserialize, Serialize};

/// Axis-aligned box `(x, y, width, height)`, serialized as a 4-element array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl From<[f32; 4]> for BoundingBox {
    fn from([x, y, width, height]: [f32; 4]) -> Self {
        Self { x, y, width, height }
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x, b.y, b.width, b.height]
    }
}

/// One labeled detection from the object detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDetection {
    #[serde(alias = "class")]
    pub class_label: String,
    /// Detector confidence in [0, 1]
    #[serde(alias = "score")]
    pub confidence: f32,
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectFilterConfig {
    /// Lower-case class labels treated as suspicious
    pub labels: Vec<String>,
    /// Detections at or below this confidence are ignored
    pub min_confidence: f32,
}

impl Default for ObjectFilterConfig {
    fn default() -> Self {
        Self {
            labels: ["cell phone", "book", "laptop", "phone"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_confidence: 0.5,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SuspiciousObjectFilter {
    config: ObjectFilterConfig,
}

impl SuspiciousObjectFilter {
    pub fn new(config: ObjectFilterConfig) -> Self {
        Self { config }
    }

    /// Normalized label if the detection is a suspicious object.
    pub fn classify(&self, det: &ObjectDetection) -> Option<String> {
        if det.confidence.is_nan() || det.confidence <= self.config.min_confidence {
            return None;
        }
        let label = det.class_label.trim().to_lowercase();
        self.config
            .labels
            .iter()
            .any(|l| *l == label)
            .then_some(label)
    }

    /// Every suspicious detection of a tick, in detector order.
    pub fn suspicious<'a>(
        &'a self,
        detections: &'a [ObjectDetection],
    ) -> impl Iterator<Item = (String, BoundingBox)> + 'a {
        detections
            .iter()
            .filter_map(move |d| self.classify(d).map(|label| (label, d.bbox)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(label: &str, confidence: f32) -> ObjectDetection {
        ObjectDetection {
            class_label: label.to_string(),
            confidence,
            bbox: BoundingBox::from([1.0, 2.0, 3.0, 4.0]),
        }
    }

    #[test]
    fn test_label_matching_is_case_insensitive() {
        let filter = SuspiciousObjectFilter::default();
        assert_eq!(filter.classify(&det("Cell Phone", 0.9)), Some("cell phone".to_string()));
        assert_eq!(filter.classify(&det("BOOK", 0.9)), Some("book".to_string()));
        assert_eq!(filter.classify(&det("cup", 0.9)), None);
    }

    #[test]
    fn test_low_confidence_rejected() {
        let filter = SuspiciousObjectFilter::default();
        assert_eq!(filter.classify(&det("laptop", 0.5)), None);
        assert_eq!(filter.classify(&det("laptop", f32::NAN)), None);
        assert!(filter.classify(&det("laptop", 0.51)).is_some());
    }

    #[test]
    fn test_every_detection_reported() {
        let filter = SuspiciousObjectFilter::default();
        let dets = vec![det("phone", 0.8), det("person", 0.99), det("phone", 0.7)];
        let hits: Vec<_> = filter.suspicious(&dets).collect();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].1, BoundingBox { x: 1.0, y: 2.0, width: 3.0, height: 4.0 });
    }
}
