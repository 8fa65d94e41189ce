//! Pull-side collaborators polled once per tick.
//!
//! Implementations wrap capture devices and detection models. Errors are
//! reported, never retried; the runner treats a failed pull as "nothing
//! this tick".

use async_trait::async_trait;
use thiserror::Error;

use vigil_detectors::ObjectDetection;
use vigil_signals::{AudioFrame, FaceDetection};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("model not loaded: {0}")]
    ModelUnavailable(String),
    #[error("capture device error: {0}")]
    Device(String),
    #[error("source exhausted")]
    Exhausted,
}

#[async_trait]
pub trait VisionSource: Send {
    async fn face_detections(&mut self) -> Result<Vec<FaceDetection>, SourceError>;

    async fn object_detections(&mut self) -> Result<Vec<ObjectDetection>, SourceError>;
}

#[async_trait]
pub trait AudioSource: Send {
    /// `Ok(None)` when no buffer is ready yet.
    async fn audio_frame(&mut self) -> Result<Option<AudioFrame>, SourceError>;
}
