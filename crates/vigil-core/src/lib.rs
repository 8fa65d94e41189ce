//! Vigil core: proctoring event fusion, integrity scoring and the
//! per-session runtime.
//!
//! Detectors and signal primitives live in `vigil-detectors` and
//! `vigil-signals`; this crate wires them into one engine per session,
//! hands emitted records to an [`EventSink`] and turns a session's events
//! into a [`Report`].

pub mod config;
pub mod debounce;
pub mod domain;
pub mod engine;
pub mod replay;
pub mod report;
pub mod scoring;
pub mod session;
pub mod sink;
pub mod source;
pub mod timestamp;

#[cfg(test)]
pub mod tests_config;
#[cfg(test)]
pub mod tests_proptest;

use thiserror::Error;

// Domain
pub use domain::{
    audio_labels, dt_us, ms_to_us, wall_clock_us, BoundingBox, EventKind, EventRecord, SessionId,
};

// Configuration
pub use config::{AudioConfig, ConfigError, VigilConfig, VisionConfig};

// Engine
pub use debounce::{Cooldown, Debounce, HoldTimer};
pub use engine::{Engine, EngineState, Tick};
pub use timestamp::{TickError, TickLog, TickStream};

// Scoring and reporting
pub use report::{Report, SessionMeta, SessionStatus};
pub use scoring::{in_window, integrity_score, score, MAX_SCORE};

// Collaborator seams
pub use sink::{ChannelSink, EventLog, EventSink, SinkError};
pub use source::{AudioSource, SourceError, VisionSource};

// Runtime
pub use replay::{replay, ReplayOutcome, ScriptTick, TickScript};
pub use session::{
    SessionClock, SessionError, SessionHandle, SessionRegistry, SessionRunner, TokioClock,
    WallClock,
};

/// Result type for fallible core operations
pub type VigilResult<T> = Result<T, VigilError>;

/// Any error surfaced by the core crate
#[derive(Debug, Error)]
pub enum VigilError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
