//! Offline replay of recorded ticks
//!
//! A [`TickScript`] is a JSON document of timestamped vision and audio
//! inputs. Replaying it drives a fresh [`Engine`] exactly as the live
//! runner would, which makes scenarios reproducible without capture
//! hardware.
//!
//! ```json
//! {
//!   "candidateName": "Ada",
//!   "startMs": 0,
//!   "ticks": [
//!     { "kind": "vision", "atMs": 1000, "faces": [], "objects": [] },
//!     { "kind": "audio", "atMs": 1250, "features": { "rms": 0.01, "band_db": -60.0 } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use vigil_detectors::ObjectDetection;
use vigil_signals::{AudioFeatures, AudioFrame, FaceDetection};

use crate::config::VigilConfig;
use crate::domain::{EventRecord, SessionId};
use crate::engine::{Engine, Tick};
use crate::report::{Report, SessionMeta};
use crate::sink::EventLog;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptTick {
    #[serde(rename_all = "camelCase")]
    Vision {
        /// Milliseconds after `startMs`
        at_ms: i64,
        #[serde(default)]
        faces: Vec<FaceDetection>,
        #[serde(default)]
        objects: Vec<ObjectDetection>,
    },
    #[serde(rename_all = "camelCase")]
    Audio {
        at_ms: i64,
        /// Precomputed loudness; takes priority over `frame`
        #[serde(default)]
        features: Option<AudioFeatures>,
        #[serde(default)]
        frame: Option<AudioFrame>,
    },
}

impl ScriptTick {
    pub fn at_ms(&self) -> i64 {
        match self {
            ScriptTick::Vision { at_ms, .. } | ScriptTick::Audio { at_ms, .. } => *at_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickScript {
    #[serde(default = "default_candidate")]
    pub candidate_name: String,
    /// Session start, ms since epoch
    #[serde(default)]
    pub start_ms: i64,
    /// Session end relative to `startMs`; defaults to the last tick
    #[serde(default)]
    pub end_ms: Option<i64>,
    pub ticks: Vec<ScriptTick>,
}

fn default_candidate() -> String {
    "unknown".to_string()
}

/// Events emitted during a replay plus the report over them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayOutcome {
    pub events: Vec<EventRecord>,
    pub report: Report,
}

/// Feed every scripted tick, in time order, through a fresh engine.
pub fn replay(script: &TickScript, config: VigilConfig) -> ReplayOutcome {
    let to_us = |rel_ms: i64| script.start_ms.saturating_add(rel_ms).saturating_mul(1_000);
    let start_us = to_us(0);

    let log = EventLog::new();
    let mut engine = Engine::new(config, log.clone());
    engine.start(SessionId::new(), start_us);

    let mut ticks: Vec<&ScriptTick> = script.ticks.iter().collect();
    ticks.sort_by_key(|t| t.at_ms());

    for tick in &ticks {
        let at_us = to_us(tick.at_ms());
        match tick {
            ScriptTick::Vision { faces, objects, .. } => {
                engine.apply(Tick::Vision {
                    faces: faces.clone(),
                    objects: objects.clone(),
                    at_us,
                });
            }
            ScriptTick::Audio {
                features: Some(features),
                ..
            } => engine.on_audio_features(*features, at_us),
            ScriptTick::Audio { frame, .. } => engine.on_audio_tick(frame.as_ref(), at_us),
        }
    }
    engine.stop();

    let end_rel = script
        .end_ms
        .or_else(|| ticks.last().map(|t| t.at_ms()))
        .unwrap_or(0);
    let meta = SessionMeta {
        candidate_name: script.candidate_name.clone(),
        start_us,
        end_us: Some(to_us(end_rel)),
        video_url: None,
    };
    let events = log.snapshot();
    let report = Report::build(&meta, &events);
    log::info!(
        "Replayed {} ticks: {} events, score {}",
        ticks.len(),
        events.len(),
        report.integrity_score
    );
    ReplayOutcome { events, report }
}
