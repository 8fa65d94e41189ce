use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub use vigil_detectors::BoundingBox;

// ============================================================================
// TIME HELPERS
// ============================================================================

/// Elapsed microseconds, saturating at 0 when the clock went backwards.
#[inline]
pub fn dt_us(now_us: i64, last_us: i64) -> u64 {
    if now_us >= last_us {
        (now_us - last_us) as u64
    } else {
        0
    }
}

#[inline]
pub fn ms_to_us(ms: u64) -> u64 {
    ms.saturating_mul(1_000)
}

/// Wall-clock microseconds since the Unix epoch (0 if the clock is before it).
pub fn wall_clock_us() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}

// ============================================================================
// SESSION IDENTITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// ============================================================================
// EVENT RECORDS
// ============================================================================

/// Integrity-relevant event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    FocusLost,
    NoFace,
    MultipleFaces,
    SuspiciousItem,
    SuspiciousAudio,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::FocusLost,
        EventKind::NoFace,
        EventKind::MultipleFaces,
        EventKind::SuspiciousItem,
        EventKind::SuspiciousAudio,
    ];

    /// Points taken off the integrity score per occurrence.
    /// Audio events are advisory and never deduct.
    pub const fn deduction(self) -> u32 {
        match self {
            EventKind::FocusLost => 5,
            EventKind::NoFace => 5,
            EventKind::MultipleFaces => 20,
            EventKind::SuspiciousItem => 10,
            EventKind::SuspiciousAudio => 0,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::FocusLost => "FOCUS_LOST",
            EventKind::NoFace => "NO_FACE",
            EventKind::MultipleFaces => "MULTIPLE_FACES",
            EventKind::SuspiciousItem => "SUSPICIOUS_ITEM",
            EventKind::SuspiciousAudio => "SUSPICIOUS_AUDIO",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-kind labels carried by `SUSPICIOUS_AUDIO` records.
pub mod audio_labels {
    pub const BACKGROUND_VOICE: &str = "background_voice";
    pub const LOUD_AUDIO: &str = "loud_audio";
}

/// One emitted event. Immutable once created; serializes as
/// `{event, timestamp, deduction, label?, bbox?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event: EventKind,
    /// Microseconds since the Unix epoch
    #[serde(rename = "timestamp")]
    pub ts_us: i64,
    pub deduction: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl EventRecord {
    pub fn new(event: EventKind, ts_us: i64) -> Self {
        Self {
            event,
            ts_us,
            deduction: event.deduction(),
            label: None,
            bbox: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}
