//! Post-session report
//!
//! Session metadata plus the events inside the session window, aggregated
//! into per-kind counts and the integrity score. Keys serialize in
//! camelCase for downstream report renderers.

use serde::{Deserialize, Serialize};

use crate::domain::{EventKind, EventRecord};
use crate::scoring::{in_window, integrity_score};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

/// Candidate and window metadata supplied by the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMeta {
    pub candidate_name: String,
    /// Session start, µs since epoch
    pub start_us: i64,
    /// Session end, unset while in progress
    #[serde(default)]
    pub end_us: Option<i64>,
    #[serde(default)]
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub candidate_name: String,
    pub start_us: i64,
    pub end_us: Option<i64>,
    /// Only known once the session has ended
    pub interview_duration_ms: Option<i64>,
    pub status: SessionStatus,
    pub focus_lost_count: usize,
    pub no_face_count: usize,
    pub multiple_faces_count: usize,
    /// The `SUSPICIOUS_ITEM` records, in input order
    pub suspicious_events: Vec<EventRecord>,
    pub suspicious_audio_count: usize,
    pub integrity_score: u8,
    pub video_file_url: Option<String>,
}

impl Report {
    pub fn build(meta: &SessionMeta, events: &[EventRecord]) -> Self {
        let windowed: Vec<&EventRecord> = events
            .iter()
            .filter(|e| in_window(e.ts_us, meta.start_us, meta.end_us))
            .collect();
        let count = |kind: EventKind| windowed.iter().filter(|e| e.event == kind).count();

        Self {
            candidate_name: meta.candidate_name.clone(),
            start_us: meta.start_us,
            end_us: meta.end_us,
            interview_duration_ms: meta
                .end_us
                .map(|end| end.saturating_sub(meta.start_us).max(0) / 1_000),
            status: if meta.end_us.is_some() {
                SessionStatus::Completed
            } else {
                SessionStatus::InProgress
            },
            focus_lost_count: count(EventKind::FocusLost),
            no_face_count: count(EventKind::NoFace),
            multiple_faces_count: count(EventKind::MultipleFaces),
            suspicious_events: windowed
                .iter()
                .filter(|e| e.event == EventKind::SuspiciousItem)
                .map(|e| (*e).clone())
                .collect(),
            suspicious_audio_count: count(EventKind::SuspiciousAudio),
            integrity_score: integrity_score(windowed.iter().copied()),
            video_file_url: meta.video_url.clone(),
        }
    }

    /// Count of windowed records that deducted points.
    pub fn suspicious_total(&self) -> usize {
        self.focus_lost_count
            + self.no_face_count
            + self.multiple_faces_count
            + self.suspicious_events.len()
    }
}
