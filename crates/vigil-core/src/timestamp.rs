//! Tick timestamp tracking
//!
//! Each tick stream (vision, audio) must move forward in time. A regressed
//! tick is rejected so a detector timer never sees time run backwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::dt_us;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStream {
    Vision,
    Audio,
}

impl TickStream {
    fn as_str(self) -> &'static str {
        match self {
            TickStream::Vision => "vision",
            TickStream::Audio => "audio",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TickError {
    #[error("timestamp regression in {stream} tick: now={now_us} < last={last_us}")]
    Regression {
        stream: &'static str,
        now_us: i64,
        last_us: i64,
    },
}

/// Per-stream last-tick timestamps plus the session start.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TickLog {
    pub last_vision: Option<i64>,
    pub last_audio: Option<i64>,
    pub session_start: Option<i64>,
}

impl TickLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tick, verifying monotonicity within its stream.
    ///
    /// # Returns
    /// * `Ok(dt_us)` - Time since the previous tick of the stream (0 if first)
    /// * `Err(TickError)` - If the timestamp flowed backwards
    pub fn record(&mut self, stream: TickStream, ts_us: i64) -> Result<u64, TickError> {
        let last = match stream {
            TickStream::Vision => &mut self.last_vision,
            TickStream::Audio => &mut self.last_audio,
        };
        let dt = match *last {
            Some(prev) if ts_us < prev => {
                return Err(TickError::Regression {
                    stream: stream.as_str(),
                    now_us: ts_us,
                    last_us: prev,
                })
            }
            Some(prev) => dt_us(ts_us, prev),
            None => 0,
        };
        *last = Some(ts_us);
        Ok(dt)
    }

    /// Reset stream clocks and mark the session start.
    pub fn start_session(&mut self, ts_us: i64) {
        *self = Self {
            session_start: Some(ts_us),
            ..Self::default()
        };
    }

    /// Session duration in microseconds (0 before start).
    pub fn session_duration_us(&self, now_us: i64) -> u64 {
        self.session_start.map_or(0, |start| dt_us(now_us, start))
    }

    pub fn end_session(&mut self) {
        self.session_start = None;
    }
}
