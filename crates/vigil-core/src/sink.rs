//! Event sinks
//!
//! The engine hands each record to exactly one sink and never awaits or
//! retries the handoff. A failed `emit` is logged by the engine and dropped.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::{EventKind, EventRecord};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("sink is full")]
    Full,
    #[error("sink is closed")]
    Closed,
    #[error("sink rejected record: {0}")]
    Rejected(String),
}

/// Push-side collaborator receiving emitted records.
pub trait EventSink: Send {
    fn emit(&mut self, record: EventRecord) -> Result<(), SinkError>;
}

impl<F> EventSink for F
where
    F: FnMut(EventRecord) -> Result<(), SinkError> + Send,
{
    fn emit(&mut self, record: EventRecord) -> Result<(), SinkError> {
        self(record)
    }
}

/// Append-only, shareable in-memory event log.
///
/// Clones share the same storage, so a test or report builder can keep a
/// handle while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    inner: Arc<Mutex<Vec<EventRecord>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Copy of every record so far, in emission order.
    pub fn snapshot(&self) -> Vec<EventRecord> {
        self.inner.lock().clone()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.inner.lock().iter().filter(|r| r.event == kind).count()
    }

    pub fn count_label(&self, kind: EventKind, label: &str) -> usize {
        self.inner
            .lock()
            .iter()
            .filter(|r| r.event == kind && r.label.as_deref() == Some(label))
            .count()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, record: EventRecord) -> Result<(), SinkError> {
        self.inner.lock().push(record);
        Ok(())
    }
}

/// Non-blocking forwarder onto a bounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<EventRecord>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<EventRecord>) -> Self {
        Self { tx }
    }

    /// Sink plus the receiving half, with room for `capacity` records.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<EventRecord>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&mut self, record: EventRecord) -> Result<(), SinkError> {
        self.tx.try_send(record).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkError::Full,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}
