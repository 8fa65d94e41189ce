//! Session runtime
//!
//! Three tasks per session:
//!
//! ```text
//! vision pump (1 s) ──┐
//!                     ├─ mpsc<Tick> ─▶ engine task (owns Engine + sink)
//! audio pump (250 ms) ┘
//! ```
//!
//! Pumps await their sources and forward ticks; only the engine task
//! touches detector state, one tick at a time. Stopping flips a watch flag,
//! joins the pumps (dropping the sources) and then the engine task, which
//! applies nothing once cancellation is visible.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::VigilConfig;
use crate::domain::{wall_clock_us, SessionId};
use crate::engine::{Engine, Tick};
use crate::sink::EventSink;
use crate::source::{AudioSource, VisionSource};

const TICK_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session already running: {0}")]
    AlreadyRunning(SessionId),
    #[error("session not found: {0}")]
    NotFound(SessionId),
    #[error("session task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Source of tick timestamps (µs since epoch).
pub trait SessionClock: Send + Sync {
    fn now_us(&self) -> i64;
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl SessionClock for WallClock {
    fn now_us(&self) -> i64 {
        wall_clock_us()
    }
}

/// Wall time anchored once, advanced by the tokio clock. Follows paused
/// and auto-advanced time in tests.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
    origin_us: i64,
}

impl TokioClock {
    pub fn new() -> Self {
        Self::anchored_at(wall_clock_us())
    }

    pub fn anchored_at(origin_us: i64) -> Self {
        Self {
            origin: Instant::now(),
            origin_us,
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionClock for TokioClock {
    fn now_us(&self) -> i64 {
        let elapsed = self.origin.elapsed().as_micros() as i64;
        self.origin_us.saturating_add(elapsed)
    }
}

/// Running session. Dropping the handle also ends its tasks, but only
/// [`SessionHandle::stop`] waits for them and returns the sink.
pub struct SessionHandle<S> {
    session_id: SessionId,
    cancel: watch::Sender<bool>,
    pumps: Vec<JoinHandle<()>>,
    engine: JoinHandle<S>,
}

impl<S: Send + 'static> SessionHandle<S> {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Cancel both pumps, release the sources and stop the engine.
    /// Returns the sink.
    pub async fn stop(self) -> Result<S, SessionError> {
        self.cancel.send_replace(true);
        for pump in self.pumps {
            pump.await?;
        }
        let sink = self.engine.await?;
        Ok(sink)
    }
}

/// Spawns session tasks on the current tokio runtime.
#[derive(Clone)]
pub struct SessionRunner {
    config: VigilConfig,
    clock: Arc<dyn SessionClock>,
}

impl SessionRunner {
    pub fn new(config: VigilConfig) -> Self {
        Self::with_clock(config, Arc::new(WallClock))
    }

    pub fn with_clock(config: VigilConfig, clock: Arc<dyn SessionClock>) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &VigilConfig {
        &self.config
    }

    pub fn now_us(&self) -> i64 {
        self.clock.now_us()
    }

    pub fn spawn<V, A, S>(
        &self,
        session_id: SessionId,
        now_us: i64,
        vision: V,
        audio: A,
        sink: S,
    ) -> SessionHandle<S>
    where
        V: VisionSource + 'static,
        A: AudioSource + 'static,
        S: EventSink + 'static,
    {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (tick_tx, tick_rx) = mpsc::channel(TICK_CHANNEL_CAPACITY);

        let vision_period = Duration::from_millis(self.config.vision.tick_ms);
        let audio_period = Duration::from_millis(self.config.audio.tick_ms);

        let vision_pump = tokio::spawn(pump(
            vision_period,
            cancel_rx.clone(),
            tick_tx.clone(),
            VisionPoller {
                source: vision,
                clock: self.clock.clone(),
            },
        ));
        let audio_pump = tokio::spawn(pump(
            audio_period,
            cancel_rx.clone(),
            tick_tx,
            AudioPoller {
                source: audio,
                clock: self.clock.clone(),
            },
        ));

        let mut engine = Engine::new(self.config.clone(), sink);
        engine.start(session_id, now_us);
        let engine_task = tokio::spawn(run_engine(engine, tick_rx, cancel_rx));

        SessionHandle {
            session_id,
            cancel: cancel_tx,
            pumps: vec![vision_pump, audio_pump],
            engine: engine_task,
        }
    }
}

/// One await on a collaborator, producing the tick to forward.
#[async_trait]
trait TickPoller: Send {
    async fn poll_once(&mut self) -> Tick;
}

struct VisionPoller<V> {
    source: V,
    clock: Arc<dyn SessionClock>,
}

struct AudioPoller<A> {
    source: A,
    clock: Arc<dyn SessionClock>,
}

#[async_trait]
impl<V: VisionSource> TickPoller for VisionPoller<V> {
    async fn poll_once(&mut self) -> Tick {
        let faces = self.source.face_detections().await.unwrap_or_else(|e| {
            log::warn!("Face detection failed, treating as no faces: {}", e);
            Vec::new()
        });
        let objects = self.source.object_detections().await.unwrap_or_else(|e| {
            log::warn!("Object detection failed, treating as no objects: {}", e);
            Vec::new()
        });
        Tick::Vision {
            faces,
            objects,
            at_us: self.clock.now_us(),
        }
    }
}

#[async_trait]
impl<A: AudioSource> TickPoller for AudioPoller<A> {
    async fn poll_once(&mut self) -> Tick {
        let frame = self.source.audio_frame().await.unwrap_or_else(|e| {
            log::warn!("Audio capture failed, treating as silence: {}", e);
            None
        });
        Tick::Audio {
            frame,
            at_us: self.clock.now_us(),
        }
    }
}

/// Periodic pump. The first poll happens one period after start; a slow
/// poll pushes back only this pump's schedule.
async fn pump<P: TickPoller>(
    period: Duration,
    mut cancel: watch::Receiver<bool>,
    tx: mpsc::Sender<Tick>,
    mut poller: P,
) {
    let period = period.max(Duration::from_millis(1));
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *cancel.borrow() {
            break;
        }
        let tick = tokio::select! {
            biased;
            _ = cancel.changed() => break,
            tick = async {
                interval.tick().await;
                poller.poll_once().await
            } => tick,
        };
        if tx.send(tick).await.is_err() {
            break;
        }
    }
    // poller (and its source) drops here
}

async fn run_engine<S: EventSink>(
    mut engine: Engine<S>,
    mut ticks: mpsc::Receiver<Tick>,
    mut cancel: watch::Receiver<bool>,
) -> S {
    loop {
        if *cancel.borrow() {
            break;
        }
        tokio::select! {
            biased;
            _ = cancel.changed() => break,
            tick = ticks.recv() => match tick {
                Some(tick) => engine.apply(tick),
                None => break,
            },
        }
    }
    engine.stop();
    engine.into_sink()
}

/// Active sessions keyed by id.
pub struct SessionRegistry<S> {
    runner: SessionRunner,
    sessions: HashMap<SessionId, SessionHandle<S>>,
}

impl<S: EventSink + 'static> SessionRegistry<S> {
    pub fn new(runner: SessionRunner) -> Self {
        Self {
            runner,
            sessions: HashMap::new(),
        }
    }

    pub fn start<V, A>(
        &mut self,
        session_id: SessionId,
        now_us: i64,
        vision: V,
        audio: A,
        sink: S,
    ) -> Result<(), SessionError>
    where
        V: VisionSource + 'static,
        A: AudioSource + 'static,
    {
        if self.sessions.contains_key(&session_id) {
            return Err(SessionError::AlreadyRunning(session_id));
        }
        let handle = self.runner.spawn(session_id, now_us, vision, audio, sink);
        self.sessions.insert(session_id, handle);
        Ok(())
    }

    pub async fn stop(&mut self, session_id: SessionId) -> Result<S, SessionError> {
        let handle = self
            .sessions
            .remove(&session_id)
            .ok_or(SessionError::NotFound(session_id))?;
        handle.stop().await
    }

    pub fn is_active(&self, session_id: &SessionId) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub async fn stop_all(&mut self) -> Vec<(SessionId, Result<S, SessionError>)> {
        let mut out = Vec::with_capacity(self.sessions.len());
        for (id, handle) in self.sessions.drain() {
            out.push((id, handle.stop().await));
        }
        out
    }
}
