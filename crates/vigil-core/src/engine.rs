//! Event Fusion Engine
//!
//! One engine per session. It owns every detector timer in a single
//! [`EngineState`] and one [`EventSink`]. Inputs arrive as vision ticks
//! (faces + objects, ~1 s) and audio ticks (~250 ms); each tick runs to
//! completion before the next is applied.
//!
//! Vision tick:
//! - No-Face: zero faces held past the timeout emits `NO_FACE` once, then
//!   latches until a face returns.
//! - Multiple-Faces: edge-triggered on the transition to more than one face.
//! - Focus: single face looking away past the timeout emits `FOCUS_LOST`
//!   once, then latches until the gaze returns.
//! - Objects: every suspicious detection emits `SUSPICIOUS_ITEM`.
//!
//! Audio tick:
//! - Calibration window absorbs samples and classifies nothing.
//! - Background voice: loud while the mouth is closed.
//! - Loud audio: very loud regardless of the mouth.
//! Both audio detectors share one cooldown.

use vigil_detectors::{
    AudioCalibrator, GazeClassifier, GazeReading, MouthEstimator, ObjectDetection, SuspiciousObjectFilter,
};
use vigil_signals::{AudioFeatures, AudioFrame, FaceDetection};

use crate::config::VigilConfig;
use crate::debounce::{Cooldown, Debounce, HoldTimer};
use crate::domain::{audio_labels, ms_to_us, EventKind, EventRecord, SessionId};
use crate::sink::EventSink;
use crate::timestamp::{TickLog, TickStream};

/// One tick's input, as delivered by the session runner or a replay.
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    Vision {
        faces: Vec<FaceDetection>,
        objects: Vec<ObjectDetection>,
        at_us: i64,
    },
    Audio {
        /// `None` when the source delivered nothing (treated as silence)
        frame: Option<AudioFrame>,
        at_us: i64,
    },
}

impl Tick {
    pub fn at_us(&self) -> i64 {
        match self {
            Tick::Vision { at_us, .. } | Tick::Audio { at_us, .. } => *at_us,
        }
    }
}

/// All per-session detector state.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub session_id: Option<SessionId>,
    pub running: bool,
    pub no_face: Debounce,
    pub look_away: Debounce,
    pub multiple_faces_active: bool,
    /// Gaze deviations of the last single-face vision tick
    pub last_gaze: Option<GazeReading>,
    /// Written by the vision tick only, read by the audio tick only
    pub last_mouth_openness: f32,
    pub background_voice: HoldTimer,
    pub loud_audio: HoldTimer,
    pub audio_cooldown: Cooldown,
    pub calibrator: AudioCalibrator,
    pub ticks: TickLog,
}

impl EngineState {
    pub fn new(config: &VigilConfig) -> Self {
        Self {
            session_id: None,
            running: false,
            no_face: Debounce::new(ms_to_us(config.vision.no_face_timeout_ms)),
            look_away: Debounce::new(ms_to_us(config.vision.look_away_timeout_ms)),
            multiple_faces_active: false,
            last_gaze: None,
            last_mouth_openness: 0.0,
            background_voice: HoldTimer::new(ms_to_us(config.audio.background_voice_hold_ms)),
            loud_audio: HoldTimer::new(ms_to_us(config.audio.loud_audio_hold_ms)),
            audio_cooldown: Cooldown::new(ms_to_us(config.audio.cooldown_ms)),
            calibrator: AudioCalibrator::new(config.calibration.clone()),
            ticks: TickLog::new(),
        }
    }
}

/// Event Fusion Engine
pub struct Engine<S: EventSink> {
    config: VigilConfig,
    gaze: GazeClassifier,
    mouth: MouthEstimator,
    objects: SuspiciousObjectFilter,
    state: EngineState,
    sink: S,
    emitted: u64,
    dropped: u64,
}

impl<S: EventSink> Engine<S> {
    pub fn new(config: VigilConfig, sink: S) -> Self {
        Self {
            gaze: GazeClassifier::with_config(config.gaze.clone()),
            mouth: MouthEstimator::with_config(config.mouth.clone()),
            objects: SuspiciousObjectFilter::new(config.objects.clone()),
            state: EngineState::new(&config),
            config,
            sink,
            emitted: 0,
            dropped: 0,
        }
    }

    pub fn with_default_config(sink: S) -> Self {
        Self::new(VigilConfig::default(), sink)
    }

    /// Begin a session: fresh detector state and a new calibration window.
    pub fn start(&mut self, session_id: SessionId, now_us: i64) {
        self.state = EngineState::new(&self.config);
        self.state.session_id = Some(session_id);
        self.state.running = true;
        self.state.ticks.start_session(now_us);
        self.state.calibrator.start(now_us);
        self.emitted = 0;
        self.dropped = 0;
        log::info!("Session {} started at {}", session_id, now_us);
    }

    /// End the session. Later ticks are ignored.
    pub fn stop(&mut self) {
        if !self.state.running {
            return;
        }
        self.state.running = false;
        let duration_s = match self.state.ticks.last_vision.max(self.state.ticks.last_audio) {
            Some(last) => self.state.ticks.session_duration_us(last) as f64 / 1_000_000.0,
            None => 0.0,
        };
        self.state.ticks.end_session();
        match self.state.session_id {
            Some(id) => log::info!(
                "Session {} stopped after {:.1}s ({} events emitted, {} undelivered)",
                id,
                duration_s,
                self.emitted,
                self.dropped
            ),
            None => log::info!("Session stopped"),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.state.session_id
    }

    pub fn config(&self) -> &VigilConfig {
        &self.config
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn last_mouth_openness(&self) -> f32 {
        self.state.last_mouth_openness
    }

    /// Records handed to the sink without error.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Records the sink failed to take.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Apply one tick of either stream.
    pub fn apply(&mut self, tick: Tick) {
        match tick {
            Tick::Vision {
                faces,
                objects,
                at_us,
            } => self.on_vision_tick(&faces, &objects, at_us),
            Tick::Audio { frame, at_us } => self.on_audio_tick(frame.as_ref(), at_us),
        }
    }

    fn accept(&mut self, stream: TickStream, now_us: i64) -> bool {
        if !self.state.running {
            return false;
        }
        match self.state.ticks.record(stream, now_us) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Skipping tick: {}", e);
                false
            }
        }
    }

    /// Vision tick: face presence, multiple faces, gaze, mouth and objects.
    pub fn on_vision_tick(
        &mut self,
        faces: &[FaceDetection],
        objects: &[ObjectDetection],
        now_us: i64,
    ) {
        if !self.accept(TickStream::Vision, now_us) {
            return;
        }

        match faces.len() {
            0 => {
                if self.state.no_face.update(true, now_us) {
                    self.emit(EventRecord::new(EventKind::NoFace, now_us));
                }
                // a missing face is neither looking away nor multiple
                self.state.look_away.reset();
                self.state.multiple_faces_active = false;
                self.state.last_gaze = None;
            }
            1 => {
                self.state.no_face.reset();
                self.state.multiple_faces_active = false;
                let reading = self.gaze.classify(&faces[0]);
                self.state.last_gaze = Some(reading);
                if self.state.look_away.update(reading.looking_away, now_us) {
                    log::debug!(
                        "Focus lost: horizontal deviation {:.3}, vertical deviation {:.3}",
                        reading.horizontal_deviation,
                        reading.vertical_deviation
                    );
                    self.emit(EventRecord::new(EventKind::FocusLost, now_us));
                }
            }
            _ => {
                self.state.no_face.reset();
                if !self.state.multiple_faces_active {
                    self.state.multiple_faces_active = true;
                    self.emit(EventRecord::new(EventKind::MultipleFaces, now_us));
                }
            }
        }

        self.state.last_mouth_openness = self.mouth.openness_for(faces);

        let items: Vec<_> = self.objects.suspicious(objects).collect();
        for (label, bbox) in items {
            self.emit(
                EventRecord::new(EventKind::SuspiciousItem, now_us)
                    .with_label(label)
                    .with_bbox(bbox),
            );
        }
    }

    /// Audio tick from a frame. An absent frame counts as silence and is
    /// not collected as a calibration sample.
    pub fn on_audio_tick(&mut self, frame: Option<&AudioFrame>, now_us: i64) {
        let band = (self.config.audio.band_low_hz, self.config.audio.band_high_hz);
        match frame {
            Some(frame) => self.on_audio_features(frame.features(band.0, band.1), now_us),
            None => {
                if !self.accept(TickStream::Audio, now_us) {
                    return;
                }
                if self.state.calibrator.advance(now_us).is_some() {
                    self.classify_audio(AudioFeatures::default(), now_us);
                }
            }
        }
    }

    /// Audio tick from precomputed loudness features.
    pub fn on_audio_features(&mut self, features: AudioFeatures, now_us: i64) {
        if !self.accept(TickStream::Audio, now_us) {
            return;
        }
        if self.state.calibrator.observe(&features, now_us).is_some() {
            self.classify_audio(features, now_us);
        }
    }

    fn classify_audio(&mut self, features: AudioFeatures, now_us: i64) {
        let thresholds = self.state.calibrator.thresholds();
        let loud = thresholds.is_loud(&features);
        let very_loud = thresholds.is_very_loud(&features);
        let mouth_closed = self.mouth.is_closed(self.state.last_mouth_openness);

        if self
            .state
            .background_voice
            .update(loud && mouth_closed, now_us)
            && self.state.audio_cooldown.ready(now_us)
        {
            self.state.audio_cooldown.mark(now_us);
            self.emit(
                EventRecord::new(EventKind::SuspiciousAudio, now_us)
                    .with_label(audio_labels::BACKGROUND_VOICE),
            );
        }

        if self.state.loud_audio.update(very_loud, now_us)
            && self.state.audio_cooldown.ready(now_us)
        {
            self.state.audio_cooldown.mark(now_us);
            self.emit(
                EventRecord::new(EventKind::SuspiciousAudio, now_us)
                    .with_label(audio_labels::LOUD_AUDIO),
            );
        }
    }

    /// Fire-and-forget handoff. Failures are logged and the record dropped;
    /// detector state is never rolled back.
    fn emit(&mut self, record: EventRecord) {
        log::debug!(
            "{} at {}{}",
            record.event,
            record.ts_us,
            record
                .label
                .as_deref()
                .map(|l| format!(" ({})", l))
                .unwrap_or_default()
        );
        let kind = record.event;
        match self.sink.emit(record) {
            Ok(()) => self.emitted += 1,
            Err(e) => {
                self.dropped += 1;
                log::warn!("Dropping {} event: {}", kind, e);
            }
        }
    }
}
