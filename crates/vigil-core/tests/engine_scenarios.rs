//! Detector state machines driven through the engine tick API.

mod common;

use common::*;
use vigil_core::{audio_labels, EventKind};
use vigil_signals::AudioFeatures;

fn features(rms: f32, band_db: f32) -> AudioFeatures {
    AudioFeatures { rms, band_db }
}

// ============================================================================
// No-Face
// ============================================================================

#[test]
fn test_no_face_debounce_and_rearm() {
    let (mut engine, log) = started_engine(0);

    for t in 0..=9 {
        engine.on_vision_tick(&[], &[], t * SEC);
    }
    engine.on_vision_tick(&[], &[], 9_900 * MS);
    assert_eq!(log.count(EventKind::NoFace), 0);

    engine.on_vision_tick(&[], &[], 10_100 * MS);
    assert_eq!(log.count(EventKind::NoFace), 1);

    // latched: no repeat while the face stays missing
    for t in 11..=15 {
        engine.on_vision_tick(&[], &[], t * SEC);
    }
    assert_eq!(log.count(EventKind::NoFace), 1);

    // recovery re-arms
    engine.on_vision_tick(&[frontal_face()], &[], 16 * SEC);
    engine.on_vision_tick(&[], &[], 17 * SEC);
    engine.on_vision_tick(&[], &[], 27 * SEC);
    assert_eq!(log.count(EventKind::NoFace), 1);
    engine.on_vision_tick(&[], &[], 27_500 * MS);
    assert_eq!(log.count(EventKind::NoFace), 2);

    let deductions: Vec<u32> = log.snapshot().iter().map(|e| e.deduction).collect();
    assert_eq!(deductions, vec![5, 5]);
}

#[test]
fn test_brief_absences_never_emit() {
    let (mut engine, log) = started_engine(0);
    for t in 0..60 {
        let faces = if t % 8 == 7 { vec![frontal_face()] } else { vec![] };
        engine.on_vision_tick(&faces, &[], t * SEC);
    }
    assert_eq!(log.count(EventKind::NoFace), 0);
}

// ============================================================================
// Multiple faces
// ============================================================================

#[test]
fn test_multiple_faces_edge_trigger() {
    let (mut engine, log) = started_engine(0);
    let two = [frontal_face(), frontal_face()];

    for t in 0..5 {
        engine.on_vision_tick(&two, &[], t * SEC);
    }
    assert_eq!(log.count(EventKind::MultipleFaces), 1);

    engine.on_vision_tick(&[frontal_face()], &[], 5 * SEC);
    engine.on_vision_tick(&two, &[], 6 * SEC);
    assert_eq!(log.count(EventKind::MultipleFaces), 2);

    // zero faces also clears the flag
    engine.on_vision_tick(&[], &[], 7 * SEC);
    engine.on_vision_tick(&two, &[], 8 * SEC);
    assert_eq!(log.count(EventKind::MultipleFaces), 3);

    let first = &log.snapshot()[0];
    assert_eq!(first.ts_us, 0);
    assert_eq!(first.deduction, 20);
}

// ============================================================================
// Focus / gaze
// ============================================================================

#[test]
fn test_focus_lost_after_hold_and_rearm() {
    let (mut engine, log) = started_engine(0);

    for t in 1..=6 {
        engine.on_vision_tick(&[away_face()], &[], t * SEC);
    }
    assert_eq!(log.count(EventKind::FocusLost), 0);

    engine.on_vision_tick(&[away_face()], &[], 7 * SEC);
    assert_eq!(log.count(EventKind::FocusLost), 1);
    for t in 8..=10 {
        engine.on_vision_tick(&[away_face()], &[], t * SEC);
    }
    assert_eq!(log.count(EventKind::FocusLost), 1);

    engine.on_vision_tick(&[frontal_face()], &[], 11 * SEC);
    for t in 12..=18 {
        engine.on_vision_tick(&[away_face()], &[], t * SEC);
    }
    assert_eq!(log.count(EventKind::FocusLost), 2);
}

#[test]
fn test_gaze_deviations_are_kept_for_diagnostics() {
    let (mut engine, _log) = started_engine(0);
    engine.on_vision_tick(&[away_face()], &[], SEC);
    let reading = engine.state().last_gaze.expect("single face records a reading");
    assert!(reading.looking_away);
    assert!((reading.horizontal_deviation - 20.0 / 36.0).abs() < 1e-4);
    assert!((reading.vertical_deviation - 7.0 / 36.0).abs() < 1e-4);

    engine.on_vision_tick(&[], &[], 2 * SEC);
    assert!(engine.state().last_gaze.is_none());
}

#[test]
fn test_missing_face_resets_gaze_timer() {
    let (mut engine, log) = started_engine(0);
    for t in 1..=5 {
        engine.on_vision_tick(&[away_face()], &[], t * SEC);
    }
    engine.on_vision_tick(&[], &[], 6 * SEC);
    for t in 7..=11 {
        engine.on_vision_tick(&[away_face()], &[], t * SEC);
    }
    assert_eq!(log.count(EventKind::FocusLost), 0);
    assert!(log.is_empty());
}

#[test]
fn test_scaled_face_classifies_identically() {
    let (mut a, log_a) = started_engine(0);
    let (mut b, log_b) = started_engine(0);
    for t in 0..=7 {
        a.on_vision_tick(&[away_face()], &[], t * SEC);
        b.on_vision_tick(&[away_face().scaled(2.0)], &[], t * SEC);
    }
    assert_eq!(log_a.count(EventKind::FocusLost), 1);
    assert_eq!(log_b.count(EventKind::FocusLost), 1);
}

// ============================================================================
// Suspicious objects
// ============================================================================

#[test]
fn test_every_suspicious_detection_emits() {
    let (mut engine, log) = started_engine(0);
    let detections = [
        object("phone", 0.9),
        object("Book", 0.6),
        object("laptop", 0.5),
        object("cup", 0.99),
        object("cell phone", 0.7),
    ];

    engine.on_vision_tick(&[frontal_face()], &detections, SEC);
    assert_eq!(log.count(EventKind::SuspiciousItem), 3);
    engine.on_vision_tick(&[], &detections, 2 * SEC);
    assert_eq!(log.count(EventKind::SuspiciousItem), 6);

    let labels: Vec<String> = log
        .snapshot()
        .iter()
        .take(3)
        .filter_map(|e| e.label.clone())
        .collect();
    assert_eq!(labels, vec!["phone", "book", "cell phone"]);
    let first = &log.snapshot()[0];
    assert_eq!(first.deduction, 10);
    assert_eq!(first.bbox.map(|b| b.width), Some(30.0));
}

// ============================================================================
// Audio
// ============================================================================

/// Quiet room for the whole calibration window: baseline rms 0.001, -85 dB.
fn calibrate_quiet(engine: &mut vigil_core::Engine<vigil_core::EventLog>) {
    for i in 0..20 {
        engine.on_audio_features(features(0.001, -85.0), i * 250 * MS);
    }
    assert!(engine.state().calibrator.is_calibrating());
}

#[test]
fn test_calibration_absorbs_loud_samples() {
    let (mut engine, log) = started_engine(0);
    for i in 0..20 {
        engine.on_audio_features(features(0.5, -30.0), i * 250 * MS);
    }
    assert!(log.is_empty());
}

#[test]
fn test_background_voice_with_cooldown() {
    let (mut engine, log) = started_engine(0);
    calibrate_quiet(&mut engine);

    // 5.0s .. 11.0s, loud but below "very loud", mouth never measured open
    for i in 20..=44 {
        engine.on_audio_features(features(0.003, -75.0), i * 250 * MS);
    }
    assert!(!engine.state().calibrator.is_calibrating());

    let voices: Vec<i64> = log
        .snapshot()
        .iter()
        .filter(|e| e.label.as_deref() == Some(audio_labels::BACKGROUND_VOICE))
        .map(|e| e.ts_us)
        .collect();
    assert_eq!(voices, vec![5_750 * MS, 11_000 * MS]);
    assert_eq!(log.count_label(EventKind::SuspiciousAudio, audio_labels::LOUD_AUDIO), 0);
    assert!(log.snapshot().iter().all(|e| e.deduction == 0));
}

#[test]
fn test_open_mouth_is_not_background_voice() {
    let (mut engine, log) = started_engine(0);
    calibrate_quiet(&mut engine);
    engine.on_vision_tick(&[talking_face()], &[], 5 * SEC);
    assert!(engine.last_mouth_openness() > 0.28);

    for i in 20..=44 {
        engine.on_audio_features(features(0.003, -75.0), i * 250 * MS);
    }
    assert!(log.is_empty());
}

#[test]
fn test_loud_audio_shares_cooldown() {
    let (mut engine, log) = started_engine(0);
    calibrate_quiet(&mut engine);
    engine.on_vision_tick(&[talking_face()], &[], 5 * SEC);

    for i in 20..=44 {
        let at = i * 250 * MS;
        if at == 6 * SEC {
            engine.on_vision_tick(&[frontal_face()], &[], at);
        }
        engine.on_audio_features(features(0.05, -40.0), at);
    }

    let audio: Vec<(String, i64)> = log
        .snapshot()
        .iter()
        .map(|e| (e.label.clone().unwrap_or_default(), e.ts_us))
        .collect();
    assert_eq!(
        audio,
        vec![
            (audio_labels::LOUD_AUDIO.to_string(), 5_750 * MS),
            (audio_labels::BACKGROUND_VOICE.to_string(), 11_000 * MS),
        ]
    );
}

#[test]
fn test_calibration_fallback_thresholds() {
    let (mut engine, log) = started_engine(0);
    for i in 0..20 {
        engine.on_audio_tick(None, i * 250 * MS);
    }
    engine.on_audio_tick(None, 5 * SEC);

    assert!(engine.state().calibrator.baseline().is_none());
    let th = engine.state().calibrator.thresholds();
    assert!((th.rms - 0.0016).abs() < 1e-7);
    assert!((th.db - -78.0).abs() < 1e-4);

    // just above the fallback rms threshold counts as loud
    for i in 21..=24 {
        engine.on_audio_features(features(0.0017, -90.0), i * 250 * MS);
    }
    assert_eq!(
        log.count_label(EventKind::SuspiciousAudio, audio_labels::BACKGROUND_VOICE),
        1
    );
}

#[test]
fn test_missing_audio_frames_are_silence() {
    let (mut engine, log) = started_engine(0);
    calibrate_quiet(&mut engine);
    for i in 20..=40 {
        engine.on_audio_tick(None, i * 250 * MS);
    }
    assert!(log.is_empty());
    assert!(engine.state().background_voice.since().is_none());
}
