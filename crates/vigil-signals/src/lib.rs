//! # vigil-signals
//!
//! Signal primitives for the vigil proctoring engine.
//!
//! This crate provides:
//! - **Geometry**: centroid, distance and denominator guards on 2D point sets
//! - **Landmarks**: the per-face landmark groups (eyes, nose ridge, mouth outline)
//! - **DSP**: speech-band pre-filter, RMS loudness, speech-band energy and a dB magnitude spectrum analyser
//!
//! ## Example
//!
//! ```ignore
//! use vigil_signals::{AudioFrame, dsp};
//!
//! let frame = AudioFrame::from_samples(samples, 48_000.0);
//! let rms = dsp::rms(&frame.samples);
//! let band = dsp::band_energy_db(&frame.spectrum_db, frame.bin_hz(), 40.0, 9000.0);
//! ```

pub mod dsp;
pub mod frame;
pub mod geometry;
pub mod landmarks;

pub use dsp::{
    band_energy_db, bandpass_filter, rms, AudioFeatures, SpectrumAnalyzer, SpectrumConfig,
    SpeechBand,
};
pub use frame::AudioFrame;
pub use geometry::{centroid, distance, midpoint, non_zero_or_one, Point};
pub use landmarks::FaceDetection;
