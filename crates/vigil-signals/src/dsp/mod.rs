//! DSP (Digital Signal Processing) module
//!
//! - `bandpass_filter` - speech-band pre-filter (high-pass then low-pass)
//! - `rms`, `band_energy_db` - per-tick loudness features
//! - `SpectrumAnalyzer` - windowed FFT producing a smoothed dB magnitude spectrum

mod filter;
mod loudness;
mod spectrum;

pub use filter::{bandpass_filter, SpeechBand};
pub use loudness::{band_energy_db, rms, AudioFeatures, EMPTY_BAND_DB};
pub use spectrum::{blackman_window, SpectrumAnalyzer, SpectrumConfig};
