//! Speech-band pre-filter applied before loudness and spectrum analysis.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// High-pass / low-pass corner frequencies of the capture chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeechBand {
    /// Removes hum and rumble below this frequency (Hz)
    pub highpass_hz: f32,
    /// Removes hiss above this frequency (Hz)
    pub lowpass_hz: f32,
}

impl Default for SpeechBand {
    fn default() -> Self {
        Self {
            highpass_hz: 80.0,
            lowpass_hz: 8_000.0,
        }
    }
}

/// First-order high-pass followed by a first-order low-pass.
///
/// The first output sample is zero (the high-pass has no previous input).
pub fn bandpass_filter(samples: &[f32], sample_rate: f32, band: &SpeechBand) -> Vec<f32> {
    let n = samples.len();
    if n < 2 || !(sample_rate > 0.0) {
        return samples.to_vec();
    }

    let dt = 1.0 / sample_rate;
    let hp_rc = 1.0 / (2.0 * PI * band.highpass_hz.max(0.01));
    let hp_alpha = hp_rc / (hp_rc + dt);
    let lp_rc = 1.0 / (2.0 * PI * band.lowpass_hz.max(0.1));
    let lp_alpha = dt / (lp_rc + dt);

    let mut filtered = samples.to_vec();

    let mut hp_prev_in = filtered[0];
    let mut hp_prev_out = 0.0;
    for x in filtered.iter_mut().skip(1) {
        let out = hp_alpha * (hp_prev_out + *x - hp_prev_in);
        hp_prev_in = *x;
        hp_prev_out = out;
        *x = out;
    }
    filtered[0] = 0.0;

    let mut lp_prev = filtered[0];
    for x in filtered.iter_mut().skip(1) {
        lp_prev = lp_alpha * *x + (1.0 - lp_alpha) * lp_prev;
        *x = lp_prev;
    }

    filtered
}
