//! Loudness features computed once per audio tick.

use serde::{Deserialize, Serialize};

/// Band energy reported when the requested band covers no bins.
pub const EMPTY_BAND_DB: f32 = -100.0;

/// Loudness of one audio tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    /// Root mean square of the time-domain samples
    pub rms: f32,
    /// Mean dB magnitude over the speech band
    pub band_db: f32,
}

impl Default for AudioFeatures {
    fn default() -> Self {
        Self {
            rms: 0.0,
            band_db: EMPTY_BAND_DB,
        }
    }
}

/// `sqrt(mean(x^2))`, 0 for an empty buffer.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Arithmetic mean of `spectrum_db` over the bins spanning `[lo_hz, hi_hz]`.
///
/// The bin range is `floor(lo / bin_hz) ..= ceil(hi / bin_hz)`, clamped to the
/// buffer. Returns [`EMPTY_BAND_DB`] when the range is empty.
pub fn band_energy_db(spectrum_db: &[f32], bin_hz: f32, lo_hz: f32, hi_hz: f32) -> f32 {
    if spectrum_db.is_empty() || bin_hz.is_nan() || bin_hz <= 0.0 {
        return EMPTY_BAND_DB;
    }
    let start = (lo_hz / bin_hz).floor().max(0.0) as usize;
    let end = ((hi_hz / bin_hz).ceil() as usize).min(spectrum_db.len() - 1);
    if start > end {
        return EMPTY_BAND_DB;
    }
    let band = &spectrum_db[start..=end];
    band.iter().sum::<f32>() / band.len() as f32
}
