//! One audio tick's worth of samples and spectrum.

use serde::{Deserialize, Serialize};

use crate::dsp::{
    band_energy_db, bandpass_filter, rms, AudioFeatures, SpectrumAnalyzer, SpectrumConfig,
    SpeechBand,
};

/// Speech-band filtered time-domain buffer plus its dB magnitude spectrum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioFrame {
    pub samples: Vec<f32>,
    /// `fft_size / 2` bins in dB
    pub spectrum_db: Vec<f32>,
    pub sample_rate: f32,
    pub fft_size: usize,
}

impl AudioFrame {
    /// Build a frame from raw PCM with the default 80 Hz - 8 kHz pre-filter
    /// and a one-shot analyser sized to the buffer.
    pub fn from_samples(samples: Vec<f32>, sample_rate: f32) -> Self {
        Self::from_samples_in_band(samples, sample_rate, &SpeechBand::default())
    }

    pub fn from_samples_in_band(samples: Vec<f32>, sample_rate: f32, band: &SpeechBand) -> Self {
        let mut analyzer = SpectrumAnalyzer::with_config(SpectrumConfig {
            fft_size: samples.len().max(2),
            ..Default::default()
        });
        Self::with_analyzer(samples, sample_rate, band, &mut analyzer)
    }

    /// Build a frame using a long-lived analyser so smoothing carries
    /// across ticks. Samples are band-filtered before RMS and FFT.
    pub fn with_analyzer(
        samples: Vec<f32>,
        sample_rate: f32,
        band: &SpeechBand,
        analyzer: &mut SpectrumAnalyzer,
    ) -> Self {
        let samples = bandpass_filter(&samples, sample_rate, band);
        let spectrum_db = analyzer.process(&samples);
        Self {
            samples,
            spectrum_db,
            sample_rate,
            fft_size: analyzer.fft_size(),
        }
    }

    /// Width of one spectrum bin in Hz (0 when the frame is empty).
    pub fn bin_hz(&self) -> f32 {
        if self.fft_size == 0 {
            0.0
        } else {
            self.sample_rate / self.fft_size as f32
        }
    }

    /// RMS and mean band dB over `[lo_hz, hi_hz]`.
    pub fn features(&self, lo_hz: f32, hi_hz: f32) -> AudioFeatures {
        AudioFeatures {
            rms: rms(&self.samples),
            band_db: band_energy_db(&self.spectrum_db, self.bin_hz(), lo_hz, hi_hz),
        }
    }
}
