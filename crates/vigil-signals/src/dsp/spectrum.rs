//! dB magnitude spectrum
//!
//! Mirrors a browser analyser node: Blackman window, forward FFT, magnitude
//! scaled by 1/N, exponential smoothing across calls, then `20 * log10`.

use std::f32::consts::PI;
use std::sync::Arc;

use num_complex::Complex32;
use rustfft::{Fft, FftPlanner};

/// Spectrum analyser configuration
#[derive(Debug, Clone)]
pub struct SpectrumConfig {
    /// FFT size (samples per analysis window)
    pub fft_size: usize,
    /// Weight of the previous magnitude (0 = no smoothing)
    pub smoothing: f32,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            fft_size: 4096,
            smoothing: 0.08,
        }
    }
}

/// Blackman window coefficients
pub fn blackman_window(size: usize) -> Vec<f32> {
    if size < 2 {
        return vec![1.0; size];
    }
    let n = size as f32;
    (0..size)
        .map(|i| {
            let x = i as f32 / n;
            0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
        })
        .collect()
}

/// Stateful analyser; keeps the previous magnitudes for smoothing.
pub struct SpectrumAnalyzer {
    config: SpectrumConfig,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    smoothed: Vec<f32>,
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        Self::with_config(SpectrumConfig::default())
    }

    pub fn with_config(config: SpectrumConfig) -> Self {
        let size = config.fft_size.max(2);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Self {
            window: blackman_window(size),
            fft,
            smoothed: vec![0.0; size / 2],
            config: SpectrumConfig {
                fft_size: size,
                ..config
            },
        }
    }

    pub fn fft_size(&self) -> usize {
        self.config.fft_size
    }

    /// Frequency resolution in Hz for the given sample rate.
    pub fn bin_hz(&self, sample_rate: f32) -> f32 {
        sample_rate / self.config.fft_size as f32
    }

    /// Analyse the most recent `fft_size` samples (zero-padded at the front
    /// when fewer are given). Returns `fft_size / 2` bins in dB.
    ///
    /// Silent bins come out as `-inf`, matching the browser analyser.
    pub fn process(&mut self, samples: &[f32]) -> Vec<f32> {
        let n = self.config.fft_size;
        let tail = &samples[samples.len().saturating_sub(n)..];
        let pad = n - tail.len();

        let mut buffer: Vec<Complex32> = (0..n)
            .map(|i| {
                let s = if i < pad { 0.0 } else { tail[i - pad] };
                Complex32::new(s * self.window[i], 0.0)
            })
            .collect();
        self.fft.process(&mut buffer);

        let tau = self.config.smoothing.clamp(0.0, 1.0);
        let scale = 1.0 / n as f32;
        buffer
            .iter()
            .take(n / 2)
            .zip(self.smoothed.iter_mut())
            .map(|(c, prev)| {
                let mag = c.norm() * scale;
                *prev = tau * *prev + (1.0 - tau) * mag;
                20.0 * prev.log10()
            })
            .collect()
    }

    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|v| *v = 0.0);
    }
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
