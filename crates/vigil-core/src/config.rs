use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use vigil_detectors::{CalibrationConfig, GazeConfig, MouthConfig, ObjectFilterConfig};
use vigil_signals::SpeechBand;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Engine configuration. Every section falls back to its defaults when
/// missing from the file, so a user file only needs the keys it changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VigilConfig {
    pub vision: VisionConfig,
    pub gaze: GazeConfig,
    pub mouth: MouthConfig,
    pub audio: AudioConfig,
    pub calibration: CalibrationConfig,
    pub objects: ObjectFilterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Vision tick period
    pub tick_ms: u64,
    /// Zero faces must persist longer than this before NO_FACE
    pub no_face_timeout_ms: u64,
    /// Gaze must stay away longer than this before FOCUS_LOST
    pub look_away_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Audio tick period
    pub tick_ms: u64,
    /// Capture pre-filter corners applied before RMS and FFT (Hz)
    pub highpass_hz: f32,
    pub lowpass_hz: f32,
    /// Speech band used for band energy (Hz)
    pub band_low_hz: f32,
    pub band_high_hz: f32,
    pub background_voice_hold_ms: u64,
    pub loud_audio_hold_ms: u64,
    /// Minimum spacing between SUSPICIOUS_AUDIO records of either label
    pub cooldown_ms: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1_000,
            no_face_timeout_ms: 10_000,
            look_away_timeout_ms: 5_000,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            tick_ms: 250,
            highpass_hz: 80.0,
            lowpass_hz: 8_000.0,
            band_low_hz: 40.0,
            band_high_hz: 9_000.0,
            background_voice_hold_ms: 700,
            loud_audio_hold_ms: 600,
            cooldown_ms: 5_000,
        }
    }
}

impl AudioConfig {
    /// Pre-filter band for building audio frames
    pub fn speech_band(&self) -> SpeechBand {
        SpeechBand {
            highpass_hz: self.highpass_hz,
            lowpass_hz: self.lowpass_hz,
        }
    }
}

fn override_from<T, F>(lookup: &F, key: &str, target: &mut T) -> Result<(), ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup(key) {
        *target = val
            .trim()
            .parse()
            .map_err(|_| ConfigError::Validation(format!("Invalid {}", key)))?;
    }
    Ok(())
}

impl VigilConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: VigilConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    /// Environment variables are prefixed with VIGIL_
    /// Example: VIGIL_VISION_TICK_MS=500
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. User config file (if exists)
    /// 3. Default config file
    /// 4. Built-in defaults (lowest priority)
    pub fn load_layered(
        default_path: Option<&Path>,
        user_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut config = VigilConfig::default();

        if let Some(path) = default_path {
            if path.exists() {
                config = Self::from_file(path)?;
            }
        }

        // The user file replaces whole sections it names; unnamed sections
        // keep the layer below.
        if let Some(path) = user_path {
            if path.exists() {
                let content = fs::read_to_string(path)?;
                config = config.merge_toml(&content)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    fn merge_toml(self, content: &str) -> Result<Self, ConfigError> {
        let mut base = toml::Value::try_from(&self)?;
        let overlay: toml::Value = toml::from_str(content)?;
        if let (Some(base_tbl), toml::Value::Table(over_tbl)) = (base.as_table_mut(), overlay) {
            for (section, value) in over_tbl {
                match (base_tbl.get_mut(&section), value) {
                    (Some(toml::Value::Table(dst)), toml::Value::Table(src)) => {
                        for (k, v) in src {
                            dst.insert(k, v);
                        }
                    }
                    (_, value) => {
                        base_tbl.insert(section, value);
                    }
                }
            }
        }
        let merged: VigilConfig = base.try_into()?;
        Ok(merged)
    }

    /// Apply `VIGIL_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_env_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (process env in production)
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Vision
        override_from(&lookup, "VIGIL_VISION_TICK_MS", &mut self.vision.tick_ms)?;
        override_from(
            &lookup,
            "VIGIL_VISION_NO_FACE_TIMEOUT_MS",
            &mut self.vision.no_face_timeout_ms,
        )?;
        override_from(
            &lookup,
            "VIGIL_VISION_LOOK_AWAY_TIMEOUT_MS",
            &mut self.vision.look_away_timeout_ms,
        )?;

        // Gaze / mouth
        override_from(
            &lookup,
            "VIGIL_GAZE_HORIZONTAL_THRESHOLD",
            &mut self.gaze.horizontal_threshold,
        )?;
        override_from(
            &lookup,
            "VIGIL_GAZE_VERTICAL_THRESHOLD",
            &mut self.gaze.vertical_threshold,
        )?;
        override_from(
            &lookup,
            "VIGIL_MOUTH_CLOSED_THRESHOLD",
            &mut self.mouth.closed_threshold,
        )?;

        // Audio
        override_from(&lookup, "VIGIL_AUDIO_TICK_MS", &mut self.audio.tick_ms)?;
        override_from(&lookup, "VIGIL_AUDIO_HIGHPASS_HZ", &mut self.audio.highpass_hz)?;
        override_from(&lookup, "VIGIL_AUDIO_LOWPASS_HZ", &mut self.audio.lowpass_hz)?;
        override_from(&lookup, "VIGIL_AUDIO_COOLDOWN_MS", &mut self.audio.cooldown_ms)?;
        override_from(
            &lookup,
            "VIGIL_AUDIO_BACKGROUND_VOICE_HOLD_MS",
            &mut self.audio.background_voice_hold_ms,
        )?;
        override_from(
            &lookup,
            "VIGIL_AUDIO_LOUD_AUDIO_HOLD_MS",
            &mut self.audio.loud_audio_hold_ms,
        )?;
        override_from(
            &lookup,
            "VIGIL_CALIBRATION_WINDOW_MS",
            &mut self.calibration.window_ms,
        )?;

        // Objects
        override_from(
            &lookup,
            "VIGIL_OBJECTS_MIN_CONFIDENCE",
            &mut self.objects.min_confidence,
        )?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Vision validation
        if self.vision.tick_ms == 0 {
            return Err(ConfigError::Validation(
                "vision.tick_ms must be > 0".to_string(),
            ));
        }
        if self.vision.no_face_timeout_ms == 0 || self.vision.look_away_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "vision timeouts must be > 0".to_string(),
            ));
        }

        // Gaze validation
        let gaze_ok = |v: f32| v.is_finite() && v > 0.0 && v <= 5.0;
        if !gaze_ok(self.gaze.horizontal_threshold) || !gaze_ok(self.gaze.vertical_threshold) {
            return Err(ConfigError::Validation(
                "gaze thresholds must be in (0, 5]".to_string(),
            ));
        }

        // Mouth validation
        if !self.mouth.closed_threshold.is_finite() || self.mouth.closed_threshold <= 0.0 {
            return Err(ConfigError::Validation(
                "mouth.closed_threshold must be positive".to_string(),
            ));
        }
        if self.mouth.min_points < 12 {
            return Err(ConfigError::Validation(
                "mouth.min_points must be at least 12".to_string(),
            ));
        }

        // Audio validation
        if self.audio.tick_ms == 0 {
            return Err(ConfigError::Validation(
                "audio.tick_ms must be > 0".to_string(),
            ));
        }
        if !(self.audio.band_low_hz >= 0.0 && self.audio.band_low_hz < self.audio.band_high_hz) {
            return Err(ConfigError::Validation(
                "audio.band_low_hz must be >= 0 and < band_high_hz".to_string(),
            ));
        }
        if !(self.audio.highpass_hz > 0.0 && self.audio.highpass_hz < self.audio.lowpass_hz)
            || !self.audio.lowpass_hz.is_finite()
        {
            return Err(ConfigError::Validation(
                "audio.highpass_hz must be > 0 and < lowpass_hz".to_string(),
            ));
        }
        if self.audio.background_voice_hold_ms == 0 || self.audio.loud_audio_hold_ms == 0 {
            return Err(ConfigError::Validation(
                "audio hold durations must be > 0".to_string(),
            ));
        }

        // Calibration validation
        let c = &self.calibration;
        if c.rms_floor < 0.0 || c.rms_floor > c.rms_ceiling {
            return Err(ConfigError::Validation(
                "calibration.rms_floor must be in [0, rms_ceiling]".to_string(),
            ));
        }
        if c.fallback_rms <= 0.0 || c.rms_gain <= 0.0 || c.very_loud_rms_gain <= 0.0 {
            return Err(ConfigError::Validation(
                "calibration gains and fallback_rms must be positive".to_string(),
            ));
        }

        // Object validation
        if self.objects.labels.is_empty() {
            return Err(ConfigError::Validation(
                "objects.labels must not be empty".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.objects.min_confidence) {
            return Err(ConfigError::Validation(
                "objects.min_confidence must be in [0, 1)".to_string(),
            ));
        }

        Ok(())
    }

    /// Export configuration to TOML string
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}
