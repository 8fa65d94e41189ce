#[cfg(test)]
mod tests {
    use crate::config::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::{NamedTempFile, TempDir};

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_valid() {
        let config = VigilConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.vision.tick_ms, 1_000);
        assert_eq!(config.vision.no_face_timeout_ms, 10_000);
        assert_eq!(config.audio.tick_ms, 250);
        assert_eq!(config.audio.cooldown_ms, 5_000);
    }

    #[test]
    fn test_config_validation_vision() {
        let mut config = VigilConfig::default();
        config.vision.tick_ms = 0;
        assert!(config.validate().is_err());

        config.vision.tick_ms = 1_000;
        config.vision.look_away_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_audio_band() {
        let mut config = VigilConfig::default();
        config.audio.band_low_hz = 9_000.0;
        config.audio.band_high_hz = 40.0;
        assert!(config.validate().is_err());

        config.audio.band_low_hz = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_speech_band() {
        let mut config = VigilConfig::default();
        assert_eq!(config.audio.speech_band().highpass_hz, 80.0);
        assert_eq!(config.audio.speech_band().lowpass_hz, 8_000.0);

        config.audio.highpass_hz = 9_000.0;
        assert!(config.validate().is_err());

        config.audio.highpass_hz = 0.0;
        assert!(config.validate().is_err());

        config.audio.highpass_hz = 80.0;
        config.audio.lowpass_hz = f32::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_mouth_points() {
        let mut config = VigilConfig::default();
        config.mouth.min_points = 11;
        assert!(config.validate().is_err());

        config.mouth.min_points = 12;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_objects() {
        let mut config = VigilConfig::default();
        config.objects.labels.clear();
        assert!(config.validate().is_err());

        let mut config = VigilConfig::default();
        config.objects.min_confidence = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_gaze() {
        let mut config = VigilConfig::default();
        config.gaze.horizontal_threshold = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_to_toml_string() {
        let config = VigilConfig::default();
        let toml = config.to_toml_string().unwrap();
        assert!(toml.contains("[vision]"));
        assert!(toml.contains("[audio]"));
        assert!(toml.contains("no_face_timeout_ms = 10000"));

        let parsed = VigilConfig::from_toml_str(&toml).unwrap();
        assert_eq!(parsed.audio.loud_audio_hold_ms, 600);
        assert_eq!(parsed.objects.labels, config.objects.labels);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = VigilConfig::from_toml_str(
            r#"
            [vision]
            no_face_timeout_ms = 20000
            "#,
        )
        .unwrap();
        assert_eq!(config.vision.no_face_timeout_ms, 20_000);
        assert_eq!(config.vision.tick_ms, 1_000);
        assert_eq!(config.audio.background_voice_hold_ms, 700);
    }

    #[test]
    fn test_config_from_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            "[audio]\ncooldown_ms = 8000\n\n[objects]\nlabels = [\"phone\"]\nmin_confidence = 0.6\n",
        )
        .unwrap();

        let config = VigilConfig::from_file(file.path()).unwrap();
        assert_eq!(config.audio.cooldown_ms, 8_000);
        assert_eq!(config.objects.labels, vec!["phone".to_string()]);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "[vision]\ntick_ms = 0\n").unwrap();
        assert!(matches!(
            VigilConfig::from_file(file.path()),
            Err(ConfigError::Validation(_))
        ));

        fs::write(file.path(), "[vision\n").unwrap();
        assert!(matches!(
            VigilConfig::from_file(file.path()),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = VigilConfig::from_file(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vigil.toml");
        let mut config = VigilConfig::default();
        config.vision.look_away_timeout_ms = 7_000;
        config.save_to_file(&path).unwrap();

        let loaded = VigilConfig::from_file(&path).unwrap();
        assert_eq!(loaded.vision.look_away_timeout_ms, 7_000);
    }

    #[test]
    fn test_load_layered_user_overrides_default() {
        let dir = TempDir::new().unwrap();
        let default_path = dir.path().join("default.toml");
        let user_path = dir.path().join("user.toml");
        fs::write(
            &default_path,
            "[vision]\nno_face_timeout_ms = 12000\nlook_away_timeout_ms = 6000\n",
        )
        .unwrap();
        fs::write(&user_path, "[vision]\nlook_away_timeout_ms = 4000\n").unwrap();

        let config = VigilConfig::load_layered(Some(default_path.as_path()), Some(user_path.as_path())).unwrap();
        assert_eq!(config.vision.no_face_timeout_ms, 12_000);
        assert_eq!(config.vision.look_away_timeout_ms, 4_000);
    }

    #[test]
    fn test_load_layered_missing_files_use_defaults() {
        let dir = TempDir::new().unwrap();
        let config = VigilConfig::load_layered(
            Some(dir.path().join("nope.toml").as_path()),
            Some(dir.path().join("nope2.toml").as_path()),
        )
        .unwrap();
        assert_eq!(config.vision.tick_ms, 1_000);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = VigilConfig::default();
        config
            .apply_env_overrides_from(lookup(&[
                ("VIGIL_VISION_TICK_MS", "500"),
                ("VIGIL_AUDIO_COOLDOWN_MS", " 3000 "),
                ("VIGIL_GAZE_HORIZONTAL_THRESHOLD", "0.4"),
                ("VIGIL_AUDIO_HIGHPASS_HZ", "100"),
            ]))
            .unwrap();
        assert_eq!(config.vision.tick_ms, 500);
        assert_eq!(config.audio.cooldown_ms, 3_000);
        assert!((config.gaze.horizontal_threshold - 0.4).abs() < 1e-6);
        assert_eq!(config.audio.highpass_hz, 100.0);
        assert_eq!(config.audio.tick_ms, 250);
    }

    #[test]
    fn test_env_override_parse_error() {
        let mut config = VigilConfig::default();
        let err = config
            .apply_env_overrides_from(lookup(&[("VIGIL_AUDIO_TICK_MS", "fast")]))
            .unwrap_err();
        match err {
            ConfigError::Validation(msg) => assert!(msg.contains("VIGIL_AUDIO_TICK_MS")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
