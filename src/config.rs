//! Settings file for the command-line front end
//!
//! The library never reads this on its own: a [`RecordingConfig`] is always
//! built explicitly. The CLI loads an optional TOML file and applies it as
//! defaults underneath its own flags.

use crate::errors::RecorderError;
use crate::recording::{RecordingConfig, VideoCodec, DEFAULT_SUBTITLE_LANGUAGE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root settings structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FfpipeSettings {
    pub encoder: EncoderSettings,
    pub recording: RecordingSettings,
    pub subtitles: SubtitleSettings,
}

/// Encoder binary and codec preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    /// Path or name of the ffmpeg binary
    pub ffmpeg_path: String,
    /// Codec override; empty means choose from hardware
    pub codec: String,
    /// Bitrate in Mbps; absent means estimate
    pub bitrate_mbps: Option<f64>,
}

/// Default frame geometry and rate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingSettings {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleSettings {
    /// Language tag for soft subtitle streams
    pub language: String,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            codec: String::new(),
            bitrate_mbps: None,
        }
    }
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 30.0,
        }
    }
}

impl Default for SubtitleSettings {
    fn default() -> Self {
        Self {
            language: DEFAULT_SUBTITLE_LANGUAGE.to_string(),
        }
    }
}

impl FfpipeSettings {
    /// Load settings from a TOML file; a missing file yields defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, RecorderError> {
        let path = path.as_ref();

        if !path.exists() {
            log::debug!("Settings file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            RecorderError::Config(format!("Failed to read settings file: {}", e))
        })?;

        let settings: FfpipeSettings = toml::from_str(&contents).map_err(|e| {
            RecorderError::Config(format!("Failed to parse settings file: {}", e))
        })?;

        log::debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), RecorderError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    RecorderError::Config(format!("Failed to create settings directory: {}", e))
                })?;
            }
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| {
            RecorderError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, toml_string).map_err(|e| {
            RecorderError::Config(format!("Failed to write settings file: {}", e))
        })?;

        log::debug!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from("ffpipe.toml")
    }

    /// Load from the default location, falling back to defaults on any error
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load settings, using defaults: {}", e);
            Self::default()
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.encoder.ffmpeg_path.trim().is_empty() {
            return Err("ffmpeg_path must not be empty".to_string());
        }
        if !self.encoder.codec.is_empty()
            && VideoCodec::from_ffmpeg_codec(&self.encoder.codec).is_none()
        {
            // a session would silently fall back to libx264
            return Err(format!("Unknown codec '{}'", self.encoder.codec));
        }
        if let Some(bitrate) = self.encoder.bitrate_mbps {
            if !(bitrate.is_finite() && bitrate > 0.0) {
                return Err("bitrate_mbps must be positive".to_string());
            }
        }
        if self.recording.width == 0 || self.recording.height == 0 {
            return Err("Invalid default resolution".to_string());
        }
        if !(self.recording.fps.is_finite() && self.recording.fps > 0.0) {
            return Err("fps must be positive".to_string());
        }
        if self.subtitles.language.trim().is_empty() {
            return Err("subtitle language must not be empty".to_string());
        }
        Ok(())
    }

    /// Build a session config for `output` from these settings
    pub fn recording_config<P: AsRef<Path>>(&self, output: P) -> RecordingConfig {
        let mut config = RecordingConfig::new(
            output,
            self.recording.width,
            self.recording.height,
            self.recording.fps,
        )
        .with_ffmpeg(&self.encoder.ffmpeg_path)
        .with_subtitle_language(self.subtitles.language.clone());

        if !self.encoder.codec.is_empty() {
            config = config.with_codec(self.encoder.codec.clone());
        }
        if let Some(bitrate) = self.encoder.bitrate_mbps {
            config = config.with_bitrate(bitrate);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_settings() {
        let settings = FfpipeSettings::default();
        assert_eq!(settings.encoder.ffmpeg_path, "ffmpeg");
        assert_eq!(settings.recording.fps, 30.0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let mut bad = FfpipeSettings::default();
        bad.encoder.codec = "h265_magic".to_string();
        assert!(bad.validate().is_err());

        let mut bad = FfpipeSettings::default();
        bad.recording.width = 0;
        assert!(bad.validate().is_err());

        let mut bad = FfpipeSettings::default();
        bad.encoder.bitrate_mbps = Some(0.0);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_settings_save_and_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("ffpipe.toml");

        let mut settings = FfpipeSettings::default();
        settings.encoder.codec = "hevc_vaapi".to_string();
        settings.recording.fps = 60.0;
        settings.save_to_file(&path).unwrap();

        let loaded = FfpipeSettings::load_from_file(&path).unwrap();
        assert_eq!(loaded.encoder.codec, "hevc_vaapi");
        assert_eq!(loaded.recording.fps, 60.0);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("ffpipe.toml");
        fs::write(&path, "[recording]\nwidth = 640\nheight = 480\n").unwrap();

        let loaded = FfpipeSettings::load_from_file(&path).unwrap();
        assert_eq!(loaded.recording.width, 640);
        assert_eq!(loaded.recording.fps, 30.0);
        assert_eq!(loaded.subtitles.language, "eng");
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("ffpipe.toml");
        fs::write(&path, "[recording\nwidth = ").unwrap();
        assert!(matches!(
            FfpipeSettings::load_from_file(&path),
            Err(RecorderError::Config(_))
        ));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = FfpipeSettings::load_from_file("nonexistent_ffpipe.toml");
        assert_eq!(result.unwrap().recording.width, 1280);
    }

    #[test]
    fn test_recording_config_from_settings() {
        let mut settings = FfpipeSettings::default();
        settings.encoder.bitrate_mbps = Some(3.5);
        let config = settings.recording_config("out.mp4");
        assert_eq!(config.dimensions.width, 1280);
        assert_eq!(config.bitrate_mbps, Some(3.5));
        assert_eq!(config.codec, None);
    }
}
