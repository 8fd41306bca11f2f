//! Recording configuration types

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{RecorderError, Result};

/// Bytes per pixel of the raw input frames (bgr24)
pub const BYTES_PER_PIXEL: usize = 3;
/// Pixel layout the encoder is told to expect on stdin
pub const INPUT_PIXEL_FORMAT: &str = "bgr24";
/// Pixel format of the encoded stream (4:2:0 chroma subsampling)
pub const OUTPUT_PIXEL_FORMAT: &str = "yuv420p";
/// Default subtitle language tag for soft-muxed captions
pub const DEFAULT_SUBTITLE_LANGUAGE: &str = "eng";

/// Frame geometry, fixed for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Exact byte length of one raw frame
    pub fn frame_len(&self) -> usize {
        self.pixel_count() as usize * BYTES_PER_PIXEL
    }

    /// `WIDTHxHEIGHT`, as used by `-s`
    pub fn size_arg(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

/// Configuration for one recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    pub dimensions: Dimensions,
    /// Input and output frame rate
    pub fps: f64,
    /// Target bitrate in Mbps; estimated from geometry when absent
    pub bitrate_mbps: Option<f64>,
    /// Requested codec identifier; chosen from the hardware when absent
    pub codec: Option<String>,
    pub output_path: PathBuf,
    /// Encoder binary, resolved through `PATH` when not absolute
    pub ffmpeg_path: PathBuf,
    /// Language tag written on soft subtitle streams
    pub subtitle_language: String,
}

impl RecordingConfig {
    pub fn new<P: AsRef<Path>>(output_path: P, width: u32, height: u32, fps: f64) -> Self {
        Self {
            dimensions: Dimensions::new(width, height),
            fps,
            bitrate_mbps: None,
            codec: None,
            output_path: output_path.as_ref().to_path_buf(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            subtitle_language: DEFAULT_SUBTITLE_LANGUAGE.to_string(),
        }
    }

    /// Set an explicit bitrate in Mbps
    pub fn with_bitrate(mut self, mbps: f64) -> Self {
        self.bitrate_mbps = Some(mbps);
        self
    }

    /// Request a codec by ffmpeg identifier
    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = Some(codec.into());
        self
    }

    /// Use a specific encoder binary
    pub fn with_ffmpeg<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.ffmpeg_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_subtitle_language(mut self, language: impl Into<String>) -> Self {
        self.subtitle_language = language.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.dimensions.is_valid() {
            return Err(RecorderError::InvalidArgument(format!(
                "dimensions must be positive, got {}",
                self.dimensions.size_arg()
            )));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(RecorderError::InvalidArgument(format!(
                "fps must be positive, got {}",
                self.fps
            )));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(RecorderError::InvalidArgument(
                "output path is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Summary returned by a successful stop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingStats {
    pub frames_written: u64,
    pub bytes_written: u64,
    pub codec: String,
    pub bitrate_mbps: f64,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub output_path: PathBuf,
    pub started_at: DateTime<Utc>,
    /// Wall-clock time between start and stop
    pub duration_secs: f64,
}

impl RecordingStats {
    /// Length of the encoded video implied by the frame count
    pub fn media_duration_secs(&self) -> f64 {
        if self.fps > 0.0 {
            self.frames_written as f64 / self.fps
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_len() {
        assert_eq!(Dimensions::new(1280, 720).frame_len(), 1280 * 720 * 3);
        assert_eq!(Dimensions::new(1280, 720).size_arg(), "1280x720");
    }

    #[test]
    fn test_config_defaults() {
        let config = RecordingConfig::new("out.mp4", 640, 480, 30.0);
        assert_eq!(config.bitrate_mbps, None);
        assert_eq!(config.codec, None);
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.subtitle_language, "eng");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builders() {
        let config = RecordingConfig::new("out.mp4", 640, 480, 30.0)
            .with_bitrate(4.5)
            .with_codec("hevc_vaapi")
            .with_ffmpeg("/opt/ffmpeg/bin/ffmpeg")
            .with_subtitle_language("fra");
        assert_eq!(config.bitrate_mbps, Some(4.5));
        assert_eq!(config.codec.as_deref(), Some("hevc_vaapi"));
        assert_eq!(config.ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.subtitle_language, "fra");
    }

    #[test]
    fn test_config_validation() {
        assert!(RecordingConfig::new("out.mp4", 0, 480, 30.0).validate().is_err());
        assert!(RecordingConfig::new("out.mp4", 640, 480, 0.0).validate().is_err());
        assert!(RecordingConfig::new("out.mp4", 640, 480, f64::NAN).validate().is_err());
        assert!(RecordingConfig::new("", 640, 480, 30.0).validate().is_err());
    }

    #[test]
    fn test_media_duration() {
        let stats = RecordingStats {
            frames_written: 90,
            bytes_written: 0,
            codec: "libx264".to_string(),
            bitrate_mbps: 1.0,
            fps: 30.0,
            width: 2,
            height: 2,
            output_path: PathBuf::from("out.mp4"),
            started_at: Utc::now(),
            duration_secs: 0.0,
        };
        assert_eq!(stats.media_duration_secs(), 3.0);
    }
}
