//! ffpipe: record raw frames to compressed video through ffmpeg
//!
//! A [`Recorder`](recording::Recorder) owns an ffmpeg child process and pipes
//! raw `bgr24` frames into its stdin. The codec is picked from the host's
//! hardware (NVENC, AMF, VA-API or software x264) and the bitrate is estimated
//! from the frame geometry unless given. After stopping, captions recorded
//! alongside the frames and an external audio file can be muxed into copies of
//! the output.
//!
//! # Usage
//! ```rust,ignore
//! use ffpipe::recording::{Recorder, RecordingConfig};
//!
//! ffpipe::init_logging();
//! let mut recorder = Recorder::record(RecordingConfig::new("sim.mp4", 640, 480, 60.0))?;
//! for frame in simulation.frames() {
//!     recorder.write_frame(&frame)?;
//! }
//! let stats = recorder.stop()?;
//! ```
pub mod config;
pub mod errors;
pub mod invariant_ppt;
pub mod platform;
pub mod recording;

// Testing utilities - synthetic frames and stand-in encoders
pub mod testing;

// Re-exports for convenience
pub use config::FfpipeSettings;
pub use errors::{RecorderError, Result};
pub use platform::{DeviceProbe, GpuAdapter, HardwareHints, Platform};
pub use recording::{
    AudioMuxOutcome, Dimensions, Recorder, RecordingConfig, RecordingStats, SessionState,
    SubtitleMode, VideoCodec,
};

/// Detect the current platform
pub fn current_platform() -> Platform {
    Platform::current()
}

/// Initialize logging; defaults to `ffpipe=info` when `RUST_LOG` is unset
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("ffpipe=info");
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
        platform: Platform::current(),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub platform: Platform,
}
