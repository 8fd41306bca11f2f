//! Video recording through an external ffmpeg process
//!
//! Frames are piped as raw `bgr24` bytes into an ffmpeg child, which encodes
//! them with a codec picked from the host's hardware. Once the recording is
//! stopped, captions and an audio track can be muxed into copies of the file.
//!
//! # Example
//! ```rust,ignore
//! use ffpipe::recording::{Recorder, RecordingConfig, SubtitleMode};
//!
//! let config = RecordingConfig::new("output.mp4", 1280, 720, 30.0);
//! let mut recorder = Recorder::record(config)?;
//!
//! // In your frame loop:
//! recorder.write_frame(&bgr_bytes)?;
//! recorder.add_subtitle("t=0.0", 30.0)?;
//!
//! // When done:
//! let stats = recorder.stop()?;
//! recorder.mux_subtitles(SubtitleMode::Soft)?;
//! recorder.mux_audio("narration.wav")?;
//! ```

mod audio;
mod bitrate;
mod codec;
mod command;
mod config;
mod recorder;
mod subtitle;

pub use audio::{mux_audio, AudioMuxOutcome};
pub use bitrate::{estimate_bitrate, format_bitrate_arg, resolve_bitrate};
pub use codec::{select_codec, VideoCodec};
pub use command::{
    audio_mux_args, burn_in_subtitle_args, encode_args, soft_subtitle_args, with_suffix,
    FfmpegArgs, AUDIO_SUFFIX, SUBTITLE_SUFFIX,
};
pub use config::{
    Dimensions, RecordingConfig, RecordingStats, BYTES_PER_PIXEL, DEFAULT_SUBTITLE_LANGUAGE,
    INPUT_PIXEL_FORMAT, OUTPUT_PIXEL_FORMAT,
};
pub use recorder::{Recorder, SessionState};
pub use subtitle::{seconds_to_timecode, SubtitleEntry, SubtitleMode, SubtitleTrack};
