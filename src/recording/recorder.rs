//! Recording session owning the encoder child process

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::audio::{self, AudioMuxOutcome};
use super::bitrate::resolve_bitrate;
use super::codec::{select_codec, VideoCodec};
use super::command::{
    burn_in_subtitle_args, encode_args, run_to_completion, soft_subtitle_args, spawn_retrying,
    with_suffix, SUBTITLE_SUFFIX,
};
use super::config::{RecordingConfig, RecordingStats};
use super::subtitle::{SubtitleMode, SubtitleTrack};
use crate::assert_invariant;
use crate::errors::{RecorderError, Result};
use crate::platform::{DeviceProbe, HardwareHints, SystemDeviceProbe};

/// Lifecycle of a [`Recorder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Configured, no encoder running yet
    Created,
    /// Encoder running and accepting frames
    Recording,
    /// Encoder input closed; post-processing is allowed
    Stopped,
}

/// Streams raw frames into an ffmpeg child through its stdin.
///
/// Every call blocks: a frame write waits on pipe backpressure, `stop` waits
/// for the encoder to exit, and the mux calls wait for their own child.
pub struct Recorder {
    config: RecordingConfig,
    state: SessionState,
    hints: Option<HardwareHints>,
    probe: Box<dyn DeviceProbe>,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    codec: Option<VideoCodec>,
    bitrate_mbps: Option<f64>,
    frame_count: u64,
    bytes_written: u64,
    started_at: Option<DateTime<Utc>>,
    start_instant: Option<Instant>,
    subtitles: SubtitleTrack,
    subtitles_flushed: bool,
}

impl Recorder {
    /// Create a session in the `Created` state; nothing is spawned yet
    pub fn new(config: RecordingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: SessionState::Created,
            hints: None,
            probe: Box::new(SystemDeviceProbe),
            child: None,
            stdin: None,
            codec: None,
            bitrate_mbps: None,
            frame_count: 0,
            bytes_written: 0,
            started_at: None,
            start_instant: None,
            subtitles: SubtitleTrack::new(),
            subtitles_flushed: false,
        })
    }

    /// Create and immediately start a session
    pub fn record(config: RecordingConfig) -> Result<Self> {
        let mut recorder = Self::new(config)?;
        recorder.start()?;
        Ok(recorder)
    }

    /// Use these hardware hints instead of inspecting the host
    pub fn with_hints(mut self, hints: HardwareHints) -> Self {
        self.hints = Some(hints);
        self
    }

    /// Use this probe for GPU vendor lookups
    pub fn with_probe<P: DeviceProbe + 'static>(mut self, probe: P) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Resolve codec and bitrate, then launch the encoder
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            SessionState::Recording => return Err(RecorderError::already_started()),
            SessionState::Stopped => return Err(RecorderError::already_stopped()),
            SessionState::Created => {}
        }

        let hints = self.hints.unwrap_or_else(HardwareHints::detect);
        let codec = select_codec(self.config.codec.as_deref(), &hints, self.probe.as_ref());
        let dims = self.config.dimensions;
        let bitrate = resolve_bitrate(self.config.bitrate_mbps, dims, self.config.fps);

        log::info!(
            "Using video codec: {}, os: {}, height: {}, width: {}, fps: {}.",
            codec,
            hints.platform,
            dims.height,
            dims.width,
            self.config.fps
        );

        let args = encode_args(dims, self.config.fps, codec, bitrate, &self.config.output_path);
        log::debug!("Spawning encoder {:?} {:?}", self.config.ffmpeg_path, args);

        let mut child = spawn_retrying(
            Command::new(&self.config.ffmpeg_path)
                .args(&args)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null()),
        )
        .map_err(|e| {
            RecorderError::StartupFailure(format!(
                "Failed to start encoder {:?}: {}",
                self.config.ffmpeg_path, e
            ))
        })?;

        let stdin = match child.stdin.take() {
            Some(stdin) => stdin,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RecorderError::StartupFailure(
                    "Failed to capture encoder stdin".to_string(),
                ));
            }
        };

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.codec = Some(codec);
        self.bitrate_mbps = Some(bitrate);
        self.started_at = Some(Utc::now());
        self.start_instant = Some(Instant::now());
        self.state = SessionState::Recording;
        Ok(())
    }

    /// Pipe one raw `bgr24` frame to the encoder.
    ///
    /// A buffer of the wrong length is rejected before anything reaches the
    /// pipe, so the next correct frame is still accepted.
    pub fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        match self.state {
            SessionState::Created => return Err(RecorderError::not_started()),
            SessionState::Stopped => return Err(RecorderError::stopped()),
            SessionState::Recording => {}
        }

        let expected = self.config.dimensions.frame_len();
        if frame.len() != expected {
            return Err(RecorderError::InvalidFrame {
                expected,
                actual: frame.len(),
            });
        }

        let stdin = self.stdin.as_mut().ok_or_else(RecorderError::stopped)?;
        stdin.write_all(frame).map_err(|e| {
            RecorderError::WriteFailure(format!(
                "Failed to write frame {}: {}",
                self.frame_count, e
            ))
        })?;

        self.frame_count += 1;
        self.bytes_written += expected as u64;

        assert_invariant!(
            self.bytes_written == self.frame_count * expected as u64,
            "Bytes written must be a whole number of frames",
            "Recorder::write_frame"
        );

        Ok(())
    }

    /// Close the encoder input and wait for it to finish
    pub fn stop(&mut self) -> Result<RecordingStats> {
        match self.state {
            SessionState::Created => return Err(RecorderError::not_started()),
            SessionState::Stopped => return Err(RecorderError::already_stopped()),
            SessionState::Recording => {}
        }
        self.state = SessionState::Stopped;

        // EOF on stdin tells ffmpeg to flush and finalise the container
        drop(self.stdin.take());

        let mut child = self.child.take().ok_or_else(RecorderError::not_started)?;
        let status = child.wait().map_err(|e| {
            RecorderError::EncoderExit(format!("Failed to wait for encoder: {}", e))
        })?;
        log::debug!(
            "Encoder finished with {} after {} frames",
            status,
            self.frame_count
        );

        if !status.success() {
            return Err(RecorderError::EncoderExit(format!(
                "{} after {} frames",
                status, self.frame_count
            )));
        }

        Ok(self.stats())
    }

    /// Close the pipe and kill the encoder. The output file may be unusable.
    pub fn abort(&mut self) {
        if self.state != SessionState::Recording {
            return;
        }
        self.state = SessionState::Stopped;
        drop(self.stdin.take());

        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                log::warn!("Failed to kill encoder: {}", e);
            }
            let _ = child.wait();
        }
        log::debug!("Recording aborted after {} frames", self.frame_count);
    }

    /// Record a one-frame caption on the session's subtitle track.
    ///
    /// Allowed in any state until the track has been flushed by
    /// [`mux_subtitles`](Self::mux_subtitles).
    pub fn add_subtitle(&mut self, text: impl Into<String>, fps: f64) -> Result<()> {
        if self.subtitles_flushed {
            return Err(RecorderError::InvalidState(
                "subtitle track was already flushed".to_string(),
            ));
        }
        self.subtitles.add_entry(text, fps).map(|_| ())
    }

    /// Write the caption file and attach it to the finished video.
    ///
    /// Flushes the track: later `add_subtitle` calls are rejected, while
    /// muxing again reuses the same entries. Returns the mux child's exit
    /// status; a non-zero status is not an error here and is for the caller
    /// to inspect.
    pub fn mux_subtitles(&mut self, mode: SubtitleMode) -> Result<ExitStatus> {
        self.require_stopped("subtitle mux")?;

        let video = &self.config.output_path;
        let output = self.subtitled_output_path();
        let srt = self.caption_file_path();
        self.subtitles.write_srt(&srt)?;
        self.subtitles_flushed = true;

        let args = match mode {
            SubtitleMode::Soft => {
                soft_subtitle_args(video, &srt, &self.config.subtitle_language, &output)
            }
            SubtitleMode::BurnIn => burn_in_subtitle_args(
                video,
                &srt,
                self.codec.unwrap_or(VideoCodec::FALLBACK),
                self.bitrate_mbps.unwrap_or_default(),
                &output,
            ),
        };

        run_to_completion(&self.config.ffmpeg_path, &args)
    }

    /// Merge an audio file into the finished video
    pub fn mux_audio<P: AsRef<Path>>(&self, audio_src: P) -> Result<AudioMuxOutcome> {
        self.require_stopped("audio mux")?;
        audio::mux_audio(
            &self.config.ffmpeg_path,
            &self.config.output_path,
            audio_src.as_ref(),
        )
    }

    fn require_stopped(&self, operation: &str) -> Result<()> {
        if self.state == SessionState::Stopped {
            Ok(())
        } else {
            Err(RecorderError::InvalidState(format!(
                "{} requires a stopped session",
                operation
            )))
        }
    }

    fn stats(&self) -> RecordingStats {
        RecordingStats {
            frames_written: self.frame_count,
            bytes_written: self.bytes_written,
            codec: self
                .codec
                .map(|c| c.as_ffmpeg_codec().to_string())
                .unwrap_or_default(),
            bitrate_mbps: self.bitrate_mbps.unwrap_or_default(),
            fps: self.config.fps,
            width: self.config.dimensions.width,
            height: self.config.dimensions.height,
            output_path: self.config.output_path.clone(),
            started_at: self.started_at.unwrap_or_else(Utc::now),
            duration_secs: self
                .start_instant
                .map(|start| start.elapsed().as_secs_f64())
                .unwrap_or(0.0),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }

    /// Codec chosen at start
    pub fn codec(&self) -> Option<VideoCodec> {
        self.codec
    }

    /// Bitrate resolved at start, in Mbps
    pub fn bitrate_mbps(&self) -> Option<f64> {
        self.bitrate_mbps
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn config(&self) -> &RecordingConfig {
        &self.config
    }

    pub fn output_path(&self) -> &Path {
        &self.config.output_path
    }

    pub fn subtitles(&self) -> &SubtitleTrack {
        &self.subtitles
    }

    /// Where `mux_subtitles` writes its video
    pub fn subtitled_output_path(&self) -> PathBuf {
        with_suffix(&self.config.output_path, SUBTITLE_SUFFIX)
    }

    /// Where `mux_subtitles` writes the SubRip file
    pub fn caption_file_path(&self) -> PathBuf {
        self.subtitled_output_path().with_extension("srt")
    }
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("state", &self.state)
            .field("output_path", &self.config.output_path)
            .field("codec", &self.codec)
            .field("bitrate_mbps", &self.bitrate_mbps)
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if self.state == SessionState::Recording {
            log::warn!("Recorder dropped while recording; aborting encoder");
            self.abort();
        }
    }
}
