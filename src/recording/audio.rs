//! Post-hoc audio muxing

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::command::{audio_mux_args, run_to_completion, with_suffix, AUDIO_SUFFIX};
use crate::errors::Result;

/// What an audio mux request did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioMuxOutcome {
    /// The audio source was not an existing file; nothing ran
    Skipped,
    /// The mux ran; the path is where its output was requested
    Done(PathBuf),
}

impl AudioMuxOutcome {
    /// 0 for skipped, 1 for done
    pub fn code(&self) -> u8 {
        match self {
            AudioMuxOutcome::Skipped => 0,
            AudioMuxOutcome::Done(_) => 1,
        }
    }

    pub fn output(&self) -> Option<&Path> {
        match self {
            AudioMuxOutcome::Skipped => None,
            AudioMuxOutcome::Done(path) => Some(path),
        }
    }
}

/// Merge `audio_src` into `video`, writing `<stem>_audio.<ext>` next to it.
///
/// The video stream is copied verbatim. The child's own exit status is not
/// inspected; only a failure to launch it is an error.
pub fn mux_audio(ffmpeg: &Path, video: &Path, audio_src: &Path) -> Result<AudioMuxOutcome> {
    if !audio_src.is_file() {
        log::debug!("Audio source {:?} not found, skipping mux", audio_src);
        return Ok(AudioMuxOutcome::Skipped);
    }

    let output = with_suffix(video, AUDIO_SUFFIX);
    let args = audio_mux_args(video, audio_src, &output);
    let status = run_to_completion(ffmpeg, &args)?;
    log::debug!("Audio mux into {:?} exited with {}", output, status);

    Ok(AudioMuxOutcome::Done(output))
}
