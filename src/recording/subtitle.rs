//! Per-frame caption track and SubRip rendering

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assert_invariant;
use crate::errors::{RecorderError, Result};

/// Timecodes have a two-digit hour field
pub const MAX_TIMECODE_SECS: f64 = 100.0 * 3600.0;

/// How captions are attached to the finished video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubtitleMode {
    /// Separate text stream; video and audio are stream-copied
    Soft,
    /// Rendered into the pixels; the video is re-encoded
    BurnIn,
}

/// One caption with its display window in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    pub index: u64,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Ordered caption entries driven by an internal clock.
///
/// The clock advances by one frame period per entry; it describes intended
/// caption boundaries, not decoded frame timestamps. Skipped frames simply
/// get no entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubtitleTrack {
    entries: Vec<SubtitleEntry>,
    clock: f64,
    next_index: u64,
}

impl SubtitleTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a caption lasting one frame at `fps`.
    ///
    /// `text` is stored as given; an empty caption renders as an empty
    /// SubRip text line.
    pub fn add_entry(&mut self, text: impl Into<String>, fps: f64) -> Result<&SubtitleEntry> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(RecorderError::InvalidArgument(format!(
                "subtitle fps must be positive, got {}",
                fps
            )));
        }

        let step = 1.0 / fps;
        let start = self.clock;
        let end = start + step;
        if end <= start {
            return Err(RecorderError::InvalidArgument(format!(
                "a frame at {} fps no longer advances the caption clock at {}s",
                fps, start
            )));
        }

        assert_invariant!(
            end > start,
            "Subtitle end must follow its start",
            "SubtitleTrack::add_entry"
        );
        assert_invariant!(
            self.entries.last().map_or(true, |e| e.index + 1 == self.next_index),
            "Subtitle indices must be contiguous",
            "SubtitleTrack::add_entry"
        );

        self.entries.push(SubtitleEntry {
            index: self.next_index,
            start,
            end,
            text: text.into(),
        });
        self.clock = end;
        self.next_index += 1;

        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn entries(&self) -> &[SubtitleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current position of the caption clock in seconds
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Render as SubRip text
    pub fn to_srt(&self) -> Result<String> {
        let mut out = String::new();
        for entry in &self.entries {
            let _ = write!(
                out,
                "{}\n{} --> {}\n{}\n\n",
                entry.index,
                seconds_to_timecode(entry.start)?,
                seconds_to_timecode(entry.end)?,
                entry.text
            );
        }
        Ok(out)
    }

    pub fn write_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let srt = self.to_srt()?;
        fs::write(path, srt).map_err(|e| {
            RecorderError::Io(format!("Failed to write caption file {:?}: {}", path, e))
        })?;
        log::debug!("Wrote {} captions to {:?}", self.entries.len(), path);
        Ok(())
    }
}

/// Format seconds as `HH:MM:SS,mmm`, truncating sub-millisecond time
pub fn seconds_to_timecode(secs: f64) -> Result<String> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(RecorderError::Timecode(format!(
            "cannot represent {} seconds",
            secs
        )));
    }
    if secs >= MAX_TIMECODE_SECS {
        return Err(RecorderError::Timecode(format!(
            "{} seconds exceeds the 99:59:59,999 limit",
            secs
        )));
    }

    let whole = secs.trunc();
    let total = whole as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    let millis = (((secs - whole) * 1000.0) as u64).min(999);

    Ok(format!(
        "{:02}:{:02}:{:02},{:03}",
        hours, minutes, seconds, millis
    ))
}
