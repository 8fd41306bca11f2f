//! ffmpeg argument lists
//!
//! Every invocation is built as a list of arguments and handed straight to
//! [`std::process::Command`]; no shell ever re-parses them, so paths with
//! spaces or quotes need no special treatment.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use super::bitrate::format_bitrate_arg;
use super::codec::VideoCodec;
use super::config::{Dimensions, INPUT_PIXEL_FORMAT, OUTPUT_PIXEL_FORMAT};
use crate::errors::{RecorderError, Result};

/// Suffix inserted before the extension of the subtitled output
pub const SUBTITLE_SUFFIX: &str = "_with_sub";
/// Suffix inserted before the extension of the audio-muxed output
pub const AUDIO_SUFFIX: &str = "_audio";

/// Accumulates arguments in order
#[derive(Debug, Clone, Default)]
pub struct FfmpegArgs {
    args: Vec<OsString>,
}

impl FfmpegArgs {
    /// Starts with `-v quiet`, the logging level every invocation uses
    pub fn quiet() -> Self {
        Self::default().opt("-v", "quiet")
    }

    pub fn flag(mut self, flag: &str) -> Self {
        self.args.push(flag.into());
        self
    }

    pub fn opt<V: AsRef<OsStr>>(mut self, key: &str, value: V) -> Self {
        self.args.push(key.into());
        self.args.push(value.as_ref().to_os_string());
        self
    }

    pub fn input<P: AsRef<OsStr>>(self, source: P) -> Self {
        self.opt("-i", source)
    }

    pub fn output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.args.push(path.as_ref().as_os_str().to_os_string());
        self
    }

    pub fn build(self) -> Vec<OsString> {
        self.args
    }
}

/// Arguments for the live encode reading raw frames from stdin
pub fn encode_args(
    dimensions: Dimensions,
    fps: f64,
    codec: VideoCodec,
    bitrate_mbps: f64,
    output: &Path,
) -> Vec<OsString> {
    FfmpegArgs::quiet()
        .flag("-y")
        .opt("-s", dimensions.size_arg())
        .opt("-pixel_format", INPUT_PIXEL_FORMAT)
        .opt("-f", "rawvideo")
        .opt("-r", fps.to_string())
        .input("pipe:")
        .opt("-vcodec", codec.as_ffmpeg_codec())
        .opt("-pix_fmt", OUTPUT_PIXEL_FORMAT)
        .opt("-b:v", format_bitrate_arg(bitrate_mbps))
        .output(output)
        .build()
}

/// Arguments adding captions as a separate text subtitle stream; the
/// existing streams are copied untouched
pub fn soft_subtitle_args(video: &Path, srt: &Path, language: &str, output: &Path) -> Vec<OsString> {
    FfmpegArgs::quiet()
        .flag("-y")
        .input(video)
        .input(srt)
        .opt("-c:v", "copy")
        .opt("-c:a", "copy")
        .opt("-c:s", "mov_text")
        .opt("-metadata:s:s:0", format!("language={}", language))
        .output(output)
        .build()
}

/// Arguments compositing captions into the pixels. This needs a full
/// re-encode, so the video stream is never copied here.
pub fn burn_in_subtitle_args(
    video: &Path,
    srt: &Path,
    codec: VideoCodec,
    bitrate_mbps: f64,
    output: &Path,
) -> Vec<OsString> {
    FfmpegArgs::quiet()
        .flag("-y")
        .input(video)
        .opt("-vf", subtitles_filter(srt))
        .opt("-vcodec", codec.as_ffmpeg_codec())
        .opt("-pix_fmt", OUTPUT_PIXEL_FORMAT)
        .opt("-b:v", format_bitrate_arg(bitrate_mbps))
        .opt("-c:a", "copy")
        .output(output)
        .build()
}

/// Arguments merging the first audio stream of `audio` (if it has one) with
/// the video stream of `video`
pub fn audio_mux_args(video: &Path, audio: &Path, output: &Path) -> Vec<OsString> {
    FfmpegArgs::quiet()
        .input(video)
        .input(audio)
        .opt("-c:v", "copy")
        .opt("-map", "0:v")
        .opt("-map", "1:a?")
        .flag("-y")
        .output(output)
        .build()
}

/// `subtitles=<path>` with the path escaped for both the option parser and
/// the filtergraph parser
fn subtitles_filter(srt: &Path) -> String {
    let raw = srt.to_string_lossy();
    let mut option_level = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '\'' | ':') {
            option_level.push('\\');
        }
        option_level.push(c);
    }

    let mut graph_level = String::with_capacity(option_level.len());
    for c in option_level.chars() {
        if matches!(c, '\\' | '\'' | '[' | ']' | ',' | ';') {
            graph_level.push('\\');
        }
        graph_level.push(c);
    }

    format!("subtitles={}", graph_level)
}

/// `dir/name.ext` -> `dir/name<suffix>.ext`; a path with no extension just
/// gets the suffix appended
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default();
    let mut name = stem.to_os_string();
    name.push(suffix);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

/// Run a one-shot ffmpeg invocation to completion and hand back its exit
/// status without judging it
pub fn run_to_completion(ffmpeg: &Path, args: &[OsString]) -> Result<ExitStatus> {
    log::debug!("Running {:?} {:?}", ffmpeg, args);
    let mut child = spawn_retrying(
        Command::new(ffmpeg)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null()),
    )
    .map_err(|e| RecorderError::StartupFailure(format!("Failed to run {:?}: {}", ffmpeg, e)))?;
    let status = child.wait().map_err(|e| {
        RecorderError::EncoderExit(format!("Failed to wait for {:?}: {}", ffmpeg, e))
    })?;
    log::debug!("{:?} finished with {}", ffmpeg, status);
    Ok(status)
}

const SPAWN_ATTEMPTS: u64 = 5;

/// Spawn `command`, retrying while the binary is still open for writing
/// elsewhere (`ETXTBSY`)
pub(crate) fn spawn_retrying(command: &mut Command) -> io::Result<Child> {
    let mut attempt = 1;
    loop {
        match command.spawn() {
            Err(e) if is_executable_busy(&e) && attempt < SPAWN_ATTEMPTS => {
                log::debug!("Executable busy, retrying spawn ({}/{})", attempt, SPAWN_ATTEMPTS);
                thread::sleep(Duration::from_millis(10 * attempt));
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[cfg(unix)]
fn is_executable_busy(e: &io::Error) -> bool {
    // ETXTBSY on Linux and the BSDs
    e.raw_os_error() == Some(26)
}

#[cfg(not(unix))]
fn is_executable_busy(_e: &io::Error) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_busy_executable_is_retryable() {
        assert!(is_executable_busy(&io::Error::from_raw_os_error(26)));
        assert!(!is_executable_busy(&io::Error::from(io::ErrorKind::NotFound)));
    }

    #[test]
    fn test_spawn_retrying_reports_missing_binary() {
        let result = spawn_retrying(&mut Command::new("/nonexistent/ffpipe-test-binary"));
        assert_eq!(result.err().map(|e| e.kind()), Some(io::ErrorKind::NotFound));
    }

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_encode_args_layout() {
        let args = strings(encode_args(
            Dimensions::new(1280, 720),
            30.0,
            VideoCodec::Libx264,
            2.222,
            Path::new("/tmp/my video.mp4"),
        ));

        assert_eq!(
            args,
            vec![
                "-v", "quiet", "-y", "-s", "1280x720", "-pixel_format", "bgr24", "-f",
                "rawvideo", "-r", "30", "-i", "pipe:", "-vcodec", "libx264", "-pix_fmt",
                "yuv420p", "-b:v", "2.222M", "/tmp/my video.mp4",
            ]
        );
    }

    #[test]
    fn test_encode_args_fractional_fps() {
        let args = strings(encode_args(
            Dimensions::new(2, 2),
            29.97,
            VideoCodec::HevcNvenc,
            1.0,
            Path::new("o.mp4"),
        ));
        assert_eq!(args[10], "29.97");
        assert_eq!(args[14], "hevc_nvenc");
    }

    #[test]
    fn test_soft_subtitle_args() {
        let args = strings(soft_subtitle_args(
            Path::new("v.mp4"),
            Path::new("v_with_sub.srt"),
            "eng",
            Path::new("v_with_sub.mp4"),
        ));
        assert!(args.windows(2).any(|w| w == ["-c:v", "copy"]));
        assert!(args.windows(2).any(|w| w == ["-c:s", "mov_text"]));
        assert!(args.windows(2).any(|w| w == ["-metadata:s:s:0", "language=eng"]));
        assert_eq!(args.last().unwrap(), "v_with_sub.mp4");
    }

    #[test]
    fn test_burn_in_never_copies_video() {
        let args = strings(burn_in_subtitle_args(
            Path::new("v.mp4"),
            Path::new("/tmp/subs/v.srt"),
            VideoCodec::Libx264,
            5.0,
            Path::new("v_with_sub.mp4"),
        ));
        assert!(!args.windows(2).any(|w| w == ["-c:v", "copy"]));
        assert!(args.windows(2).any(|w| w == ["-vf", "subtitles=/tmp/subs/v.srt"]));
        assert!(args.windows(2).any(|w| w == ["-vcodec", "libx264"]));
    }

    #[test]
    fn test_subtitles_filter_escaping() {
        assert_eq!(
            subtitles_filter(Path::new("C:/caps/it's.srt")),
            "subtitles=C\\\\:/caps/it\\\\\\'s.srt"
        );
    }

    #[test]
    fn test_audio_mux_args() {
        let args = strings(audio_mux_args(
            Path::new("v.mp4"),
            Path::new("track.wav"),
            Path::new("v_audio.mp4"),
        ));
        assert_eq!(
            args,
            vec![
                "-v", "quiet", "-i", "v.mp4", "-i", "track.wav", "-c:v", "copy", "-map",
                "0:v", "-map", "1:a?", "-y", "v_audio.mp4",
            ]
        );
    }

    #[test]
    fn test_with_suffix() {
        assert_eq!(
            with_suffix(Path::new("/data/run.mp4"), SUBTITLE_SUFFIX),
            PathBuf::from("/data/run_with_sub.mp4")
        );
        assert_eq!(
            with_suffix(Path::new("clip.v2.mkv"), AUDIO_SUFFIX),
            PathBuf::from("clip.v2_audio.mkv")
        );
        assert_eq!(with_suffix(Path::new("raw"), "_x"), PathBuf::from("raw_x"));
    }
}
