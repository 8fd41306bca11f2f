use std::io;

/// Errors surfaced by a recording session and its post-processing steps.
///
/// Device probing failures and unknown codec overrides have no variant here:
/// codec selection recovers from both.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("Encoder startup failure: {0}")]
    StartupFailure(String),

    #[error("Frame write failure: {0}")]
    WriteFailure(String),

    #[error("Invalid frame: expected {expected} bytes, got {actual}")]
    InvalidFrame { expected: usize, actual: usize },

    #[error("Invalid session state: {0}")]
    InvalidState(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Encoder exited with failure: {0}")]
    EncoderExit(String),

    #[error("Timecode error: {0}")]
    Timecode(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<io::Error> for RecorderError {
    fn from(e: io::Error) -> Self {
        RecorderError::Io(e.to_string())
    }
}

impl RecorderError {
    pub fn not_started() -> Self {
        RecorderError::InvalidState("session is not started".to_string())
    }

    pub fn already_started() -> Self {
        RecorderError::InvalidState("session is already started".to_string())
    }

    pub fn already_stopped() -> Self {
        RecorderError::InvalidState("session is already stopped".to_string())
    }

    pub fn stopped() -> Self {
        RecorderError::WriteFailure("session is stopped".to_string())
    }

    /// True for errors that end the session's ability to accept frames.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RecorderError::StartupFailure(_)
                | RecorderError::WriteFailure(_)
                | RecorderError::EncoderExit(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RecorderError>;
