//! Testing utilities
//!
//! Synthetic frames for driving a recorder, and stand-in encoder binaries so
//! the process plumbing can be exercised without a real ffmpeg install.

pub mod synthetic_data;

#[cfg(unix)]
mod fake_encoder;

pub use synthetic_data::{solid_frame, synthetic_video_frame};

#[cfg(unix)]
pub use fake_encoder::{exiting_encoder, fake_encoder};
