//! FFmpeg CLI wrapper for still-image video rendering.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building for the fixed still+audio profile
//! - A bounded process runner (wall-clock timeout, stream capture, kill on
//!   overrun)
//! - The `Encoder` seam so the HTTP layer can be tested without FFmpeg
//! - Per-job workspace lifecycle with cleanup on every exit path

pub mod command;
pub mod encode;
pub mod error;
pub mod workspace;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner, DEFAULT_ENCODE_TIMEOUT_SECS};
pub use encode::{still_video_command, EncodeRequest, Encoder, FfmpegEncoder};
pub use error::{MediaError, MediaResult};
pub use workspace::JobWorkspace;

#[cfg(any(test, feature = "mocks"))]
pub use encode::MockEncoder;
