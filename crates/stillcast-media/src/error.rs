//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while staging inputs or running the encoder.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFmpeg exited with status {exit_code:?}")]
    EncodeFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("FFmpeg timed out after {0} seconds")]
    Timeout(u64),

    #[error("encoder reported success but produced no file: {0}")]
    OutputMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create an encode failure, keeping only the tail of stderr.
    pub fn encode_failed(exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::EncodeFailed {
            exit_code,
            stderr: tail(&stderr.into(), 2048),
        }
    }
}

/// Last `max_len` bytes of `s`, on a char boundary.
fn tail(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut start = s.len() - max_len;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    s[start..].to_string()
}
