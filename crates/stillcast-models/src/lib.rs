//! Shared data models for the stillcast backend.
//!
//! This crate provides:
//! - Job identity and lifecycle types
//! - Pure input validation for conversion requests

pub mod job;
pub mod upload;

pub use job::{Job, JobId, JobStatus};
pub use upload::{
    validate_request, UploadKind, UploadMeta, ValidatedRequest, ValidationError,
    ALLOWED_AUDIO_EXTS, ALLOWED_IMAGE_EXTS,
};
