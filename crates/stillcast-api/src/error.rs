//! API error taxonomy and user-facing message mapping.
//!
//! Every failure of the conversion flow collapses to a short localized
//! message and a redirect back to the form. Internal detail (paths, stderr,
//! exit codes) goes to tracing only, never to the client.

use stillcast_media::MediaError;
use stillcast_models::ValidationError;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("media error: {0}")]
    Media(#[from] MediaError),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ApiError {
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::Unexpected(msg.into())
    }

    /// True for rejections detected before any resource was allocated.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }

    /// The one-line message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(ValidationError::MissingInput) => {
                "Devi caricare sia l'immagine che l'audio.".to_string()
            }
            ApiError::Validation(ValidationError::EmptyFilename) => {
                "File non valido.".to_string()
            }
            ApiError::Validation(ValidationError::UnsupportedImageType(ext)) => {
                format!("Tipo immagine non permesso: {ext}")
            }
            ApiError::Validation(ValidationError::UnsupportedAudioType(ext)) => {
                format!("Tipo audio non permesso: {ext}")
            }
            ApiError::Media(MediaError::EncodeFailed { .. }) => {
                "Errore nella conversione ffmpeg.".to_string()
            }
            ApiError::Media(MediaError::Timeout(_)) => {
                "ffmpeg ha impiegato troppo tempo.".to_string()
            }
            // FfmpegNotFound, OutputMissing, Io, and anything else.
            ApiError::Media(_) | ApiError::Unexpected(_) => {
                "Errore imprevisto sul server.".to_string()
            }
        }
    }
}
