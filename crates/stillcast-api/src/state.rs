//! Application state.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use stillcast_media::{Encoder, FfmpegEncoder};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub encoder: Arc<dyn Encoder>,
    key: Key,
}

impl AppState {
    /// Create state with the production FFmpeg encoder.
    pub fn new(config: ApiConfig) -> Self {
        let encoder = Arc::new(FfmpegEncoder::new(config.encode_timeout_secs));
        Self::with_encoder(config, encoder)
    }

    /// Create state with an injected encoder. Test seam.
    pub fn with_encoder(config: ApiConfig, encoder: Arc<dyn Encoder>) -> Self {
        let key = signing_key(&config.secret);
        Self {
            config,
            encoder,
            key,
        }
    }

    /// Create the upload and output roots if they don't exist yet.
    pub async fn ensure_roots(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.config.upload_dir).await?;
        tokio::fs::create_dir_all(&self.config.output_dir).await
    }
}

// Lets SignedCookieJar pull its signing key straight from state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.key.clone()
    }
}

/// Stretch the configured secret into a full-length signing key.
fn signing_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}
