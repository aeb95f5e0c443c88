//! API configuration.

use std::path::PathBuf;

use stillcast_media::DEFAULT_ENCODE_TIMEOUT_SECS;

/// API server configuration, read once at process start.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Secret used to sign flash cookies
    pub secret: String,
    /// Root for ephemeral per-job workspaces
    pub upload_dir: PathBuf,
    /// Root for produced MP4 files (retained; external retention policy)
    pub output_dir: PathBuf,
    /// Wall-clock budget for one encoder invocation
    pub encode_timeout_secs: u64,
    /// Max request body size
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            secret: "cambiami_per_favore".to_string(),
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("output"),
            encode_timeout_secs: DEFAULT_ENCODE_TIMEOUT_SECS,
            max_body_size: 100 * 1024 * 1024, // 100MB
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            secret: std::env::var("STILLCAST_SECRET").unwrap_or(defaults.secret),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            encode_timeout_secs: std::env::var("ENCODE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.encode_timeout_secs),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
        }
    }
}
