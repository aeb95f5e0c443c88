//! Per-job workspace lifecycle.
//!
//! Each job gets its own directory under the uploads root, named by the
//! job's random id, so concurrent requests never share a path. The
//! directory is removed when the workspace is dropped — on success,
//! failure, timeout, and panic unwind alike.

use std::path::{Path, PathBuf};

use stillcast_models::JobId;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::MediaResult;

/// An isolated, ephemeral directory holding one job's staged inputs.
#[derive(Debug)]
pub struct JobWorkspace {
    dir: PathBuf,
}

impl JobWorkspace {
    /// Create `<uploads_root>/<job_id>/`.
    pub async fn create(uploads_root: impl AsRef<Path>, id: &JobId) -> MediaResult<Self> {
        let dir = uploads_root.as_ref().join(id.as_str());
        fs::create_dir_all(&dir).await?;
        debug!(workspace = %dir.display(), "Workspace created");
        Ok(Self { dir })
    }

    /// The workspace directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stage the uploaded image under its canonical name.
    pub async fn stage_image(&self, ext: &str, bytes: &[u8]) -> MediaResult<PathBuf> {
        self.stage(&format!("image.{ext}"), bytes).await
    }

    /// Stage the uploaded audio under its canonical name.
    pub async fn stage_audio(&self, ext: &str, bytes: &[u8]) -> MediaResult<PathBuf> {
        self.stage(&format!("audio.{ext}"), bytes).await
    }

    async fn stage(&self, name: &str, bytes: &[u8]) -> MediaResult<PathBuf> {
        let path = self.dir.join(name);
        fs::write(&path, bytes).await?;
        Ok(path)
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        // Best-effort removal: never propagate from cleanup.
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    workspace = %self.dir.display(),
                    "Failed to remove workspace: {e}"
                );
            }
        }
    }
}
