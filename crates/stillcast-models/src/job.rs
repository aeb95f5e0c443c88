//! Job identity and lifecycle types.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversion job.
///
/// Rendered as 32 lowercase hex characters (128 bits of randomness), so
/// concurrent requests never collide on a filesystem path without any
/// coordination between them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of a conversion job, owned by a single request flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job created, inputs not yet staged
    #[default]
    Pending,
    /// Encoder invocation in flight
    Running,
    /// Output produced and served
    Succeeded,
    /// Encoder exited non-zero or staging failed
    Failed,
    /// Encoder exceeded its wall-clock budget
    TimedOut,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::TimedOut => "timed_out",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::TimedOut
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One validated conversion request plus its filesystem footprint.
///
/// The workspace paths are ephemeral (removed when the owning flow ends);
/// the output path is retained and handed to an external retention policy.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub workspace_dir: PathBuf,
    pub image_path: PathBuf,
    pub audio_path: PathBuf,
    pub output_path: PathBuf,
    pub max_seconds: Option<u64>,
    pub status: JobStatus,
}

impl Job {
    /// Lay out a new job under the given roots.
    ///
    /// Inputs get canonical names (`image.<ext>`, `audio.<ext>`) inside the
    /// per-job workspace; the output lands at `<output_root>/<id>.mp4`.
    pub fn new(
        uploads_root: &Path,
        output_root: &Path,
        image_ext: &str,
        audio_ext: &str,
        max_seconds: Option<u64>,
    ) -> Self {
        let id = JobId::new();
        let workspace_dir = uploads_root.join(id.as_str());
        let image_path = workspace_dir.join(format!("image.{image_ext}"));
        let audio_path = workspace_dir.join(format!("audio.{audio_ext}"));
        let output_path = output_root.join(format!("{id}.mp4"));

        Self {
            id,
            workspace_dir,
            image_path,
            audio_path,
            output_path,
            max_seconds,
            status: JobStatus::Pending,
        }
    }

    /// Name the download is served under.
    pub fn download_name(&self) -> String {
        format!("{}.mp4", self.id)
    }

    pub fn set_status(&mut self, status: JobStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_is_hex() {
        let id = JobId::new();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_job_ids_are_unique() {
        let a = JobId::new();
        let b = JobId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_job_layout() {
        let job = Job::new(
            Path::new("/tmp/uploads"),
            Path::new("/tmp/output"),
            "png",
            "mp3",
            Some(5),
        );

        assert_eq!(job.workspace_dir, Path::new("/tmp/uploads").join(job.id.as_str()));
        assert_eq!(job.image_path, job.workspace_dir.join("image.png"));
        assert_eq!(job.audio_path, job.workspace_dir.join("audio.mp3"));
        assert_eq!(
            job.output_path,
            Path::new("/tmp/output").join(format!("{}.mp4", job.id))
        );
        assert_eq!(job.max_seconds, Some(5));
        assert_eq!(job.status, JobStatus::Pending);
    }

    #[test]
    fn test_status_terminality() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::TimedOut.is_terminal());
    }
}
