//! FFmpeg command builder and bounded runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Hard wall-clock budget for one encoder invocation.
pub const DEFAULT_ENCODE_TIMEOUT_SECS: u64 = 300;

/// One input stream: its pre-`-i` arguments plus the file path.
#[derive(Debug, Clone)]
struct FfmpegInput {
    args: Vec<String>,
    path: PathBuf,
}

/// Builder for FFmpeg commands.
///
/// Argument order is significant and preserved exactly: per-input args come
/// before their `-i`, output args come after all inputs, the output path is
/// last. The rendered flag set is a compatibility boundary with the encoder.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    inputs: Vec<FfmpegInput>,
    output: PathBuf,
    output_args: Vec<String>,
    overwrite: bool,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command targeting `output`.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
        }
    }

    /// Add an input file with its pre-`-i` arguments.
    pub fn input<I, S>(mut self, path: impl AsRef<Path>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.push(FfmpegInput {
            args: args.into_iter().map(Into::into).collect(),
            path: path.as_ref().to_path_buf(),
        });
        self
    }

    /// Add an output argument (after all inputs).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Cap output duration in whole seconds.
    pub fn duration(self, seconds: u64) -> Self {
        self.output_arg("-t").output_arg(seconds.to_string())
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set encoder preset.
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Set CRF (quality).
    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set audio bitrate.
    pub fn audio_bitrate(self, bitrate: impl Into<String>) -> Self {
        self.output_arg("-b:a").output_arg(bitrate)
    }

    /// Truncate output to the shortest input stream.
    pub fn shortest(self) -> Self {
        self.output_arg("-shortest")
    }

    /// Force a pixel format.
    pub fn pixel_format(self, format: impl Into<String>) -> Self {
        self.output_arg("-pix_fmt").output_arg(format)
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        for input in &self.inputs {
            args.extend(input.args.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands with a hard wall-clock timeout.
///
/// Both stdout and stderr are drained on background tasks so the child can
/// never stall on a full pipe; on timeout the child is killed and reaped
/// before the error is returned.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    program: PathBuf,
    timeout_secs: u64,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a new runner with the default timeout.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            timeout_secs: DEFAULT_ENCODE_TIMEOUT_SECS,
        }
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Override the executable. Test seam.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Run an FFmpeg command to completion, single attempt, no retry.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        which::which(&self.program).map_err(|_| MediaError::FfmpegNotFound)?;
        self.execute(cmd.build_args()).await
    }

    async fn execute(&self, args: Vec<String>) -> MediaResult<()> {
        debug!("Running {}: {}", self.program.display(), args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout_handle = drain(child.stdout.take());
        let stderr_handle = drain(child.stderr.take());

        let status = match tokio::time::timeout(
            std::time::Duration::from_secs(self.timeout_secs),
            child.wait(),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    "{} timed out after {} seconds, killing process",
                    self.program.display(),
                    self.timeout_secs
                );
                let _ = child.kill().await;
                return Err(MediaError::Timeout(self.timeout_secs));
            }
        };

        let _ = stdout_handle.await;
        let stderr_bytes = stderr_handle.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&stderr_bytes).to_string();
            warn!(
                exit_code = ?status.code(),
                "{} exited with non-zero status",
                self.program.display()
            );
            Err(MediaError::encode_failed(status.code(), stderr))
        }
    }
}

/// Read a child stream to its end without blocking the wait.
fn drain<R>(stream: Option<R>) -> tokio::task::JoinHandle<Vec<u8>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf).await;
        }
        buf
    })
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder_ordering() {
        let cmd = FfmpegCommand::new("out.mp4")
            .input("in.png", ["-loop", "1"])
            .input("in.mp3", Vec::<String>::new())
            .video_codec("libx264")
            .crf(23);

        let args = cmd.build_args();
        assert_eq!(
            args,
            vec![
                "-y", "-loop", "1", "-i", "in.png", "-i", "in.mp3", "-c:v", "libx264", "-crf",
                "23", "out.mp4"
            ]
        );
    }

    #[cfg(unix)]
    mod process {
        use super::*;

        fn sh(script: &str) -> Vec<String> {
            vec!["-c".to_string(), script.to_string()]
        }

        #[tokio::test]
        async fn test_zero_exit_succeeds() {
            let runner = FfmpegRunner::new().with_program("/bin/sh");
            runner.execute(sh("exit 0")).await.unwrap();
        }

        #[tokio::test]
        async fn test_nonzero_exit_captures_stderr() {
            let runner = FfmpegRunner::new().with_program("/bin/sh");
            let err = runner
                .execute(sh("echo boom >&2; exit 3"))
                .await
                .unwrap_err();

            match err {
                MediaError::EncodeFailed { exit_code, stderr } => {
                    assert_eq!(exit_code, Some(3));
                    assert!(stderr.contains("boom"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_timeout_kills_child() {
            let runner = FfmpegRunner::new()
                .with_program("/bin/sh")
                .with_timeout(1);

            let start = std::time::Instant::now();
            let err = runner.execute(sh("sleep 30")).await.unwrap_err();

            assert!(matches!(err, MediaError::Timeout(1)));
            // The child must be terminated, not waited out.
            assert!(start.elapsed() < std::time::Duration::from_secs(10));
        }

        #[tokio::test]
        async fn test_large_stderr_does_not_block() {
            // Write well past a pipe buffer; the drain tasks must keep the
            // child from stalling.
            let runner = FfmpegRunner::new()
                .with_program("/bin/sh")
                .with_timeout(30);
            let err = runner
                .execute(sh(
                    "i=0; while [ $i -lt 20000 ]; do echo 0123456789012345678901234567890123456789 >&2; i=$((i+1)); done; exit 1",
                ))
                .await
                .unwrap_err();

            match err {
                MediaError::EncodeFailed { stderr, .. } => assert_eq!(stderr.len(), 2048),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }
}
