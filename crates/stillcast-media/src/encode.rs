//! The still-image video profile and the encoder seam.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Everything the encoder needs for one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeRequest {
    pub image_path: PathBuf,
    pub audio_path: PathBuf,
    pub output_path: PathBuf,
    /// Optional duration cap in whole seconds
    pub max_seconds: Option<u64>,
}

/// Build the fixed still+audio command.
///
/// The flag shape is the compatibility boundary with the external encoder:
/// loop the image at 2 fps, attach the audio, optionally cap duration,
/// H.264 fast/CRF 23 video, 192k AAC audio, shortest-stream truncation,
/// yuv420p for broad player support, overwrite the output.
pub fn still_video_command(req: &EncodeRequest) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(&req.output_path)
        .input(&req.image_path, ["-loop", "1", "-framerate", "2"])
        .input(&req.audio_path, Vec::<String>::new());

    if let Some(seconds) = req.max_seconds {
        cmd = cmd.duration(seconds);
    }

    cmd.video_codec("libx264")
        .preset("fast")
        .crf(23)
        .audio_codec("aac")
        .audio_bitrate("192k")
        .shortest()
        .pixel_format("yuv420p")
}

/// Narrow seam over "invoke the external encoder once, bounded".
///
/// The HTTP layer only ever talks to this trait, so tests can swap in a
/// mock instead of launching FFmpeg.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait Encoder: Send + Sync {
    async fn encode(&self, req: &EncodeRequest) -> MediaResult<()>;
}

/// Production encoder backed by the FFmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    runner: FfmpegRunner,
}

impl FfmpegEncoder {
    /// Create an encoder with the given wall-clock budget in seconds.
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            runner: FfmpegRunner::new().with_timeout(timeout_secs),
        }
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    async fn encode(&self, req: &EncodeRequest) -> MediaResult<()> {
        let cmd = still_video_command(req);
        self.runner.run(&cmd).await?;

        // A zero exit without a file on disk is still a failure.
        if !req.output_path.exists() {
            return Err(MediaError::OutputMissing(req.output_path.clone()));
        }

        info!(output = %req.output_path.display(), "Encode complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(max_seconds: Option<u64>) -> EncodeRequest {
        EncodeRequest {
            image_path: PathBuf::from("/work/image.png"),
            audio_path: PathBuf::from("/work/audio.mp3"),
            output_path: PathBuf::from("/out/job.mp4"),
            max_seconds,
        }
    }

    #[test]
    fn test_still_video_command_shape() {
        let args = still_video_command(&request(None)).build_args();
        assert_eq!(
            args,
            vec![
                "-y", "-loop", "1", "-framerate", "2", "-i", "/work/image.png", "-i",
                "/work/audio.mp3", "-c:v", "libx264", "-preset", "fast", "-crf", "23", "-c:a",
                "aac", "-b:a", "192k", "-shortest", "-pix_fmt", "yuv420p", "/out/job.mp4"
            ]
        );
    }

    #[test]
    fn test_duration_cap_sits_between_inputs_and_codecs() {
        let args = still_video_command(&request(Some(5))).build_args();
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "5");

        let last_input = args.iter().rposition(|a| a == "-i").unwrap();
        let codec = args.iter().position(|a| a == "-c:v").unwrap();
        assert!(last_input < t && t < codec);
    }

    #[test]
    fn test_no_cap_means_no_t_flag() {
        let args = still_video_command(&request(None)).build_args();
        assert!(!args.contains(&"-t".to_string()));
    }
}
