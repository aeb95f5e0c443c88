//! The conversion flow: one request, one job, cleanup on every exit path.

use axum::body::{Body, Bytes};
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum_extra::extract::cookie::SignedCookieJar;
use tokio_util::io::ReaderStream;
use tracing::{error, info, warn};

use stillcast_media::{EncodeRequest, JobWorkspace, MediaError};
use stillcast_models::{validate_request, Job, JobStatus, UploadKind, UploadMeta};

use crate::error::ApiError;
use crate::flash::redirect_with_flash;
use crate::state::AppState;

/// `POST /convert` — multipart fields `image`, `audio`, optional
/// `max_seconds`.
///
/// Success streams the MP4 back as an attachment; every failure collapses
/// to a flash message and a redirect to the form.
pub async fn convert(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    multipart: Multipart,
) -> Response {
    match run_conversion(&state, multipart).await {
        Ok(response) => response,
        Err(err) => {
            if err.is_rejection() {
                info!(error = %err, "Conversion request rejected");
            } else {
                error!(error = %err, "Conversion failed");
            }
            redirect_with_flash(jar, &err.user_message())
        }
    }
}

/// A received multipart form, fields as claimed by the client.
#[derive(Default)]
struct ConvertForm {
    image: Option<(UploadMeta, Bytes)>,
    audio: Option<(UploadMeta, Bytes)>,
    max_seconds: Option<String>,
}

async fn collect_form(mut multipart: Multipart) -> Result<ConvertForm, ApiError> {
    let mut form = ConvertForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::unexpected(format!("multipart read failed: {e}")))?
    {
        match field.name() {
            Some("image") => {
                let meta =
                    UploadMeta::new(UploadKind::Image, field.file_name().unwrap_or_default());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::unexpected(format!("image upload failed: {e}")))?;
                form.image = Some((meta, bytes));
            }
            Some("audio") => {
                let meta =
                    UploadMeta::new(UploadKind::Audio, field.file_name().unwrap_or_default());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::unexpected(format!("audio upload failed: {e}")))?;
                form.audio = Some((meta, bytes));
            }
            Some("max_seconds") => {
                form.max_seconds = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::unexpected(format!("form field failed: {e}")))?,
                );
            }
            _ => {} // unknown fields ignored
        }
    }

    Ok(form)
}

async fn run_conversion(state: &AppState, multipart: Multipart) -> Result<Response, ApiError> {
    let form = collect_form(multipart).await?;

    // Validation runs before anything touches the filesystem.
    let validated = validate_request(
        form.image.as_ref().map(|(meta, _)| meta),
        form.audio.as_ref().map(|(meta, _)| meta),
        form.max_seconds.as_deref(),
    )?;

    // Validation guarantees both uploads are present; Bytes clones are
    // refcounted, not copies.
    let (image_bytes, audio_bytes) = match (&form.image, &form.audio) {
        (Some((_, image)), Some((_, audio))) => (image.clone(), audio.clone()),
        _ => return Err(stillcast_models::ValidationError::MissingInput.into()),
    };

    let mut job = Job::new(
        &state.config.upload_dir,
        &state.config.output_dir,
        &validated.image_ext,
        &validated.audio_ext,
        validated.max_seconds,
    );
    info!(
        job_id = %job.id,
        image_ext = %validated.image_ext,
        audio_ext = %validated.audio_ext,
        max_seconds = ?job.max_seconds,
        "Job accepted"
    );

    // From here on the workspace is removed when this function returns,
    // whichever branch gets there first.
    let workspace = JobWorkspace::create(&state.config.upload_dir, &job.id).await?;

    job.image_path = workspace
        .stage_image(&validated.image_ext, &image_bytes)
        .await?;
    job.audio_path = workspace
        .stage_audio(&validated.audio_ext, &audio_bytes)
        .await?;

    job.set_status(JobStatus::Running);
    let request = EncodeRequest {
        image_path: job.image_path.clone(),
        audio_path: job.audio_path.clone(),
        output_path: job.output_path.clone(),
        max_seconds: job.max_seconds,
    };

    if let Err(e) = state.encoder.encode(&request).await {
        job.set_status(match e {
            MediaError::Timeout(_) => JobStatus::TimedOut,
            _ => JobStatus::Failed,
        });
        warn!(job_id = %job.id, status = %job.status, "Encode did not complete");
        // A failed or killed encoder routinely leaves a partial file behind.
        discard_output(&job.output_path).await;
        return Err(e.into());
    }

    job.set_status(JobStatus::Succeeded);
    info!(job_id = %job.id, status = %job.status, "Serving download");

    match serve_download(&job).await {
        Ok(response) => Ok(response),
        Err(e) => {
            discard_output(&job.output_path).await;
            Err(e)
        }
    }
}

/// Best-effort removal of output from a failed attempt; never propagates.
async fn discard_output(path: &std::path::Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(output = %path.display(), "Failed to discard partial output: {e}");
        }
    }
}

/// Stream the produced file as an attachment named after the job.
async fn serve_download(job: &Job) -> Result<Response, ApiError> {
    let file = tokio::fs::File::open(&job.output_path)
        .await
        .map_err(MediaError::from)?;
    let length = file.metadata().await.map_err(MediaError::from)?.len();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(header::CONTENT_LENGTH, length)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", job.download_name()),
        )
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| ApiError::unexpected(format!("response build failed: {e}")))
}

// `convert` is exercised end to end in tests/convert_flow.rs with a mock
// encoder; only the pieces with no HTTP surface are unit tested here.
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serve_download_headers() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut job = Job::new(dir.path(), dir.path(), "png", "mp3", None);
        tokio::fs::write(&job.output_path, b"fake mp4 bytes")
            .await
            .unwrap();
        job.set_status(JobStatus::Succeeded);

        let response = serve_download(&job).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");
        assert_eq!(headers[header::CONTENT_LENGTH], "14");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION].to_str().unwrap(),
            format!("attachment; filename=\"{}.mp4\"", job.id)
        );
    }

    #[tokio::test]
    async fn test_serve_download_missing_file_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let job = Job::new(dir.path(), dir.path(), "png", "mp3", None);

        let err = serve_download(&job).await.unwrap_err();
        assert_eq!(err.user_message(), "Errore imprevisto sul server.");
    }
}
