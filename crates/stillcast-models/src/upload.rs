//! Pure validation of conversion request inputs.
//!
//! Validation runs before anything touches the filesystem: a rejected
//! request never allocates a workspace.

use serde::Serialize;
use thiserror::Error;

/// Image extensions accepted for the still frame.
pub const ALLOWED_IMAGE_EXTS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Audio extensions accepted for the soundtrack.
pub const ALLOWED_AUDIO_EXTS: [&str; 4] = ["mp3", "wav", "m4a", "ogg"];

/// Which form field an upload arrived under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    Image,
    Audio,
}

impl UploadKind {
    /// The extension whitelist for this category.
    pub fn allowed_exts(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Image => &ALLOWED_IMAGE_EXTS,
            UploadKind::Audio => &ALLOWED_AUDIO_EXTS,
        }
    }

    fn unsupported(&self, suffix: String) -> ValidationError {
        match self {
            UploadKind::Image => ValidationError::UnsupportedImageType(suffix),
            UploadKind::Audio => ValidationError::UnsupportedAudioType(suffix),
        }
    }
}

/// A received file stream's claimed metadata.
///
/// Transient: exists only while the request is validated and staged.
#[derive(Debug, Clone)]
pub struct UploadMeta {
    pub kind: UploadKind,
    pub filename: String,
}

impl UploadMeta {
    pub fn new(kind: UploadKind, filename: impl Into<String>) -> Self {
        Self {
            kind,
            filename: filename.into(),
        }
    }
}

/// Rejection reasons for a conversion request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("both an image and an audio upload are required")]
    MissingInput,

    #[error("upload has an empty filename")]
    EmptyFilename,

    #[error("unsupported image type: {0}")]
    UnsupportedImageType(String),

    #[error("unsupported audio type: {0}")]
    UnsupportedAudioType(String),
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// Image extension without the leading dot, lowercased
    pub image_ext: String,
    /// Audio extension without the leading dot, lowercased
    pub audio_ext: String,
    /// Duration cap in seconds, if a usable one was supplied
    pub max_seconds: Option<u64>,
}

/// Validate the two uploads and the optional duration cap.
///
/// Pure function of its inputs. The `max_seconds` field uses a permissive
/// parse: non-numeric or non-positive values behave exactly like an absent
/// field rather than rejecting the request.
pub fn validate_request(
    image: Option<&UploadMeta>,
    audio: Option<&UploadMeta>,
    max_seconds: Option<&str>,
) -> Result<ValidatedRequest, ValidationError> {
    let (image, audio) = match (image, audio) {
        (Some(i), Some(a)) => (i, a),
        _ => return Err(ValidationError::MissingInput),
    };

    if image.filename.is_empty() || audio.filename.is_empty() {
        return Err(ValidationError::EmptyFilename);
    }

    Ok(ValidatedRequest {
        image_ext: check_extension(image)?,
        audio_ext: check_extension(audio)?,
        max_seconds: parse_max_seconds(max_seconds),
    })
}

/// Check one upload's extension against its category's whitelist.
fn check_extension(upload: &UploadMeta) -> Result<String, ValidationError> {
    let suffix = file_suffix(&upload.filename);
    allowed(&suffix, upload.kind.allowed_exts()).ok_or_else(|| upload.kind.unsupported(suffix))
}

/// Lowercased suffix of the final path component, dot included (`.png`).
///
/// Empty when the name has no extension; a leading dot alone (dotfile) does
/// not count as an extension.
fn file_suffix(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_lowercase(),
        _ => String::new(),
    }
}

fn allowed(suffix: &str, set: &[&str]) -> Option<String> {
    let ext = suffix.strip_prefix('.')?;
    set.contains(&ext).then(|| ext.to_string())
}

/// Permissive duration-cap parse: `Some(n)` only for positive integers.
fn parse_max_seconds(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn img(name: &str) -> UploadMeta {
        UploadMeta::new(UploadKind::Image, name)
    }

    fn aud(name: &str) -> UploadMeta {
        UploadMeta::new(UploadKind::Audio, name)
    }

    #[test]
    fn test_valid_request() {
        let result = validate_request(Some(&img("photo.png")), Some(&aud("song.mp3")), None);
        assert_eq!(
            result,
            Ok(ValidatedRequest {
                image_ext: "png".into(),
                audio_ext: "mp3".into(),
                max_seconds: None,
            })
        );
    }

    #[test]
    fn test_missing_either_upload() {
        assert_eq!(
            validate_request(None, Some(&aud("song.mp3")), None),
            Err(ValidationError::MissingInput)
        );
        assert_eq!(
            validate_request(Some(&img("photo.png")), None, None),
            Err(ValidationError::MissingInput)
        );
        assert_eq!(validate_request(None, None, None), Err(ValidationError::MissingInput));
    }

    #[test]
    fn test_empty_filename() {
        assert_eq!(
            validate_request(Some(&img("")), Some(&aud("song.mp3")), None),
            Err(ValidationError::EmptyFilename)
        );
        assert_eq!(
            validate_request(Some(&img("photo.png")), Some(&aud("")), None),
            Err(ValidationError::EmptyFilename)
        );
    }

    #[test]
    fn test_unsupported_image_type() {
        assert_eq!(
            validate_request(Some(&img("photo.gif")), Some(&aud("song.mp3")), None),
            Err(ValidationError::UnsupportedImageType(".gif".into()))
        );
    }

    #[test]
    fn test_unsupported_audio_type() {
        assert_eq!(
            validate_request(Some(&img("photo.png")), Some(&aud("song.flac")), None),
            Err(ValidationError::UnsupportedAudioType(".flac".into()))
        );
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let result =
            validate_request(Some(&img("PHOTO.PNG")), Some(&aud("Song.Mp3")), None).unwrap();
        assert_eq!(result.image_ext, "png");
        assert_eq!(result.audio_ext, "mp3");
    }

    #[test]
    fn test_extension_after_last_separator() {
        // Claimed filenames may carry path components; only the final one counts.
        let result = validate_request(
            Some(&img("C:\\fakepath\\photo.jpeg")),
            Some(&aud("dir/song.ogg")),
            None,
        )
        .unwrap();
        assert_eq!(result.image_ext, "jpeg");
        assert_eq!(result.audio_ext, "ogg");
    }

    #[test]
    fn test_no_extension_rejected() {
        assert_eq!(
            validate_request(Some(&img("photo")), Some(&aud("song.mp3")), None),
            Err(ValidationError::UnsupportedImageType(String::new()))
        );
        // Dotfiles have no extension either.
        assert_eq!(
            validate_request(Some(&img(".png")), Some(&aud("song.mp3")), None),
            Err(ValidationError::UnsupportedImageType(String::new()))
        );
    }

    #[test]
    fn test_kind_selects_whitelist() {
        // The category claimed by the form field decides which whitelist
        // applies, so an audio file offered as the image is rejected as an
        // image-type problem.
        assert_eq!(
            validate_request(Some(&img("song.mp3")), Some(&aud("song.mp3")), None),
            Err(ValidationError::UnsupportedImageType(".mp3".into()))
        );
        assert_eq!(
            validate_request(Some(&img("photo.png")), Some(&aud("photo.png")), None),
            Err(ValidationError::UnsupportedAudioType(".png".into()))
        );
    }

    #[test]
    fn test_max_seconds_positive() {
        let result =
            validate_request(Some(&img("a.png")), Some(&aud("b.mp3")), Some("5")).unwrap();
        assert_eq!(result.max_seconds, Some(5));
    }

    #[test]
    fn test_max_seconds_accepts_large_values() {
        // Any positive integer is forwarded to the encoder, not clamped.
        let result = validate_request(
            Some(&img("a.png")),
            Some(&aud("b.mp3")),
            Some("4294967296"),
        )
        .unwrap();
        assert_eq!(result.max_seconds, Some(4_294_967_296));
    }

    #[test]
    fn test_max_seconds_permissive_parse() {
        // Non-numeric, non-positive, and empty all behave like an absent field.
        for raw in ["abc", "0", "-3", "", " ", "2.5"] {
            let result =
                validate_request(Some(&img("a.png")), Some(&aud("b.mp3")), Some(raw)).unwrap();
            assert_eq!(result.max_seconds, None, "raw = {raw:?}");
        }
    }
}
