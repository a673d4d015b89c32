use image::ImageFormat;
use thiserror::Error;
use tracing::{debug, instrument};

/// Formats the capture flow accepts. Anything else is rejected before
/// classification.
const ALLOWED_FORMATS: &[ImageFormat] = &[ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImageValidationError {
    #[error("input bytes empty")]
    EmptyInput,

    #[error("input too large: {size} bytes, max {max_size}")]
    InputTooLarge { size: usize, max_size: usize },

    #[error("media type {0:?} is not an image")]
    NotAnImage(String),

    #[error("unrecognized image data")]
    Unrecognized,

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
}

/// Checks captured bytes before they reach the classifier: non-empty, under
/// the size cap, declared as `image/*`, and carrying JPEG, PNG or WebP magic
/// bytes. Only the header is inspected; nothing is decoded.
#[instrument(skip(bytes), fields(input_size = bytes.len()))]
pub fn validate_capture(
    bytes: &[u8],
    mime_type: &str,
    max_bytes: usize,
) -> Result<ImageFormat, ImageValidationError> {
    if bytes.is_empty() {
        return Err(ImageValidationError::EmptyInput);
    }
    if bytes.len() > max_bytes {
        return Err(ImageValidationError::InputTooLarge {
            size: bytes.len(),
            max_size: max_bytes,
        });
    }
    if !is_image_mime(mime_type) {
        return Err(ImageValidationError::NotAnImage(mime_type.to_string()));
    }

    let format = image::guess_format(bytes).map_err(|_| ImageValidationError::Unrecognized)?;
    if !ALLOWED_FORMATS.contains(&format) {
        return Err(ImageValidationError::UnsupportedFormat(format!("{format:?}")));
    }

    debug!(?format, "capture accepted");
    Ok(format)
}

/// Shells report media types with varying case and sometimes parameters.
#[must_use]
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type
        .trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}
