//! Decoding of item files into bitmaps.
//!
//! Two paths exist:
//! - **Fast path**: format-specific decode of a bitmap type, run off the
//!   orchestration thread. A failure yields `None` and triggers the fallback.
//! - **Fallback**: content-sniffing decode fed through a temporary object
//!   URL that is revoked as soon as the decode resolves.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageFormat, ImageReader};

use super::source::{ObjectUrl, ObjectUrlRegistry};
use super::{Orientation, PreviewError};
use crate::host::ItemFile;

/// True for MIME types the preview can show at all.
pub fn is_image(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

/// True for raster image types eligible for the fast decode path.
pub fn is_bitmap(mime_type: &str) -> bool {
    is_image(mime_type) && mime_type != "image/svg+xml"
}

/// Fast path decode. Returns `None` when the format is unknown or the bytes
/// do not decode.
pub fn decode_bitmap(file: &ItemFile) -> Option<DynamicImage> {
    let format = ImageFormat::from_mime_type(&file.mime_type)?;

    match image::load_from_memory_with_format(&file.bytes, format) {
        Ok(image) => Some(image),
        Err(e) => {
            log::debug!("Fast decode of {} failed: {}", file.name, e);
            None
        }
    }
}

/// Fallback decode through an object URL. The URL is revoked when this
/// returns, on success and on failure.
///
/// # Errors
///
/// Returns `PreviewError::Decode` if the URL no longer resolves or the bytes
/// are not a decodable image.
pub fn decode_from_url(url: ObjectUrl) -> Result<DynamicImage, PreviewError> {
    let bytes = url
        .bytes()
        .ok_or_else(|| PreviewError::Decode(format!("{} was revoked", url.as_str())))?;

    let reader = ImageReader::new(Cursor::new(&*bytes))
        .with_guessed_format()
        .map_err(|e| PreviewError::Decode(e.to_string()))?;

    reader
        .decode()
        .map_err(|e| PreviewError::Decode(e.to_string()))
}

/// Decode `file`, trying the fast path first when it is available.
///
/// # Errors
///
/// Returns `PreviewError::Decode` when both paths fail.
pub fn decode(
    file: &ItemFile,
    fast_decode: bool,
    registry: &ObjectUrlRegistry,
) -> Result<DynamicImage, PreviewError> {
    if fast_decode && is_bitmap(&file.mime_type) {
        if let Some(image) = decode_bitmap(file) {
            return Ok(image);
        }
        log::info!("Falling back to URL decode for {}", file.name);
    }

    decode_from_url(registry.create(file.bytes.clone()))
}

/// Read the EXIF orientation tag from file bytes.
///
/// Returns `Orientation::Normal` if there is no EXIF data or no usable tag.
pub fn read_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}
