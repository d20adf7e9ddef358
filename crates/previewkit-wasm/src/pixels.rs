//! WASM bindings for decoding, filtering and color sampling.

use previewkit_core::geometry::Size;
use previewkit_core::host::ItemFile;
use previewkit_core::preview::{self, ColorMatrix, ObjectUrlRegistry};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::types::JsPreviewSurface;

/// Decode a file into an upright, size-bounded preview surface.
///
/// # Arguments
///
/// * `bytes` - The file bytes as a `Uint8Array`
/// * `mime_type` - The file's MIME type, used to pick the decoder
/// * `container_width` / `container_height` - Size of the preview panel
/// * `zoom_factor` - How far past the panel size the preview may be rendered
/// * `device_pixel_ratio` - The display's `devicePixelRatio`
/// * `orientation` - EXIF orientation (1-8); read from the bytes when absent
///
/// # Returns
///
/// A `JsPreviewSurface` with the orientation applied, bounded to the panel
/// scaled by the zoom factor and pixel density.
///
/// # Errors
///
/// Returns an error if:
/// - No decoder recognizes the bytes
/// - The image data is corrupted
#[wasm_bindgen]
pub fn decode_preview(
    bytes: &[u8],
    mime_type: &str,
    container_width: f64,
    container_height: f64,
    zoom_factor: f64,
    device_pixel_ratio: f64,
    orientation: Option<u32>,
) -> Result<JsPreviewSurface, JsValue> {
    let file = ItemFile::new("preview", mime_type, bytes.to_vec());
    let orientation = orientation
        .map(preview::Orientation::from)
        .unwrap_or_else(|| preview::read_orientation(bytes));

    let registry = ObjectUrlRegistry::new();
    let decoded = preview::decode(&file, true, &registry).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let target = preview::bound_preview_size(
        (decoded.width(), decoded.height()),
        orientation,
        Size::new(container_width, container_height),
        zoom_factor,
        device_pixel_ratio,
    );
    Ok(JsPreviewSurface::from_image(preview::rasterize(decoded, target, orientation)))
}

/// Apply a 20 value color matrix to a copy of `surface`.
///
/// # Arguments
///
/// * `surface` - The unfiltered surface; it is left untouched
/// * `matrix` - Row-major 4x5 matrix over normalized RGBA channels
///
/// A matrix of any other length leaves the pixels unchanged.
///
/// # Errors
///
/// Returns an error if the surface pixel buffer does not match its size.
#[wasm_bindgen]
pub fn apply_color_matrix(surface: &JsPreviewSurface, matrix: Option<Vec<f32>>) -> Result<JsPreviewSurface, JsValue> {
    let source = surface
        .to_surface(false)
        .ok_or_else(|| JsValue::from_str("Surface pixel buffer is corrupt"))?;
    let matrix = matrix.as_deref().and_then(ColorMatrix::from_slice);

    Ok(JsPreviewSurface::from_image(preview::apply_filter(
        &source.image,
        matrix.as_ref(),
    )))
}

/// Quadratic mean color of a surface as `{r, g, b}`, or `null` when the
/// surface is tainted.
#[wasm_bindgen]
pub fn average_color(surface: &JsPreviewSurface, tainted: bool) -> Result<JsValue, JsValue> {
    let color = surface
        .to_surface(tainted)
        .and_then(|surface| preview::average_color(&surface));
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_missing_as_null(true);
    color
        .serialize(&serializer)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// EXIF orientation (1-8) stored in the file bytes.
#[wasm_bindgen]
pub fn read_orientation(bytes: &[u8]) -> u32 {
    preview::read_orientation(bytes).into()
}

/// Whether a MIME type can take the fast bitmap decode path.
#[wasm_bindgen]
pub fn is_bitmap(mime_type: &str) -> bool {
    preview::is_bitmap(mime_type)
}
