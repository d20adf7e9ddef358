//! WASM-compatible wrapper types for preview data.

use image::RgbaImage;
use previewkit_core::preview::PreviewSurface;
use wasm_bindgen::prelude::*;

/// An RGBA preview surface for JavaScript.
///
/// Holds the upright, size-bounded pixels produced by `decode_preview` or
/// `apply_color_matrix`, ready to be drawn into a canvas.
///
/// # Memory Management
///
/// Pixel data stays in WASM memory. `pixels()` copies it into a
/// `Uint8ClampedArray` that can back an `ImageData`, so call it once per
/// draw rather than per pixel access.
///
/// `free()` releases the WASM memory early; otherwise the wasm-bindgen
/// finalizer reclaims it.
#[wasm_bindgen]
pub struct JsPreviewSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsPreviewSurface {
    /// Wrap RGBA pixel data.
    ///
    /// # Arguments
    /// * `width` - Surface width in pixels
    /// * `height` - Surface height in pixels
    /// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
    ///
    /// # Errors
    ///
    /// Returns an error if `pixels` is not `width * height * 4` bytes long.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsPreviewSurface, JsValue> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(JsValue::from_str(&format!(
                "Expected {expected} bytes of RGBA data, got {}",
                pixels.len()
            )));
        }
        Ok(JsPreviewSurface {
            width,
            height,
            pixels,
        })
    }

    /// Surface width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Copy of the RGBA pixels.
    pub fn pixels(&self) -> js_sys::Uint8ClampedArray {
        js_sys::Uint8ClampedArray::from(self.pixels.as_slice())
    }
}

impl JsPreviewSurface {
    pub(crate) fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: image.into_raw(),
        }
    }

    pub(crate) fn to_surface(&self, tainted: bool) -> Option<PreviewSurface> {
        let image = RgbaImage::from_raw(self.width, self.height, self.pixels.clone())?;
        Some(PreviewSurface { image, tainted })
    }

    pub(crate) fn raw(&self) -> &[u8] {
        &self.pixels
    }
}
