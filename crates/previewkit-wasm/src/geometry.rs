//! WASM bindings for crop geometry and preview sizing.
//!
//! Structured values (crop configs, transforms) cross the boundary through
//! `serde_wasm_bindgen`, using the same camelCase shape as item metadata.

use previewkit_core::geometry::{self, CropConfig, Size};
use previewkit_core::preview::{self, Orientation};
use wasm_bindgen::prelude::*;

fn crop_from_js(crop: JsValue) -> Result<CropConfig, JsValue> {
    if crop.is_undefined() || crop.is_null() {
        return Ok(CropConfig::default());
    }
    serde_wasm_bindgen::from_value(crop)
        .map_err(|e| JsValue::from_str(&format!("Invalid crop: {}", e)))
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Pixel size of the crop for an image of `width` x `height`.
///
/// Returns `{width, height, widthFloat, heightFloat}`.
#[wasm_bindgen]
pub fn current_crop_size(width: f64, height: f64, crop: JsValue) -> Result<JsValue, JsValue> {
    let crop = crop_from_js(crop)?;
    to_js(&geometry::current_crop_size(Size::new(width, height), &crop))
}

/// Placement of a preview surface inside its clip frame.
#[wasm_bindgen]
pub fn display_transform(
    image_width: f64,
    image_height: f64,
    frame_width: f64,
    frame_height: f64,
    crop: JsValue,
) -> Result<JsValue, JsValue> {
    let crop = crop_from_js(crop)?;
    to_js(&geometry::display_transform(
        Size::new(image_width, image_height),
        Size::new(frame_width, frame_height),
        &crop,
    ))
}

/// Largest rect of `aspect_ratio` centered in the container, as
/// `[x, y, width, height]`.
#[wasm_bindgen]
pub fn centered_crop_rect(container_width: f64, container_height: f64, aspect_ratio: f64) -> Vec<f64> {
    let rect = geometry::centered_crop_rect(Size::new(container_width, container_height), aspect_ratio);
    vec![rect.x, rect.y, rect.width, rect.height]
}

/// Bounded preview size for a decoded image, as `[width, height]`.
#[wasm_bindgen]
pub fn bound_preview_size(
    width: u32,
    height: u32,
    orientation: u32,
    container_width: f64,
    container_height: f64,
    zoom_factor: f64,
    device_pixel_ratio: f64,
) -> Vec<f64> {
    let size = preview::bound_preview_size(
        (width, height),
        Orientation::from(orientation),
        Size::new(container_width, container_height),
        zoom_factor,
        device_pixel_ratio,
    );
    vec![size.width, size.height]
}
