//! Previewkit WASM - WebAssembly bindings for the preview engine
//!
//! This crate exposes the pure parts of previewkit-core to a browser host.
//!
//! # Module Structure
//!
//! - `geometry` - Crop size, display transform and preview bounding
//! - `markup` - Markup layout into SVG-ready elements
//! - `pixels` - Preview decoding, color matrix filtering, average color
//! - `types` - WASM-compatible wrapper types for pixel data
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_preview, apply_color_matrix } from '@previewkit/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const surface = decode_preview(bytes, file.type, 400, 300, 2, devicePixelRatio);
//! const filtered = apply_color_matrix(surface, item.getMetadata('filter'));
//! ```

use wasm_bindgen::prelude::*;

mod geometry;
mod logger;
mod markup;
mod pixels;
mod types;

pub use geometry::{bound_preview_size, centered_crop_rect, current_crop_size, display_transform};
pub use markup::render_markup;
pub use pixels::{apply_color_matrix, average_color, decode_preview, is_bitmap, read_orientation};
pub use types::JsPreviewSurface;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::install(log::LevelFilter::Info);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
