//! WASM bindings for markup layout.

use previewkit_core::geometry::Size;
use previewkit_core::markup::{MarkupElement, MarkupItem, MarkupLayer, ResizeConfig};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// A rendered markup element with its SVG attribute list.
#[derive(Serialize)]
struct JsMarkupElement<'a> {
    #[serde(flatten)]
    element: &'a MarkupElement,
    attributes: Vec<(&'static str, String)>,
}

/// Lay out markup items for a view of `view_width` x `view_height` showing
/// a crop of `crop_width` x `crop_height`.
///
/// `filter` is an optional JavaScript predicate called with each item.
/// Returns the elements in draw order.
///
/// # Errors
///
/// Rejects malformed markup and unknown shape types.
#[wasm_bindgen]
pub fn render_markup(
    markup: JsValue,
    view_width: f64,
    view_height: f64,
    crop_width: f64,
    crop_height: f64,
    resize: JsValue,
    filter: Option<js_sys::Function>,
) -> Result<JsValue, JsValue> {
    let items: Vec<MarkupItem> = serde_wasm_bindgen::from_value(markup)
        .map_err(|e| JsValue::from_str(&format!("Invalid markup: {}", e)))?;

    let resize: Option<ResizeConfig> = if resize.is_undefined() || resize.is_null() {
        None
    } else {
        Some(
            serde_wasm_bindgen::from_value(resize)
                .map_err(|e| JsValue::from_str(&format!("Invalid resize: {}", e)))?,
        )
    };

    let accepts = |item: &MarkupItem| match &filter {
        None => true,
        Some(filter) => serde_wasm_bindgen::to_value(item)
            .ok()
            .and_then(|value| filter.call1(&JsValue::NULL, &value).ok())
            .is_some_and(|result| result.is_truthy()),
    };

    let layer = MarkupLayer::render(
        &items,
        accepts,
        Size::new(view_width, view_height),
        Size::new(crop_width, crop_height),
        resize.as_ref(),
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let elements: Vec<JsMarkupElement> = layer
        .elements
        .iter()
        .map(|element| JsMarkupElement {
            element,
            attributes: element.attributes(),
        })
        .collect();

    serde_wasm_bindgen::to_value(&elements).map_err(|e| JsValue::from_str(&e.to_string()))
}
