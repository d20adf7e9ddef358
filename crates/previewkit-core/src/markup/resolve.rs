//! Resolution of markup values into frame pixels.
//!
//! Markup geometry is stored in relative units. At render time each value is
//! resolved against the frame size and the render scale:
//!
//! - numbers are unit fractions of the frame (of one axis, or of the smaller
//!   side when no axis applies)
//! - strings are pixel values at scale 1 and are multiplied by the scale
//!
//! `prepare_markup` converts percentage strings to fractions before this
//! step, so `"50%"` and `0.5` resolve identically.

use serde::{Deserialize, Serialize};

use super::types::{parse_float_prefix, Axis, LineStyle, MarkupItem, MarkupProps, MarkupValue};
use crate::geometry::{Rect, Size};

/// Clone `item`, default its `zIndex` to 0 and turn percentage geometry into
/// unit fractions. The input is left untouched and the operation is
/// idempotent.
pub fn prepare_markup(item: &MarkupItem) -> MarkupItem {
    let mut props = item.props().clone();
    props.z_index = Some(props.z_index());

    for field in props.rect_fields_mut() {
        if let Some(value) = field.as_ref() {
            *field = Some(value.to_optional_fraction());
        }
    }

    MarkupItem(item.kind().to_string(), props)
}

/// Resolve a single value to frame pixels.
///
/// Absent values resolve to 0.
pub fn resolve_value(value: Option<&MarkupValue>, size: Size, scale: f64, axis: Option<Axis>) -> f64 {
    match value {
        Some(MarkupValue::Text(text)) => parse_float_prefix(text) * scale,
        Some(MarkupValue::Number(fraction)) => {
            let reference = match axis {
                Some(Axis::Width) => size.width,
                Some(Axis::Height) => size.height,
                None => size.min_side(),
            };
            fraction * reference
        }
        None => 0.0,
    }
}

fn resolve_field(value: &Option<MarkupValue>, size: Size, scale: f64, axis: Axis) -> Option<f64> {
    value
        .as_ref()
        .map(|v| resolve_value(Some(v), size, scale, Some(axis)))
}

/// Resolve the geometry of `props` into an absolute rect.
///
/// `x`/`left` and `y`/`top` are interchangeable. A missing position is
/// derived from the opposite edge and the extent; a missing extent is
/// derived from both edges. Whatever stays unknown is 0.
pub fn resolve_rect(props: &MarkupProps, size: Size, scale: f64) -> Rect {
    let mut left = resolve_field(&props.x, size, scale, Axis::Width)
        .or_else(|| resolve_field(&props.left, size, scale, Axis::Width));
    let mut top = resolve_field(&props.y, size, scale, Axis::Height)
        .or_else(|| resolve_field(&props.top, size, scale, Axis::Height));
    let mut width = resolve_field(&props.width, size, scale, Axis::Width);
    let mut height = resolve_field(&props.height, size, scale, Axis::Height);
    let right = resolve_field(&props.right, size, scale, Axis::Width);
    let bottom = resolve_field(&props.bottom, size, scale, Axis::Height);

    if top.is_none() {
        top = match (height, bottom) {
            (Some(h), Some(b)) => Some(size.height - h - b),
            _ => bottom,
        };
    }

    if left.is_none() {
        left = match (width, right) {
            (Some(w), Some(r)) => Some(size.width - w - r),
            _ => right,
        };
    }

    if width.is_none() {
        width = match (left, right) {
            (Some(l), Some(r)) => Some(size.width - l - r),
            _ => None,
        };
    }

    if height.is_none() {
        height = match (top, bottom) {
            (Some(t), Some(b)) => Some(size.height - t - b),
            _ => None,
        };
    }

    Rect::new(
        left.unwrap_or(0.0),
        top.unwrap_or(0.0),
        width.unwrap_or(0.0),
        height.unwrap_or(0.0),
    )
}

/// Stroke and fill attributes of a shape, in frame pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    pub stroke: String,
    pub fill: String,
    pub stroke_width: f64,
    pub stroke_linecap: String,
    pub stroke_linejoin: String,
    /// Comma separated dash lengths, empty for a solid stroke.
    pub stroke_dasharray: String,
    pub opacity: f64,
}

impl ResolvedStyle {
    /// SVG attribute pairs for this style.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("stroke-linecap", self.stroke_linecap.clone()),
            ("stroke-linejoin", self.stroke_linejoin.clone()),
            ("stroke-width", self.stroke_width.to_string()),
            ("stroke-dasharray", self.stroke_dasharray.clone()),
            ("stroke", self.stroke.clone()),
            ("fill", self.fill.clone()),
            ("opacity", self.opacity.to_string()),
        ]
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Resolve the style fields of `props`.
///
/// Numeric fields are resolved like geometry; colors, caps and joins pass
/// through.
pub fn resolve_style(props: &MarkupProps, size: Size, scale: f64) -> ResolvedStyle {
    let line_style = props.border_style.as_ref().or(props.line_style.as_ref());
    let stroke_dasharray = match line_style {
        Some(LineStyle::Dashes(dashes)) => dashes
            .iter()
            .map(|dash| resolve_value(Some(dash), size, scale, None).to_string())
            .collect::<Vec<_>>()
            .join(","),
        Some(LineStyle::Named(_)) | None => String::new(),
    };

    let stroke_width = resolve_value(
        props.border_width.as_ref().or(props.line_width.as_ref()),
        size,
        scale,
        None,
    );

    ResolvedStyle {
        stroke: non_empty(&props.border_color)
            .or(non_empty(&props.line_color))
            .unwrap_or("transparent")
            .to_string(),
        fill: non_empty(&props.background_color)
            .or(non_empty(&props.font_color))
            .unwrap_or("transparent")
            .to_string(),
        stroke_width: if stroke_width.is_nan() { 0.0 } else { stroke_width },
        stroke_linecap: non_empty(&props.line_cap).unwrap_or("round").to_string(),
        stroke_linejoin: non_empty(&props.line_join).unwrap_or("round").to_string(),
        stroke_dasharray,
        opacity: props.opacity.filter(|o| *o != 0.0).unwrap_or(1.0),
    }
}
