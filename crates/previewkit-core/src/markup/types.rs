//! Core types for markup annotations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for markup rendering.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkupError {
    /// The markup item's type has no shape variant.
    #[error("Unsupported markup type: {0}")]
    UnsupportedType(String),
}

/// Shape variants a markup item can render as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkupType {
    Rect,
    Ellipse,
    Text,
    Line,
    Image,
}

impl MarkupType {
    pub fn as_str(self) -> &'static str {
        match self {
            MarkupType::Rect => "rect",
            MarkupType::Ellipse => "ellipse",
            MarkupType::Text => "text",
            MarkupType::Line => "line",
            MarkupType::Image => "image",
        }
    }
}

impl FromStr for MarkupType {
    type Err = MarkupError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "rect" => Ok(MarkupType::Rect),
            "ellipse" => Ok(MarkupType::Ellipse),
            "text" => Ok(MarkupType::Text),
            "line" => Ok(MarkupType::Line),
            "image" => Ok(MarkupType::Image),
            other => Err(MarkupError::UnsupportedType(other.to_string())),
        }
    }
}

impl fmt::Display for MarkupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A geometry or style value as stored in annotation data.
///
/// Numbers are unit fractions of the frame; strings are either percentages
/// (`"25%"`) or literal pixel values (`"12"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkupValue {
    Number(f64),
    Text(String),
}

impl MarkupValue {
    /// Percentage strings become unit fractions; everything else is kept.
    pub fn to_optional_fraction(&self) -> MarkupValue {
        match self {
            MarkupValue::Text(text) if text.contains('%') => {
                MarkupValue::Number(parse_float_prefix(text) / 100.0)
            }
            other => other.clone(),
        }
    }
}

impl From<f64> for MarkupValue {
    fn from(value: f64) -> Self {
        MarkupValue::Number(value)
    }
}

impl From<&str> for MarkupValue {
    fn from(value: &str) -> Self {
        MarkupValue::Text(value.to_string())
    }
}

/// Parse the longest leading float of `text`, ignoring leading whitespace
/// and trailing units. Unparseable text yields `NaN`.
pub(crate) fn parse_float_prefix(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;

    while end < bytes.len() {
        let c = bytes[end];
        match c {
            b'0'..=b'9' => seen_digit = true,
            b'+' | b'-' if end == 0 => {}
            b'+' | b'-' if seen_exp && matches!(bytes[end - 1], b'e' | b'E') => {}
            b'.' if !seen_dot && !seen_exp => seen_dot = true,
            b'e' | b'E' if seen_digit && !seen_exp => seen_exp = true,
            _ => break,
        }
        end += 1;
    }

    // Back off an incomplete exponent such as "5e" or "5e-"
    let mut candidate = &trimmed[..end];
    while !candidate.is_empty() {
        if let Ok(value) = candidate.parse::<f64>() {
            return value;
        }
        candidate = &candidate[..candidate.len() - 1];
    }
    f64::NAN
}

/// Dash pattern of a stroke: a named style or a list of dash lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineStyle {
    Named(String),
    Dashes(Vec<MarkupValue>),
}

/// Properties of a markup item.
///
/// Geometry fields accept numbers, percentages or pixel strings. Style and
/// content fields are specific to the shape variant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkupProps {
    pub x: Option<MarkupValue>,
    pub y: Option<MarkupValue>,
    pub left: Option<MarkupValue>,
    pub top: Option<MarkupValue>,
    pub right: Option<MarkupValue>,
    pub bottom: Option<MarkupValue>,
    pub width: Option<MarkupValue>,
    pub height: Option<MarkupValue>,
    pub z_index: Option<i32>,

    pub background_color: Option<String>,
    pub font_color: Option<String>,
    pub border_color: Option<String>,
    pub line_color: Option<String>,
    pub border_width: Option<MarkupValue>,
    pub line_width: Option<MarkupValue>,
    pub border_style: Option<LineStyle>,
    pub line_style: Option<LineStyle>,
    pub line_cap: Option<String>,
    pub line_join: Option<String>,
    pub opacity: Option<f64>,

    pub text: Option<String>,
    pub font_size: Option<MarkupValue>,
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
    pub text_align: Option<String>,

    pub line_decoration: Option<Vec<String>>,

    pub src: Option<String>,
    pub fit: Option<String>,
}

impl MarkupProps {
    /// Draw order priority, 0 when unset.
    pub fn z_index(&self) -> i32 {
        self.z_index.unwrap_or(0)
    }

    /// Mutable references to the eight geometry fields.
    pub(crate) fn rect_fields_mut(&mut self) -> [&mut Option<MarkupValue>; 8] {
        [
            &mut self.x,
            &mut self.y,
            &mut self.left,
            &mut self.top,
            &mut self.right,
            &mut self.bottom,
            &mut self.width,
            &mut self.height,
        ]
    }
}

/// A markup annotation: shape type tag plus properties.
///
/// Serialized as a two-element array, `["rect", {...}]`. The tag is kept as
/// a string so unknown types surface as an error at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkupItem(pub String, pub MarkupProps);

impl MarkupItem {
    pub fn new(kind: impl Into<String>, props: MarkupProps) -> Self {
        MarkupItem(kind.into(), props)
    }

    pub fn kind(&self) -> &str {
        &self.0
    }

    pub fn props(&self) -> &MarkupProps {
        &self.1
    }

    /// Resolve the type tag to a shape variant.
    pub fn markup_type(&self) -> Result<MarkupType, MarkupError> {
        self.0.parse()
    }
}

/// Axis a fractional value scales against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

/// How the crop is reconciled with a resize target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Stretch to the target.
    Force,
    /// Scale until the target is covered.
    #[default]
    Cover,
    /// Scale until the crop fits inside the target.
    Contain,
}

/// Resize target; either dimension may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeTarget {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Output resize settings of an item.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    pub size: Option<ResizeTarget>,
    pub mode: ResizeMode,
    pub upscale: bool,
}
