//! Crop and zoom geometry.
//!
//! Maps an image, a rotation and a focal point onto a target aspect-ratio
//! frame. Aspect ratios are height over width throughout, matching the crop
//! metadata written by the editor.
//!
//! # Coordinate System
//!
//! - `center` is normalized (0.0 to 1.0) relative to the image
//! - rotation is in radians and normalized into `[0, 2π)` before use
//! - the canvas is computed in image pixels, divided by zoom

use serde::{Deserialize, Serialize};

use super::vector::{rotated_rect_bounds, Rect, Size, Vector};

/// Horizontal and vertical mirroring of the crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

/// Crop state of a previewed item, as written by the editing UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CropConfig {
    /// Target height / width ratio. `None` uses the image's own ratio.
    pub aspect_ratio: Option<f64>,
    /// Focal point, normalized to the image.
    pub center: Vector,
    /// Zoom factor, must be positive.
    pub zoom: f64,
    /// Rotation in radians, any real value.
    pub rotation: f64,
    pub flip: Flip,
    /// Whether the focal point limits the available image area.
    /// Unset behaves as `true`.
    pub scale_to_fit: Option<bool>,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: None,
            center: Vector::new(0.5, 0.5),
            zoom: 1.0,
            rotation: 0.0,
            flip: Flip::default(),
            scale_to_fit: None,
        }
    }
}

impl CropConfig {
    /// Rotation folded into `[0, 2π)`.
    pub fn normalized_rotation(&self) -> f64 {
        normalize_rotation(self.rotation)
    }

    /// Whether the focal point should limit the zoom factor.
    pub fn should_limit(&self) -> bool {
        self.scale_to_fit.unwrap_or(true)
    }
}

/// Size of the crop in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropSize {
    pub width: u32,
    pub height: u32,
    pub width_float: f64,
    pub height_float: f64,
}

impl CropSize {
    pub fn as_size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }
}

/// Fold any angle into `[0, 2π)` so negative rotations match their
/// positive equivalent.
pub fn normalize_rotation(rotation: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let folded = (tau + rotation).rem_euclid(tau);
    // rem_euclid can round up to exactly tau for tiny negative inputs
    if folded >= tau {
        0.0
    } else {
        folded
    }
}

/// Largest rectangle of `aspect_ratio` (height / width) centered in
/// `container`.
///
/// The overflowing dimension is letterboxed, so the result always fits and
/// has equal margins on opposing sides.
pub fn centered_crop_rect(container: Size, aspect_ratio: f64) -> Rect {
    let mut width = container.width;
    let mut height = width * aspect_ratio;

    if height > container.height {
        height = container.height;
        width = height / aspect_ratio;
    }

    let x = (container.width - width) * 0.5;
    let y = (container.height - height) * 0.5;

    Rect::new(x, y, width, height)
}

/// Minimum uniform scale so that `crop_rect`, rotated by `rotation`, fits in
/// the image area available around the focal `center`.
///
/// The available space is asymmetric: twice the distance from the center to
/// the nearest edge on each axis. A center of exactly 0 or 1 leaves no space
/// and divides by zero; callers guard against it.
pub fn image_rect_zoom_factor(image: Size, crop_rect: &Rect, rotation: f64, center: Vector) -> f64 {
    let cx = center.x.min(1.0 - center.x);
    let cy = center.y.min(1.0 - center.y);
    let available_width = cx * 2.0 * image.width;
    let available_height = cy * 2.0 * image.height;

    let rotated = rotated_rect_bounds(crop_rect, rotation);

    (rotated.width / available_width).max(rotated.height / available_height)
}

/// Canvas that fits the image's aspect ratio into a unit-width frame of
/// height `canvas_aspect_ratio`, expressed in image pixels and divided by
/// `zoom`.
fn canvas_size(image: Size, canvas_aspect_ratio: f64, zoom: f64) -> Size {
    let image_aspect_ratio = image.aspect_ratio();

    let canvas_width = 1.0;
    let canvas_height = canvas_aspect_ratio;
    let mut fit_width = 1.0;
    let mut fit_height = image_aspect_ratio;
    if fit_height > canvas_height {
        fit_height = canvas_height;
        fit_width = fit_height / image_aspect_ratio;
    }

    let scalar = (canvas_width / fit_width).max(canvas_height / fit_height);
    let width = image.width / (zoom * scalar * fit_width);
    let height = width * canvas_aspect_ratio;

    Size::new(width, height)
}

/// Final crop size in image pixels for `image` under `crop`.
///
/// Zero-sized images are not handled; the caller guards against them.
pub fn current_crop_size(image: Size, crop: &CropConfig) -> CropSize {
    let aspect_ratio = crop
        .aspect_ratio
        .filter(|ratio| *ratio > 0.0)
        .unwrap_or_else(|| image.aspect_ratio());

    let canvas = canvas_size(image, aspect_ratio, crop.zoom);
    let stage = Rect::new(0.0, 0.0, canvas.width, canvas.height);

    let focal_center = if crop.should_limit() {
        crop.center
    } else {
        Vector::new(0.5, 0.5)
    };

    let stage_zoom_factor = image_rect_zoom_factor(
        image,
        &centered_crop_rect(stage.size(), aspect_ratio),
        crop.normalized_rotation(),
        focal_center,
    );

    let scale = crop.zoom * stage_zoom_factor;
    let width_float = canvas.width / scale;
    let height_float = canvas.height / scale;

    CropSize {
        width: width_float.round() as u32,
        height: height_float.round() as u32,
        width_float,
        height_float,
    }
}
