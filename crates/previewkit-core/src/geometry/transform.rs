//! Display transform of the preview surface inside its clip frame.
//!
//! The surface is scaled to cover the frame, shifted so the crop focal point
//! sits at the frame center, rotated and optionally mirrored. The markup
//! crop size is derived from the scaled surface so annotations share the
//! same frame.

use serde::{Deserialize, Serialize};

use super::crop::{current_crop_size, CropConfig, CropSize};
use super::vector::{Size, Vector};

/// Placement of the preview surface within the clip frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayTransform {
    /// Transform origin in frame pixels.
    pub origin: Vector,
    /// Translation applied after scaling.
    pub translation: Vector,
    /// Rotation in radians, within `[0, 2π)`.
    pub rotation: f64,
    /// Uniform scale applied to the surface.
    pub scale: f64,
    /// `-1.0` for a mirrored axis, otherwise `1.0`.
    pub flip_x: f64,
    pub flip_y: f64,
    /// Surface size after scaling.
    pub scaled_image: Size,
    /// Crop size of the scaled surface, used to scale markup.
    pub crop_size: CropSize,
}

/// Scale that makes `image` cover `frame`.
///
/// Shrinks when the image exceeds the frame on both axes, otherwise grows.
fn cover_scale(image: Size, frame: Size) -> f64 {
    let (scale_width, scale_height) = if image.height > frame.height && image.width > frame.width {
        (
            image.width.min(frame.width) / image.width.max(frame.width),
            image.height.min(frame.height) / image.height.max(frame.height),
        )
    } else {
        (
            image.width.max(frame.width) / image.width.min(frame.width),
            image.height.max(frame.height) / image.height.min(frame.height),
        )
    };

    scale_width.max(scale_height)
}

/// Compute the display transform of a surface of size `image` in `frame`.
///
/// A crop center of exactly 0 on an axis makes the translation infinite;
/// callers keep the center inside `(0, 1)`.
pub fn display_transform(image: Size, frame: Size, crop: &CropConfig) -> DisplayTransform {
    let scale = cover_scale(image, frame);
    let scaled_image = Size::new(image.width * scale, image.height * scale);
    let frame_center = Vector::new(frame.width * 0.5, frame.height * 0.5);

    let origin = Vector::new(
        crop.center.x * (scaled_image.width - frame.width),
        crop.center.y * (scaled_image.height - frame.height),
    );

    let translation = Vector::new(
        frame_center.x / crop.center.x - scaled_image.width,
        frame_center.y / crop.center.y - scaled_image.height,
    );

    DisplayTransform {
        origin,
        translation,
        rotation: crop.normalized_rotation(),
        scale,
        flip_x: if crop.flip.horizontal { -1.0 } else { 1.0 },
        flip_y: if crop.flip.vertical { -1.0 } else { 1.0 },
        scaled_image,
        crop_size: current_crop_size(scaled_image, crop),
    }
}
