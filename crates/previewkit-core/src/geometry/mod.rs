//! Geometry for the preview frame: vector kernel, crop sizing and the
//! display transform.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner, y grows downward
//! - Aspect ratios are height / width
//! - Rotation angles are in radians

mod crop;
mod transform;
mod vector;

pub use crop::{
    centered_crop_rect, current_crop_size, image_rect_zoom_factor, normalize_rotation, CropConfig,
    CropSize, Flip,
};
pub use transform::{display_transform, DisplayTransform};
pub use vector::{rotated_rect_bounds, Rect, Size, Vector};
