//! Sizing and rasterizing decoded bitmaps into preview surfaces.

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use super::Orientation;
use crate::geometry::Size;

/// Rendered size of the preview for a decoded image.
///
/// The size is capped at the container scaled by `zoom_factor` and the
/// pixel density factor `max(1, device_pixel_ratio * 0.75)`. Portrait images
/// are bounded on their width, all others on their height, and the image is
/// never enlarged past its intrinsic size.
pub fn bound_preview_size(
    decoded: (u32, u32),
    orientation: Orientation,
    container: Size,
    zoom_factor: f64,
    device_pixel_ratio: f64,
) -> Size {
    let (width, height) = orientation.oriented(decoded.0, decoded.1);
    let (width, height) = (f64::from(width), f64::from(height));

    let pixel_density = (device_pixel_ratio * 0.75).max(1.0);
    let scale = zoom_factor * pixel_density;
    let ratio = height / width;

    if ratio > 1.0 {
        let bounded = width.min(container.width * scale);
        Size::new(bounded, bounded * ratio)
    } else {
        let bounded = height.min(container.height * scale);
        Size::new(bounded / ratio, bounded)
    }
}

/// Rotate and flip a bitmap so that it is upright.
pub fn apply_orientation(image: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => image,
        Orientation::FlipHorizontal => image.fliph(),
        Orientation::Rotate180 => image.rotate180(),
        Orientation::FlipVertical => image.flipv(),
        Orientation::Transpose => image.rotate90().fliph(),
        Orientation::Rotate90CW => image.rotate90(),
        Orientation::Transverse => image.rotate270().fliph(),
        Orientation::Rotate270CW => image.rotate270(),
    }
}

/// Draw `decoded` into an upright surface of `target` size.
///
/// `target` is the upright size; it is rounded to whole pixels. The decoded
/// bitmap is consumed and released once drawn.
pub fn rasterize(decoded: DynamicImage, target: Size, orientation: Orientation) -> RgbaImage {
    let width = target.width.round().max(1.0) as u32;
    let height = target.height.round().max(1.0) as u32;
    let (stored_width, stored_height) = orientation.oriented(width, height);

    let resized = if decoded.width() == stored_width && decoded.height() == stored_height {
        decoded
    } else {
        decoded.resize_exact(stored_width, stored_height, FilterType::Triangle)
    };

    log::debug!("Rasterized preview surface at {width}x{height} ({orientation:?})");
    apply_orientation(resized, orientation).into_rgba8()
}
