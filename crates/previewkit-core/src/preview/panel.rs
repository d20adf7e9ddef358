//! Height of the item panel that hosts a preview.

use super::Orientation;
use crate::config::PreviewOptions;

/// Width images are scaled to when upscaling.
const UPSCALE_WIDTH: f64 = 2048.0;

/// Panel height for an image of `decoded` size shown `item_width` wide.
///
/// Returns `None` when the host fixes the height or the aspect ratio of the
/// panel, or when the image has no area. The height follows the crop aspect
/// ratio (or the image's own) and is clamped to the configured range, never
/// exceeding the image height unless upscaling.
pub fn panel_height(
    options: &PreviewOptions,
    decoded: (u32, u32),
    orientation: Orientation,
    bitmap: bool,
    crop_aspect_ratio: Option<f64>,
    item_width: f64,
) -> Option<f64> {
    if options.fixed_height.is_some() || options.panel_aspect_ratio.is_some() {
        return None;
    }
    if decoded.0 == 0 || decoded.1 == 0 {
        return None;
    }

    let (width, height) = orientation.oriented(decoded.0, decoded.1);
    let (mut width, mut height) = (f64::from(width), f64::from(height));

    if !bitmap || options.upscale {
        let scalar = UPSCALE_WIDTH / width;
        width *= scalar;
        height *= scalar;
    }

    let image_aspect_ratio = height / width;
    let preview_aspect_ratio = crop_aspect_ratio
        .filter(|ratio| *ratio > 0.0)
        .unwrap_or(image_aspect_ratio);

    let max_height = f64::from(options.min_height).max(height.min(f64::from(options.max_height)));
    Some((item_width * preview_aspect_ratio).min(max_height))
}
