//! Average color of a preview surface.

use image::imageops::{self, FilterType};

use super::{AverageColor, PreviewError, PreviewSurface};

/// The surface is sampled into a box no larger than this on either side.
const SAMPLE_BOX: f64 = 10.0;

/// Quadratic mean color of `surface`, or `None` when its pixels cannot be
/// read.
pub fn average_color(surface: &PreviewSurface) -> Option<AverageColor> {
    match sample_average(surface) {
        Ok(color) => Some(color),
        Err(e) => {
            log::warn!("Skipping average color: {e}");
            None
        }
    }
}

fn sample_average(surface: &PreviewSurface) -> Result<AverageColor, PreviewError> {
    let pixels = surface.pixels()?;
    let (width, height) = pixels.dimensions();
    if width == 0 || height == 0 {
        return Err(PreviewError::PixelRead("surface is empty".to_string()));
    }

    let scalar = (SAMPLE_BOX / f64::from(width)).min(SAMPLE_BOX / f64::from(height));
    let sample_width = (f64::from(width) * scalar).ceil().max(1.0) as u32;
    let sample_height = (f64::from(height) * scalar).ceil().max(1.0) as u32;
    let sample = if (sample_width, sample_height) == (width, height) {
        pixels.clone()
    } else {
        imageops::resize(pixels, sample_width, sample_height, FilterType::Triangle)
    };

    let mut sums = [0u64; 3];
    for pixel in sample.pixels() {
        for (sum, channel) in sums.iter_mut().zip(pixel.0) {
            *sum += u64::from(channel) * u64::from(channel);
        }
    }

    let count = f64::from(sample_width * sample_height);
    let [r, g, b] = sums.map(|sum| (sum as f64 / count).sqrt().floor() as u8);
    Ok(AverageColor { r, g, b })
}
