//! Color matrix filtering of cached preview pixels.

use std::sync::Arc;

use image::RgbaImage;

use super::worker::Worker;

/// A 4x5 affine RGBA transform in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix([f32; 20]);

impl ColorMatrix {
    pub const IDENTITY: ColorMatrix = ColorMatrix([
        1.0, 0.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]);

    pub fn new(values: [f32; 20]) -> Self {
        Self(values)
    }

    /// Build a matrix from host data. Anything but exactly 20 values is no
    /// matrix at all.
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        <[f32; 20]>::try_from(values).ok().map(Self)
    }

    pub fn values(&self) -> &[f32; 20] {
        &self.0
    }

    /// Transform one RGBA pixel. Channels are normalized to `[0, 1]` before
    /// the transform and clamped back to bytes after it.
    #[inline]
    pub fn apply_pixel(&self, pixel: [u8; 4]) -> [u8; 4] {
        let [r, g, b, a] = pixel.map(|c| f32::from(c) / 255.0);
        let m = &self.0;

        std::array::from_fn(|row| {
            let i = row * 5;
            let value = r * m[i] + g * m[i + 1] + b * m[i + 2] + a * m[i + 3] + m[i + 4];
            (value * 255.0).round().clamp(0.0, 255.0) as u8
        })
    }
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Filter a copy of `raw`. Without a matrix the copy is returned unchanged.
pub fn apply_filter(raw: &RgbaImage, matrix: Option<&ColorMatrix>) -> RgbaImage {
    let mut filtered = raw.clone();

    if let Some(matrix) = matrix {
        for pixel in filtered.pixels_mut() {
            pixel.0 = matrix.apply_pixel(pixel.0);
        }
    }

    filtered
}

/// Run `apply_filter` on a worker thread against a shared cached buffer.
pub fn spawn_filter(raw: &Arc<RgbaImage>, matrix: ColorMatrix) -> Worker<RgbaImage> {
    let raw = Arc::clone(raw);
    Worker::spawn("color matrix", move || apply_filter(&raw, Some(&matrix)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient() -> RgbaImage {
        RgbaImage::from_fn(16, 16, |x, y| Rgba([(x * 16) as u8, (y * 16) as u8, 128, 255]))
    }

    #[test]
    fn test_from_slice_requires_twenty_values() {
        assert!(ColorMatrix::from_slice(&[0.0; 19]).is_none());
        assert!(ColorMatrix::from_slice(&[0.0; 21]).is_none());
        assert!(ColorMatrix::from_slice(&[]).is_none());
        assert_eq!(
            ColorMatrix::from_slice(ColorMatrix::IDENTITY.values()),
            Some(ColorMatrix::IDENTITY)
        );
    }

    #[test]
    fn test_no_matrix_is_identity() {
        let raw = gradient();
        assert_eq!(apply_filter(&raw, None), raw);
    }

    #[test]
    fn test_identity_matrix_preserves_pixels() {
        let raw = gradient();
        assert_eq!(apply_filter(&raw, Some(&ColorMatrix::IDENTITY)), raw);
    }

    #[test]
    fn test_grayscale_matrix() {
        let gray = ColorMatrix::new([
            0.3333, 0.3333, 0.3333, 0.0, 0.0, //
            0.3333, 0.3333, 0.3333, 0.0, 0.0, //
            0.3333, 0.3333, 0.3333, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]);
        let out = gray.apply_pixel([255, 0, 0, 255]);
        assert_eq!(out, [85, 85, 85, 255]);
    }

    #[test]
    fn test_offset_clamps() {
        let bright = ColorMatrix::new([
            1.0, 0.0, 0.0, 0.0, 0.5, //
            0.0, 1.0, 0.0, 0.0, -0.5, //
            0.0, 0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]);
        assert_eq!(bright.apply_pixel([200, 100, 7, 255]), [255, 0, 7, 255]);
    }

    #[test]
    fn test_invert_matrix() {
        let invert = ColorMatrix::new([
            -1.0, 0.0, 0.0, 0.0, 1.0, //
            0.0, -1.0, 0.0, 0.0, 1.0, //
            0.0, 0.0, -1.0, 0.0, 1.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]);
        assert_eq!(invert.apply_pixel([0, 255, 100, 40]), [255, 0, 155, 40]);
    }

    #[test]
    fn test_source_is_not_mutated() {
        let raw = Arc::new(gradient());
        let snapshot = (*raw).clone();
        let invert = ColorMatrix::new([
            -1.0, 0.0, 0.0, 0.0, 1.0, //
            0.0, -1.0, 0.0, 0.0, 1.0, //
            0.0, 0.0, -1.0, 0.0, 1.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]);

        let filtered = spawn_filter(&raw, invert).wait().unwrap();
        assert_ne!(filtered, snapshot);
        assert_eq!(*raw, snapshot);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the identity matrix maps every pixel to itself.
        #[test]
        fn prop_identity_pixel(pixel in any::<[u8; 4]>()) {
            prop_assert_eq!(ColorMatrix::IDENTITY.apply_pixel(pixel), pixel);
        }
    }
}
