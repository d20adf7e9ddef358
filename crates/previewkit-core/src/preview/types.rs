//! Core types for the preview pipeline.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::ItemId;
use crate::markup::MarkupError;

/// Error types for preview operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreviewError {
    /// Neither the fast path nor the fallback could decode the file.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Pixel data of a surface could not be read.
    #[error("Unable to read pixel data: {0}")]
    PixelRead(String),

    /// The item is not known to the host or the previewer.
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// The file cannot be previewed.
    #[error("Unsupported file: {0}")]
    Unsupported(String),

    /// Markup of the item cannot be rendered.
    #[error(transparent)]
    Markup(#[from] MarkupError),
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
#[repr(u8)]
pub enum Orientation {
    #[default]
    Normal = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    /// Flip horizontal + rotate 270 CW.
    Transpose = 5,
    Rotate90CW = 6,
    /// Flip horizontal + rotate 90 CW.
    Transverse = 7,
    Rotate270CW = 8,
}

impl Orientation {
    /// Returns true for the 90° and 270° variants (5-8), which swap width and
    /// height.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }

    /// Width and height after the orientation is applied.
    pub fn oriented(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

/// Out of range values mean no transform.
impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

impl From<Orientation> for u32 {
    fn from(value: Orientation) -> Self {
        value as u32
    }
}

/// Quadratic mean color of a preview surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AverageColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// An upright, size-bounded RGBA preview surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSurface {
    pub image: RgbaImage,
    /// Set when the pixels came from a cross-origin source and cannot be
    /// sampled.
    pub tainted: bool,
}

impl PreviewSurface {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            tainted: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the pixel data.
    ///
    /// # Errors
    ///
    /// Returns `PreviewError::PixelRead` for a tainted surface.
    pub fn pixels(&self) -> Result<&RgbaImage, PreviewError> {
        if self.tainted {
            return Err(PreviewError::PixelRead(
                "surface is tainted by cross-origin data".to_string(),
            ));
        }
        Ok(&self.image)
    }
}
