//! Preview configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for invalid preview options.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Zoom factor must be positive, got {0}")]
    InvalidZoomFactor(f64),

    #[error("Minimum height {min} exceeds maximum height {max}")]
    InvalidHeightRange { min: u32, max: u32 },
}

/// Named configuration values queried by the preview pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewOptions {
    /// Master switch for image previews.
    pub allow_image_preview: bool,
    /// Compute the average color after every filter pass.
    pub calculate_average_image_color: bool,
    /// Fixed panel height, disables height rescaling.
    pub fixed_height: Option<u32>,
    /// Render markup on top of the preview.
    pub markup_show: bool,
    /// Largest file previewed when fast decode is unavailable.
    pub max_file_size: Option<u64>,
    pub max_height: u32,
    /// Larger files are queued when fast decode is unavailable.
    pub max_instant_preview_file_size: u64,
    pub min_height: u32,
    /// Style of the indicator drawn behind transparent images.
    pub transparency_indicator: Option<String>,
    /// Scale small images up to the preview bounds.
    pub upscale: bool,
    /// Extra resolution kept in the preview for zooming.
    pub zoom_factor: f64,
    /// Panel aspect ratio set by the host layout, disables height rescaling.
    pub panel_aspect_ratio: Option<f64>,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            allow_image_preview: true,
            calculate_average_image_color: false,
            fixed_height: None,
            markup_show: true,
            max_file_size: None,
            max_height: 256,
            max_instant_preview_file_size: 1_000_000,
            min_height: 44,
            transparency_indicator: None,
            upscale: false,
            zoom_factor: 2.0,
            panel_aspect_ratio: None,
        }
    }
}

impl PreviewOptions {
    /// Check the options for values the pipeline cannot work with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a non-positive zoom factor or an inverted
    /// height range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zoom_factor.is_nan() || self.zoom_factor <= 0.0 {
            return Err(ConfigError::InvalidZoomFactor(self.zoom_factor));
        }
        if self.min_height > self.max_height {
            return Err(ConfigError::InvalidHeightRange {
                min: self.min_height,
                max: self.max_height,
            });
        }
        Ok(())
    }
}
