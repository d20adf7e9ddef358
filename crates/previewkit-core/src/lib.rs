//! Previewkit Core - image upload preview engine
//!
//! This crate computes everything behind an interactive image preview:
//! crop and zoom geometry, annotation markup layout, and the
//! decode/filter pipeline producing the preview surface.
//!
//! The host application owns items, options and the actual view; it talks
//! to the engine through [`host::PreviewHost`].

pub mod config;
pub mod geometry;
pub mod host;
pub mod markup;
pub mod preview;

pub use config::{ConfigError, PreviewOptions};
pub use geometry::{
    centered_crop_rect, current_crop_size, display_transform, image_rect_zoom_factor,
    rotated_rect_bounds, CropConfig, CropSize, DisplayTransform, Flip, Rect, Size, Vector,
};
pub use host::{Item, ItemFile, ItemId, ItemMetadata, MetadataKey, PreviewEvent, PreviewHost};
pub use markup::{MarkupError, MarkupItem, MarkupLayer, ResizeConfig};
pub use preview::{AverageColor, ColorMatrix, Orientation, PreviewError, Previewer};
