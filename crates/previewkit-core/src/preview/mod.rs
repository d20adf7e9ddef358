//! Preview decode/filter pipeline.
//!
//! This module turns an item's file into a size-bounded, upright preview
//! surface:
//! - Decoding on a fast bitmap path with a URL-fed fallback
//! - Bounding the preview resolution to the container and pixel density
//! - Rasterizing with EXIF orientation applied
//! - Color matrix filtering of a cached raw buffer on worker threads
//! - Average color sampling
//!
//! [`Previewer`] ties these together per item and reports progress to a
//! [`PreviewHost`](crate::host::PreviewHost).

mod color;
mod decode;
mod eligibility;
mod filter;
mod panel;
mod previewer;
mod raster;
mod source;
mod types;
mod worker;

pub use color::average_color;
pub use decode::{decode, decode_bitmap, decode_from_url, is_bitmap, is_image, read_orientation};
pub use eligibility::{check_eligibility, Eligibility};
pub use filter::{apply_filter, spawn_filter, ColorMatrix};
pub use panel::panel_height;
pub use previewer::{PreviewFrame, PreviewState, Previewer};
pub use raster::{apply_orientation, bound_preview_size, rasterize};
pub use source::{ObjectUrl, ObjectUrlRegistry};
pub use types::{AverageColor, Orientation, PreviewError, PreviewSurface};
pub use worker::{TaskState, Worker};
