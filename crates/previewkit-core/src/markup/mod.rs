//! Markup coordinate mapping.
//!
//! Annotation shapes are stored in relative units and resolved at render
//! time into absolute frame coordinates:
//!
//! 1. Filter items with the host predicate
//! 2. Prepare (clone, default `zIndex`, percentages to fractions)
//! 3. Stable sort by `zIndex`
//! 4. Resolve rect and style at the frame's render scale
//! 5. Build the shape variant's render attributes
//!
//! The render scale comes from the crop size of the preview frame, optionally
//! adjusted by the item's resize target.

mod layer;
mod resolve;
mod shapes;
mod types;

pub use layer::{fit_crop_to_resize, render_frame_scale, sort_markup, MarkupLayer};
pub use resolve::{prepare_markup, resolve_rect, resolve_style, resolve_value, ResolvedStyle};
pub use shapes::{
    Arrowhead, EllipseGeometry, ImageFit, ImageShape, LineShape, MarkupElement, MarkupFrame,
    Shape, TextAnchor, TextShape,
};
pub use types::{
    Axis, LineStyle, MarkupError, MarkupItem, MarkupProps, MarkupType, MarkupValue, ResizeConfig,
    ResizeMode, ResizeTarget,
};
