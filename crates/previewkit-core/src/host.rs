//! Interface to the host that owns items, options and the view.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::PreviewOptions;
use crate::geometry::{CropConfig, Size};
use crate::markup::{MarkupItem, ResizeConfig};
use crate::preview::AverageColor;

/// Identifier of an item in the host store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The source file of an item.
#[derive(Debug, Clone)]
pub struct ItemFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
    /// Loaded from another origin; decoded pixels cannot be sampled.
    pub cors_restricted: bool,
}

impl ItemFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
            cors_restricted: false,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExifMetadata {
    pub orientation: Option<u32>,
}

/// Keyed metadata stored per item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemMetadata {
    pub crop: Option<CropConfig>,
    pub resize: Option<ResizeConfig>,
    pub markup: Vec<MarkupItem>,
    pub filter: Option<Vec<f32>>,
    pub exif: Option<ExifMetadata>,
    pub color: Option<AverageColor>,
}

/// Metadata keys a host can report as changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    Crop,
    Resize,
    Markup,
    Filter,
    Exif,
    Color,
}

impl MetadataKey {
    /// Keys that affect what the preview shows.
    pub fn triggers_redraw(self) -> bool {
        matches!(
            self,
            MetadataKey::Crop | MetadataKey::Resize | MetadataKey::Markup | MetadataKey::Filter
        )
    }
}

#[derive(Debug, Clone)]
pub struct Item {
    pub id: ItemId,
    pub file: ItemFile,
    pub archived: bool,
    pub metadata: ItemMetadata,
}

impl Item {
    pub fn new(id: impl Into<String>, file: ItemFile) -> Self {
        Self {
            id: ItemId::new(id),
            file,
            archived: false,
            metadata: ItemMetadata::default(),
        }
    }
}

/// Notifications sent from the previewer to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewEvent {
    /// The intrinsic size of the item's image is known.
    DecodeComplete { id: ItemId, width: u32, height: u32 },
    /// The item panel should take this height.
    PanelHeight { id: ItemId, height: f64 },
    /// A preview surface and its geometry are ready to draw.
    RenderReady { id: ItemId },
    /// The image could not be decoded.
    LoadError { id: ItemId, message: String },
}

/// Queries and callbacks the previewer needs from its host.
pub trait PreviewHost {
    fn options(&self) -> &PreviewOptions;

    fn item(&self, id: &ItemId) -> Option<&Item>;

    fn item_mut(&mut self, id: &ItemId) -> Option<&mut Item>;

    /// Whether the fast decode path can be used.
    fn supports_fast_decode(&self) -> bool;

    /// Size of the item's preview element.
    fn container_size(&self, id: &ItemId) -> Size;

    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }

    /// Decide whether an item gets a preview.
    fn filter_item(&self, _item: &Item) -> bool {
        true
    }

    /// Decide whether a markup item is drawn.
    fn filter_markup(&self, _markup: &MarkupItem) -> bool {
        true
    }

    fn dispatch(&mut self, event: PreviewEvent);
}
