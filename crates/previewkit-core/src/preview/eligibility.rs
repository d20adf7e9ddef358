//! Checks deciding whether an item gets a preview.

use super::decode::is_image;
use super::PreviewError;
use crate::host::{ItemId, PreviewHost};

/// Outcome of a successful eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Eligibility {
    /// The file is too large to preview instantly and should be queued.
    pub queued: bool,
}

/// Decide whether `id` can be previewed.
///
/// # Errors
///
/// Returns `PreviewError::ItemNotFound` for an unknown item and
/// `PreviewError::Unsupported` for anything that is not previewed.
pub fn check_eligibility<H>(host: &H, id: &ItemId) -> Result<Eligibility, PreviewError>
where
    H: PreviewHost + ?Sized,
{
    let options = host.options();
    if !options.allow_image_preview {
        return Err(PreviewError::Unsupported("image preview is disabled".to_string()));
    }

    let item = host
        .item(id)
        .ok_or_else(|| PreviewError::ItemNotFound(id.clone()))?;

    if item.archived {
        return Err(PreviewError::Unsupported(format!("{id} is archived")));
    }

    if !is_image(&item.file.mime_type) {
        return Err(PreviewError::Unsupported(format!(
            "{} is not an image",
            item.file.mime_type
        )));
    }

    if !host.filter_item(item) {
        return Err(PreviewError::Unsupported(format!("{id} is excluded by the item filter")));
    }

    let fast_decode = host.supports_fast_decode();
    let size = item.file.size();

    if let Some(max_file_size) = options.max_file_size.filter(|max| *max > 0) {
        if !fast_decode && size > max_file_size {
            return Err(PreviewError::Unsupported(format!(
                "{} exceeds the preview size limit of {max_file_size} bytes",
                item.file.name
            )));
        }
    }

    Ok(Eligibility {
        queued: !fast_decode && size > options.max_instant_preview_file_size,
    })
}
