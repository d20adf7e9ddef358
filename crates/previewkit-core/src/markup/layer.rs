//! Markup layer: frame scaling, draw order and element creation.

use super::resolve::prepare_markup;
use super::shapes::{MarkupElement, MarkupFrame};
use super::types::{MarkupError, MarkupItem, ResizeConfig, ResizeMode};
use crate::geometry::Size;

/// Crop size after applying the resize target's fit mode.
///
/// A missing target dimension mirrors the other one. The crop is only
/// adjusted when it is not smaller than the target on both axes, unless
/// upscaling is allowed.
pub fn fit_crop_to_resize(crop: Size, resize: &ResizeConfig) -> Size {
    let target = resize.size.unwrap_or_default();
    let (output_width, output_height) = match (target.width, target.height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, w),
        (None, Some(h)) => (h, h),
        (None, None) => return crop,
    };

    let should_upscale = crop.width < output_width && crop.height < output_height;
    if should_upscale && !resize.upscale {
        return crop;
    }

    let scalar_width = output_width / crop.width;
    let scalar_height = output_height / crop.height;

    match resize.mode {
        ResizeMode::Force => Size::new(output_width, output_height),
        ResizeMode::Cover => {
            let scalar = scalar_width.max(scalar_height);
            Size::new(crop.width * scalar, crop.height * scalar)
        }
        ResizeMode::Contain => {
            let scalar = scalar_width.min(scalar_height);
            Size::new(crop.width * scalar, crop.height * scalar)
        }
    }
}

/// Scale at which markup is rendered in a view of `view` pixels.
pub fn render_frame_scale(view: Size, crop: Size, resize: Option<&ResizeConfig>) -> f64 {
    let crop = match resize {
        Some(resize) => fit_crop_to_resize(crop, resize),
        None => crop,
    };

    (view.width / crop.width).min(view.height / crop.height)
}

/// Filter, prepare and order markup for drawing.
///
/// Items are sorted ascending by `zIndex`; equal values keep their input
/// order.
pub fn sort_markup<F>(items: &[MarkupItem], filter: F) -> Vec<MarkupItem>
where
    F: Fn(&MarkupItem) -> bool,
{
    let mut prepared: Vec<MarkupItem> = items
        .iter()
        .filter(|item| filter(item))
        .map(prepare_markup)
        .collect();
    prepared.sort_by_key(|item| item.props().z_index());
    prepared
}

/// A rendered set of markup elements for one preview frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkupLayer {
    /// View size the layer was rendered for.
    pub size: Size,
    /// Render scale shared by all elements.
    pub scale: f64,
    /// Elements in draw order.
    pub elements: Vec<MarkupElement>,
}

impl MarkupLayer {
    /// Clear and redraw the layer.
    ///
    /// # Errors
    ///
    /// Returns `MarkupError::UnsupportedType` when an item that passed the
    /// filter has an unknown type tag. Nothing is drawn in that case.
    pub fn render<F>(
        items: &[MarkupItem],
        filter: F,
        view: Size,
        crop: Size,
        resize: Option<&ResizeConfig>,
    ) -> Result<Self, MarkupError>
    where
        F: Fn(&MarkupItem) -> bool,
    {
        let scale = render_frame_scale(view, crop, resize);
        let frame = MarkupFrame { size: view, scale };

        let elements = sort_markup(items, filter)
            .iter()
            .map(|item| {
                let mut element = MarkupElement::create(item.markup_type()?);
                element.update(item.props(), &frame);
                Ok(element)
            })
            .collect::<Result<Vec<_>, MarkupError>>()?;

        log::debug!(
            "Rendered {} markup elements at scale {:.4} into {}x{}",
            elements.len(),
            scale,
            view.width,
            view.height
        );

        Ok(Self {
            size: view,
            scale,
            elements,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::markup::types::MarkupProps;
    use proptest::prelude::*;

    proptest! {
        /// Property: sorting preserves input order among equal zIndex values.
        #[test]
        fn prop_sort_stable(z_indices in proptest::collection::vec(-3i32..3, 0..30)) {
            let items: Vec<MarkupItem> = z_indices
                .iter()
                .enumerate()
                .map(|(i, z)| MarkupItem::new("rect", MarkupProps {
                    z_index: Some(*z),
                    text: Some(i.to_string()),
                    ..Default::default()
                }))
                .collect();

            let sorted = sort_markup(&items, |_| true);
            for pair in sorted.windows(2) {
                let (a, b) = (pair[0].props(), pair[1].props());
                prop_assert!(a.z_index() <= b.z_index());
                if a.z_index() == b.z_index() {
                    let ia: usize = a.text.as_deref().unwrap_or("0").parse().unwrap();
                    let ib: usize = b.text.as_deref().unwrap_or("0").parse().unwrap();
                    prop_assert!(ia < ib);
                }
            }
        }
    }
}
