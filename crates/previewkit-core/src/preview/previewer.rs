//! Per-item preview orchestration.
//!
//! The `Previewer` keeps one context per item id. Each context moves through
//! `Idle → Decoding → Decoded → Filtering → Ready`, owns the cached raw
//! buffer of its item and holds the frames built from it. The host drives
//! progress by calling [`Previewer::poll`]; finished work is reported back
//! through [`PreviewHost::dispatch`].
//!
//! Every completion re-validates that the item still exists in the host
//! store before it touches anything. Results for removed items are dropped.

use std::collections::HashMap;
use std::sync::Arc;

use image::{DynamicImage, RgbaImage};

use super::color::average_color;
use super::decode::{decode_bitmap, decode_from_url, is_bitmap, read_orientation};
use super::eligibility::{check_eligibility, Eligibility};
use super::filter::{apply_filter, spawn_filter, ColorMatrix};
use super::panel::panel_height;
use super::raster::{bound_preview_size, rasterize};
use super::source::ObjectUrlRegistry;
use super::worker::{TaskState, Worker};
use super::{Orientation, PreviewError, PreviewSurface};
use crate::geometry::{display_transform, CropConfig, DisplayTransform, Size};
use crate::host::{Item, ItemId, MetadataKey, PreviewEvent, PreviewHost};
use crate::markup::MarkupLayer;

/// Aspect ratio changes smaller than this update the current frame in place.
const ASPECT_RATIO_EPSILON: f64 = 1e-5;

/// Lifecycle state of an item preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    Idle,
    Decoding,
    Decoded,
    Filtering,
    Ready,
}

/// Geometry and markup of one displayed preview image.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewFrame {
    pub crop: CropConfig,
    pub transform: DisplayTransform,
    /// `None` when markup display is disabled.
    pub markup: Option<MarkupLayer>,
    /// Indicator drawn behind transparent pixels.
    pub transparency_indicator: Option<String>,
}

impl PreviewFrame {
    fn aspect_ratio(&self) -> f64 {
        self.crop.aspect_ratio.unwrap_or(0.0)
    }
}

enum DecodeTask {
    Fast(Worker<Option<DynamicImage>>),
    Fallback(Worker<Result<DynamicImage, PreviewError>>),
}

struct FilterTask {
    generation: u64,
    worker: Worker<RgbaImage>,
}

#[derive(Default)]
struct ItemContext {
    state: PreviewState,
    orientation: Orientation,
    /// Intrinsic size of the decoded image, before orientation.
    decoded_size: Option<(u32, u32)>,
    tainted: bool,
    decode: Option<DecodeTask>,
    filters: Vec<FilterTask>,
    filter_generation: u64,
    raw: Option<Arc<RgbaImage>>,
    surface: Option<PreviewSurface>,
    frame: Option<PreviewFrame>,
    bin: Vec<PreviewFrame>,
}

/// Drives previews for all items of a host.
#[derive(Default)]
pub struct Previewer {
    contexts: HashMap<ItemId, ItemContext>,
    urls: ObjectUrlRegistry,
}

impl Previewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry used for fallback decode URLs.
    pub fn urls(&self) -> &ObjectUrlRegistry {
        &self.urls
    }

    /// Start previewing `id`.
    ///
    /// A load while a decode for the same item is in flight is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the eligibility error when the item cannot be previewed.
    pub fn load<H: PreviewHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: &ItemId,
    ) -> Result<Eligibility, PreviewError> {
        let eligibility = check_eligibility(&*host, id)?;

        if self
            .contexts
            .get(id)
            .is_some_and(|ctx| ctx.state == PreviewState::Decoding)
        {
            log::debug!("Decode for {id} already in flight");
            return Ok(eligibility);
        }

        let item = host
            .item(id)
            .ok_or_else(|| PreviewError::ItemNotFound(id.clone()))?;

        let orientation = item
            .metadata
            .exif
            .and_then(|exif| exif.orientation)
            .map(Orientation::from)
            .unwrap_or_else(|| read_orientation(&item.file.bytes));

        let decode = if host.supports_fast_decode() && is_bitmap(&item.file.mime_type) {
            log::debug!("Decoding {id} on the fast path");
            let file = item.file.clone();
            DecodeTask::Fast(Worker::spawn("bitmap", move || decode_bitmap(&file)))
        } else {
            self.spawn_fallback(item)
        };

        let ctx = ItemContext {
            state: PreviewState::Decoding,
            orientation,
            tainted: item.file.cors_restricted,
            decode: Some(decode),
            ..Default::default()
        };
        self.contexts.insert(id.clone(), ctx);

        let fixed_height = host.options().fixed_height;
        if let Some(height) = fixed_height {
            host.dispatch(PreviewEvent::PanelHeight {
                id: id.clone(),
                height: f64::from(height),
            });
        }

        Ok(eligibility)
    }

    fn spawn_fallback(&self, item: &Item) -> DecodeTask {
        log::debug!("Decoding {} through an object URL", item.id);
        let url = self.urls.create(item.file.bytes.clone());
        DecodeTask::Fallback(Worker::spawn("image element", move || decode_from_url(url)))
    }

    /// Collect finished worker results and advance every item.
    ///
    /// # Errors
    ///
    /// Returns `PreviewError::Markup` when an item's markup has an unknown
    /// shape type. Remaining items are advanced on the next poll.
    pub fn poll<H: PreviewHost + ?Sized>(&mut self, host: &mut H) -> Result<(), PreviewError> {
        let mut ids: Vec<ItemId> = self.contexts.keys().cloned().collect();
        ids.sort();

        for id in ids {
            if host.item(&id).is_none() {
                log::debug!("Discarding preview work for removed item {id}");
                self.contexts.remove(&id);
                continue;
            }
            self.poll_decode(host, &id)?;
            self.poll_filters(host, &id)?;
        }

        Ok(())
    }

    fn poll_decode<H: PreviewHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: &ItemId,
    ) -> Result<(), PreviewError> {
        let Some(ctx) = self.contexts.get_mut(id) else {
            return Ok(());
        };

        let decoded = match ctx.decode.take() {
            None => return Ok(()),
            Some(DecodeTask::Fast(worker)) => match worker.try_take() {
                TaskState::Pending => {
                    ctx.decode = Some(DecodeTask::Fast(worker));
                    return Ok(());
                }
                TaskState::Done(Some(image)) => image,
                TaskState::Done(None) | TaskState::Lost => {
                    log::info!("Fast decode of {id} returned nothing, falling back");
                    if let Some(item) = host.item(id) {
                        let task = self.spawn_fallback(item);
                        if let Some(ctx) = self.contexts.get_mut(id) {
                            ctx.decode = Some(task);
                        }
                    }
                    return Ok(());
                }
            },
            Some(DecodeTask::Fallback(worker)) => match worker.try_take() {
                TaskState::Pending => {
                    ctx.decode = Some(DecodeTask::Fallback(worker));
                    return Ok(());
                }
                TaskState::Done(Ok(image)) => image,
                TaskState::Done(Err(e)) => {
                    self.fail_load(host, id, e.to_string());
                    return Ok(());
                }
                TaskState::Lost => {
                    self.fail_load(host, id, "decoder stopped unexpectedly".to_string());
                    return Ok(());
                }
            },
        };

        self.on_decoded(host, id, decoded)
    }

    fn fail_load<H: PreviewHost + ?Sized>(&mut self, host: &mut H, id: &ItemId, message: String) {
        log::warn!("Unable to load preview for {id}: {message}");
        if let Some(ctx) = self.contexts.get_mut(id) {
            ctx.state = PreviewState::Idle;
        }
        host.dispatch(PreviewEvent::LoadError {
            id: id.clone(),
            message,
        });
    }

    fn on_decoded<H: PreviewHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: &ItemId,
        image: DynamicImage,
    ) -> Result<(), PreviewError> {
        let Some(item) = host.item(id) else {
            return Ok(());
        };
        let Some(ctx) = self.contexts.get_mut(id) else {
            return Ok(());
        };

        let (width, height) = (image.width(), image.height());
        let bitmap = is_bitmap(&item.file.mime_type);
        let crop_aspect_ratio = item.metadata.crop.as_ref().and_then(|crop| crop.aspect_ratio);
        let container = host.container_size(id);

        log::info!("Decoded {id} at {width}x{height}");
        ctx.state = PreviewState::Decoded;
        ctx.decoded_size = Some((width, height));

        let target = bound_preview_size(
            (width, height),
            ctx.orientation,
            container,
            host.options().zoom_factor,
            host.device_pixel_ratio(),
        );
        ctx.raw = Some(Arc::new(rasterize(image, target, ctx.orientation)));

        let panel = panel_height(
            host.options(),
            (width, height),
            ctx.orientation,
            bitmap,
            crop_aspect_ratio,
            container.width,
        );

        host.dispatch(PreviewEvent::DecodeComplete {
            id: id.clone(),
            width,
            height,
        });
        if let Some(height) = panel {
            host.dispatch(PreviewEvent::PanelHeight {
                id: id.clone(),
                height,
            });
        }

        self.start_filter(host, id)
    }

    /// Filter the cached raw buffer with the item's current matrix.
    fn start_filter<H: PreviewHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: &ItemId,
    ) -> Result<(), PreviewError> {
        let Some(item) = host.item(id) else {
            return Ok(());
        };
        let Some(ctx) = self.contexts.get_mut(id) else {
            return Ok(());
        };
        let Some(raw) = ctx.raw.clone() else {
            return Ok(());
        };

        ctx.filter_generation += 1;
        let values = item.metadata.filter.as_deref();

        match values.and_then(ColorMatrix::from_slice) {
            Some(matrix) => {
                ctx.state = PreviewState::Filtering;
                ctx.filters.push(FilterTask {
                    generation: ctx.filter_generation,
                    worker: spawn_filter(&raw, matrix),
                });
                Ok(())
            }
            None => {
                if let Some(values) = values {
                    log::debug!("Ignoring color matrix of {} values for {id}", values.len());
                }
                self.finish_filter(host, id, apply_filter(&raw, None))
            }
        }
    }

    fn poll_filters<H: PreviewHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: &ItemId,
    ) -> Result<(), PreviewError> {
        let Some(ctx) = self.contexts.get_mut(id) else {
            return Ok(());
        };

        let current = ctx.filter_generation;
        let mut latest = None;

        ctx.filters.retain(|task| match task.worker.try_take() {
            TaskState::Pending => true,
            TaskState::Done(pixels) if task.generation == current => {
                latest = Some(Some(pixels));
                false
            }
            TaskState::Lost if task.generation == current => {
                latest = Some(None);
                false
            }
            _ => {
                log::debug!("Discarding superseded filter result for {id}");
                false
            }
        });

        let pixels = match latest {
            None => return Ok(()),
            Some(Some(pixels)) => pixels,
            Some(None) => match &ctx.raw {
                Some(raw) => apply_filter(raw, None),
                None => return Ok(()),
            },
        };

        self.finish_filter(host, id, pixels)
    }

    fn finish_filter<H: PreviewHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: &ItemId,
        pixels: RgbaImage,
    ) -> Result<(), PreviewError> {
        let Some(ctx) = self.contexts.get_mut(id) else {
            return Ok(());
        };

        let surface = PreviewSurface {
            image: pixels,
            tainted: ctx.tainted,
        };
        let color = if host.options().calculate_average_image_color {
            average_color(&surface)
        } else {
            None
        };
        ctx.surface = Some(surface);

        match host.item_mut(id) {
            Some(item) => item.metadata.color = color,
            None => return Ok(()),
        }

        self.refresh_frame(host, id, false)
    }

    /// Rebuild the current frame, or bin it and start a new one.
    fn refresh_frame<H: PreviewHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: &ItemId,
        replace: bool,
    ) -> Result<(), PreviewError> {
        let Some(item) = host.item(id) else {
            return Ok(());
        };
        let Some(ctx) = self.contexts.get_mut(id) else {
            return Ok(());
        };
        let Some(surface) = &ctx.surface else {
            return Ok(());
        };

        let options = host.options();
        let crop = item.metadata.crop.clone().unwrap_or_default();
        let frame_size = host.container_size(id);
        let image_size = Size::new(f64::from(surface.width()), f64::from(surface.height()));
        let transform = display_transform(image_size, frame_size, &crop);

        let markup = if options.markup_show {
            let layer = MarkupLayer::render(
                &item.metadata.markup,
                |markup| host.filter_markup(markup),
                frame_size,
                transform.crop_size.as_size(),
                item.metadata.resize.as_ref(),
            )
            .inspect_err(|_| ctx.state = PreviewState::Decoded)?;
            Some(layer)
        } else {
            None
        };

        let frame = PreviewFrame {
            crop,
            transform,
            markup,
            transparency_indicator: options.transparency_indicator.clone(),
        };

        if replace {
            if let Some(previous) = ctx.frame.take() {
                ctx.bin.push(previous);
            }
        }
        ctx.frame = Some(frame);
        ctx.state = PreviewState::Ready;

        host.dispatch(PreviewEvent::RenderReady { id: id.clone() });
        Ok(())
    }

    /// React to a metadata change of `id`.
    ///
    /// `filter` changes re-filter from the cached buffer once one exists,
    /// superseding any filter still in flight. `crop`, `markup` and `resize`
    /// changes rebuild the frame geometry once a surface exists, including
    /// after a failed first render; a changed crop aspect ratio moves the
    /// current frame to the bin first. Other keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns `PreviewError::ItemNotFound` when the item left the host
    /// store, and `PreviewError::Markup` for unknown markup types.
    pub fn update_metadata<H: PreviewHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: &ItemId,
        key: MetadataKey,
    ) -> Result<(), PreviewError> {
        if !key.triggers_redraw() {
            return Ok(());
        }

        let Some(ctx) = self.contexts.get(id) else {
            return Ok(());
        };
        let ready = match key {
            MetadataKey::Filter => ctx.raw.is_some(),
            _ => ctx.surface.is_some(),
        };
        if !ready {
            return Ok(());
        }

        let Some(item) = host.item(id) else {
            self.contexts.remove(id);
            return Err(PreviewError::ItemNotFound(id.clone()));
        };

        if key == MetadataKey::Filter {
            return self.start_filter(host, id);
        }

        let crop_aspect_ratio = item.metadata.crop.as_ref().and_then(|crop| crop.aspect_ratio);
        let replace = ctx.frame.as_ref().is_some_and(|frame| {
            (crop_aspect_ratio.unwrap_or(0.0) - frame.aspect_ratio()).abs() > ASPECT_RATIO_EPSILON
        });

        if key == MetadataKey::Crop {
            self.rescale_panel(host, id, crop_aspect_ratio);
        }

        if replace {
            log::debug!("Crop aspect ratio of {id} changed, replacing frame");
        }
        self.refresh_frame(host, id, replace)
    }

    fn rescale_panel<H: PreviewHost + ?Sized>(
        &self,
        host: &mut H,
        id: &ItemId,
        crop_aspect_ratio: Option<f64>,
    ) {
        let (Some(item), Some(ctx)) = (host.item(id), self.contexts.get(id)) else {
            return;
        };
        let Some(decoded_size) = ctx.decoded_size else {
            return;
        };

        let height = panel_height(
            host.options(),
            decoded_size,
            ctx.orientation,
            is_bitmap(&item.file.mime_type),
            crop_aspect_ratio,
            host.container_size(id).width,
        );

        if let Some(height) = height {
            host.dispatch(PreviewEvent::PanelHeight {
                id: id.clone(),
                height,
            });
        }
    }

    /// Forget `id`. In-flight work finishes in the background and is dropped.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        self.contexts.remove(id).is_some()
    }

    /// Take the frames superseded by aspect ratio changes.
    pub fn collect_bin(&mut self, id: &ItemId) -> Vec<PreviewFrame> {
        self.contexts
            .get_mut(id)
            .map(|ctx| std::mem::take(&mut ctx.bin))
            .unwrap_or_default()
    }

    pub fn state(&self, id: &ItemId) -> Option<PreviewState> {
        self.contexts.get(id).map(|ctx| ctx.state)
    }

    pub fn frame(&self, id: &ItemId) -> Option<&PreviewFrame> {
        self.contexts.get(id).and_then(|ctx| ctx.frame.as_ref())
    }

    pub fn surface(&self, id: &ItemId) -> Option<&PreviewSurface> {
        self.contexts.get(id).and_then(|ctx| ctx.surface.as_ref())
    }

    /// The cached, unfiltered preview pixels.
    pub fn raw_buffer(&self, id: &ItemId) -> Option<&RgbaImage> {
        self.contexts.get(id).and_then(|ctx| ctx.raw.as_deref())
    }

    /// True while any item still waits on a worker.
    pub fn is_busy(&self) -> bool {
        self.contexts
            .values()
            .any(|ctx| ctx.decode.is_some() || !ctx.filters.is_empty())
    }
}
