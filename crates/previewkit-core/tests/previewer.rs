//! Integration tests for the per-item preview orchestration.

use std::io::Cursor;
use std::thread;
use std::time::{Duration, Instant};

use image::{ImageFormat, Rgba, RgbaImage};
use previewkit_core::config::PreviewOptions;
use previewkit_core::geometry::{CropConfig, Size};
use previewkit_core::host::{Item, ItemFile, ItemId, MetadataKey, PreviewEvent, PreviewHost};
use previewkit_core::markup::{MarkupError, MarkupItem, MarkupProps};
use previewkit_core::preview::{AverageColor, PreviewError, PreviewState, Previewer};

const INVERT: [f32; 20] = [
    -1.0, 0.0, 0.0, 0.0, 1.0, //
    0.0, -1.0, 0.0, 0.0, 1.0, //
    0.0, 0.0, -1.0, 0.0, 1.0, //
    0.0, 0.0, 0.0, 1.0, 0.0,
];

const DROP_RED: [f32; 20] = [
    0.0, 0.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 0.0, 1.0, 0.0,
];

struct MemoryHost {
    options: PreviewOptions,
    items: Vec<Item>,
    fast_decode: bool,
    container: Size,
    events: Vec<PreviewEvent>,
}

impl MemoryHost {
    fn new() -> Self {
        Self {
            options: PreviewOptions::default(),
            items: Vec::new(),
            fast_decode: true,
            container: Size::new(100.0, 75.0),
            events: Vec::new(),
        }
    }

    fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    fn item_mut_by(&mut self, id: &str) -> &mut Item {
        self.items
            .iter_mut()
            .find(|item| item.id.as_str() == id)
            .unwrap()
    }

    fn count(&self, matches: impl Fn(&PreviewEvent) -> bool) -> usize {
        self.events.iter().filter(|event| matches(event)).count()
    }
}

impl PreviewHost for MemoryHost {
    fn options(&self) -> &PreviewOptions {
        &self.options
    }

    fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    fn item_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    fn supports_fast_decode(&self) -> bool {
        self.fast_decode
    }

    fn container_size(&self, _id: &ItemId) -> Size {
        self.container
    }

    fn dispatch(&mut self, event: PreviewEvent) {
        self.events.push(event);
    }
}

fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn png_item(id: &str) -> Item {
    Item::new(
        id,
        ItemFile::new("photo.png", "image/png", png_bytes(400, 300, [200, 100, 50, 255])),
    )
}

fn run(previewer: &mut Previewer, host: &mut MemoryHost) -> Result<(), PreviewError> {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        previewer.poll(host)?;
        if !previewer.is_busy() {
            return Ok(());
        }
        assert!(Instant::now() < deadline, "preview work did not finish");
        thread::sleep(Duration::from_millis(1));
    }
}

fn id(value: &str) -> ItemId {
    ItemId::new(value)
}

#[test]
fn test_load_renders_preview() {
    let mut host = MemoryHost::new().with_item(png_item("a"));
    let mut previewer = Previewer::new();

    let eligibility = previewer.load(&mut host, &id("a")).unwrap();
    assert!(!eligibility.queued);
    assert_eq!(previewer.state(&id("a")), Some(PreviewState::Decoding));

    run(&mut previewer, &mut host).unwrap();

    assert_eq!(previewer.state(&id("a")), Some(PreviewState::Ready));
    assert_eq!(
        host.events,
        vec![
            PreviewEvent::DecodeComplete {
                id: id("a"),
                width: 400,
                height: 300
            },
            PreviewEvent::PanelHeight {
                id: id("a"),
                height: 75.0
            },
            PreviewEvent::RenderReady { id: id("a") },
        ]
    );

    let surface = previewer.surface(&id("a")).unwrap();
    assert_eq!((surface.width(), surface.height()), (200, 150));
    assert!(previewer.frame(&id("a")).is_some());
    assert!(host.items[0].metadata.color.is_none());
}

#[test]
fn test_filter_applied_to_copy_of_cache() {
    let mut item = png_item("a");
    item.metadata.filter = Some(INVERT.to_vec());
    let mut host = MemoryHost::new().with_item(item);
    let mut previewer = Previewer::new();

    previewer.load(&mut host, &id("a")).unwrap();
    run(&mut previewer, &mut host).unwrap();

    let surface = previewer.surface(&id("a")).unwrap();
    assert_eq!(surface.image.get_pixel(0, 0), &Rgba([55, 155, 205, 255]));

    let raw = previewer.raw_buffer(&id("a")).unwrap();
    assert_eq!(raw.get_pixel(0, 0), &Rgba([200, 100, 50, 255]));
}

#[test]
fn test_invalid_matrix_is_identity() {
    let mut item = png_item("a");
    item.metadata.filter = Some(vec![1.0; 19]);
    let mut host = MemoryHost::new().with_item(item);
    let mut previewer = Previewer::new();

    previewer.load(&mut host, &id("a")).unwrap();
    run(&mut previewer, &mut host).unwrap();

    let surface = previewer.surface(&id("a")).unwrap();
    assert_eq!(surface.image.get_pixel(0, 0), &Rgba([200, 100, 50, 255]));
}

#[test]
fn test_average_color_written_after_filter() {
    let mut item = png_item("a");
    item.metadata.filter = Some(INVERT.to_vec());
    let mut host = MemoryHost::new().with_item(item);
    host.options.calculate_average_image_color = true;
    let mut previewer = Previewer::new();

    previewer.load(&mut host, &id("a")).unwrap();
    run(&mut previewer, &mut host).unwrap();

    assert_eq!(
        host.items[0].metadata.color,
        Some(AverageColor {
            r: 55,
            g: 155,
            b: 205
        })
    );
}

#[test]
fn test_tainted_file_has_no_color() {
    let mut item = png_item("a");
    item.file.cors_restricted = true;
    let mut host = MemoryHost::new().with_item(item);
    host.options.calculate_average_image_color = true;
    let mut previewer = Previewer::new();

    previewer.load(&mut host, &id("a")).unwrap();
    run(&mut previewer, &mut host).unwrap();

    assert_eq!(previewer.state(&id("a")), Some(PreviewState::Ready));
    assert!(host.items[0].metadata.color.is_none());
}

#[test]
fn test_fallback_decode_revokes_url() {
    let mut host = MemoryHost::new().with_item(png_item("a"));
    host.fast_decode = false;
    let mut previewer = Previewer::new();

    previewer.load(&mut host, &id("a")).unwrap();
    run(&mut previewer, &mut host).unwrap();

    assert_eq!(previewer.state(&id("a")), Some(PreviewState::Ready));
    assert_eq!(previewer.urls().live_count(), 0);
    assert_eq!(previewer.urls().revoked_count(), 1);
}

#[test]
fn test_repeated_load_keeps_single_decode() {
    let mut host = MemoryHost::new().with_item(png_item("a"));
    let mut previewer = Previewer::new();

    previewer.load(&mut host, &id("a")).unwrap();
    previewer.load(&mut host, &id("a")).unwrap();
    run(&mut previewer, &mut host).unwrap();

    assert_eq!(
        host.count(|e| matches!(e, PreviewEvent::DecodeComplete { .. })),
        1
    );
    assert_eq!(host.count(|e| matches!(e, PreviewEvent::RenderReady { .. })), 1);
}

#[test]
fn test_repeated_load_keeps_single_fallback_url() {
    let mut host = MemoryHost::new().with_item(png_item("a"));
    host.fast_decode = false;
    let mut previewer = Previewer::new();

    previewer.load(&mut host, &id("a")).unwrap();
    previewer.load(&mut host, &id("a")).unwrap();
    run(&mut previewer, &mut host).unwrap();

    assert_eq!(
        host.count(|e| matches!(e, PreviewEvent::DecodeComplete { .. })),
        1
    );
    assert_eq!(previewer.urls().live_count(), 0);
    assert_eq!(previewer.urls().revoked_count(), 1);
}

#[test]
fn test_both_decode_paths_failing_reports_error() {
    let item = Item::new("a", ItemFile::new("broken.png", "image/png", vec![1u8, 2, 3, 4]));
    let mut host = MemoryHost::new().with_item(item);
    let mut previewer = Previewer::new();

    previewer.load(&mut host, &id("a")).unwrap();
    run(&mut previewer, &mut host).unwrap();

    assert_eq!(previewer.state(&id("a")), Some(PreviewState::Idle));
    assert_eq!(
        host.count(|e| matches!(e, PreviewEvent::LoadError { .. })),
        1
    );
    assert_eq!(host.count(|e| matches!(e, PreviewEvent::RenderReady { .. })), 0);
    assert_eq!(previewer.urls().live_count(), 0);
    assert_eq!(previewer.urls().revoked_count(), 1);
}

#[test]
fn test_removed_item_results_are_discarded() {
    let mut host = MemoryHost::new().with_item(png_item("a"));
    let mut previewer = Previewer::new();

    previewer.load(&mut host, &id("a")).unwrap();
    host.items.clear();
    run(&mut previewer, &mut host).unwrap();

    assert!(host.events.is_empty());
    assert_eq!(previewer.state(&id("a")), None);
}

#[test]
fn test_ineligible_item_is_rejected() {
    let item = Item::new("a", ItemFile::new("doc.pdf", "application/pdf", vec![0u8; 8]));
    let mut host = MemoryHost::new().with_item(item);
    let mut previewer = Previewer::new();

    let result = previewer.load(&mut host, &id("a"));
    assert!(matches!(result, Err(PreviewError::Unsupported(_))));
    assert_eq!(previewer.state(&id("a")), None);
}

#[test]
fn test_exif_orientation_from_metadata() {
    let mut item = png_item("a");
    item.metadata.exif = Some(previewkit_core::host::ExifMetadata {
        orientation: Some(6),
    });
    let mut host = MemoryHost::new().with_item(item);
    let mut previewer = Previewer::new();

    previewer.load(&mut host, &id("a")).unwrap();
    run(&mut previewer, &mut host).unwrap();

    let surface = previewer.surface(&id("a")).unwrap();
    assert_eq!((surface.width(), surface.height()), (200, 267));
}

#[test]
fn test_fixed_height_dispatched_on_load() {
    let mut host = MemoryHost::new().with_item(png_item("a"));
    host.options.fixed_height = Some(120);
    let mut previewer = Previewer::new();

    previewer.load(&mut host, &id("a")).unwrap();
    run(&mut previewer, &mut host).unwrap();

    let heights: Vec<f64> = host
        .events
        .iter()
        .filter_map(|event| match event {
            PreviewEvent::PanelHeight { height, .. } => Some(*height),
            _ => None,
        })
        .collect();
    assert_eq!(heights, vec![120.0]);
}

#[test]
fn test_newer_filter_supersedes_in_flight_one() {
    let mut host = MemoryHost::new().with_item(png_item("a"));
    let mut previewer = Previewer::new();
    previewer.load(&mut host, &id("a")).unwrap();
    run(&mut previewer, &mut host).unwrap();

    host.item_mut_by("a").metadata.filter = Some(INVERT.to_vec());
    previewer
        .update_metadata(&mut host, &id("a"), MetadataKey::Filter)
        .unwrap();
    host.item_mut_by("a").metadata.filter = Some(DROP_RED.to_vec());
    previewer
        .update_metadata(&mut host, &id("a"), MetadataKey::Filter)
        .unwrap();
    assert_eq!(previewer.state(&id("a")), Some(PreviewState::Filtering));

    run(&mut previewer, &mut host).unwrap();

    let surface = previewer.surface(&id("a")).unwrap();
    assert_eq!(surface.image.get_pixel(0, 0), &Rgba([0, 100, 50, 255]));
    assert_eq!(host.count(|e| matches!(e, PreviewEvent::RenderReady { .. })), 2);
}

#[test]
fn test_filter_change_before_first_frame_supersedes_initial_filter() {
    let mut item = png_item("a");
    item.metadata.filter = Some(INVERT.to_vec());
    let mut host = MemoryHost::new().with_item(item);
    let mut previewer = Previewer::new();
    previewer.load(&mut host, &id("a")).unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while previewer.state(&id("a")) == Some(PreviewState::Decoding) {
        previewer.poll(&mut host).unwrap();
        assert!(Instant::now() < deadline, "decode did not finish");
        thread::sleep(Duration::from_millis(1));
    }

    host.item_mut_by("a").metadata.filter = Some(DROP_RED.to_vec());
    previewer
        .update_metadata(&mut host, &id("a"), MetadataKey::Filter)
        .unwrap();
    run(&mut previewer, &mut host).unwrap();

    let surface = previewer.surface(&id("a")).unwrap();
    assert_eq!(surface.image.get_pixel(0, 0), &Rgba([0, 100, 50, 255]));
    assert_eq!(previewer.state(&id("a")), Some(PreviewState::Ready));
}

#[test]
fn test_crop_aspect_ratio_change_bins_frame() {
    let mut host = MemoryHost::new().with_item(png_item("a"));
    let mut previewer = Previewer::new();
    previewer.load(&mut host, &id("a")).unwrap();
    run(&mut previewer, &mut host).unwrap();

    // Same (absent) aspect ratio: frame updated in place.
    host.item_mut_by("a").metadata.crop = Some(CropConfig {
        zoom: 2.0,
        ..Default::default()
    });
    previewer
        .update_metadata(&mut host, &id("a"), MetadataKey::Crop)
        .unwrap();
    assert!(previewer.collect_bin(&id("a")).is_empty());
    assert_eq!(previewer.frame(&id("a")).unwrap().crop.zoom, 2.0);

    host.item_mut_by("a").metadata.crop = Some(CropConfig {
        aspect_ratio: Some(1.0),
        ..Default::default()
    });
    previewer
        .update_metadata(&mut host, &id("a"), MetadataKey::Crop)
        .unwrap();

    let bin = previewer.collect_bin(&id("a"));
    assert_eq!(bin.len(), 1);
    assert_eq!(bin[0].crop.zoom, 2.0);
    assert_eq!(previewer.frame(&id("a")).unwrap().crop.aspect_ratio, Some(1.0));
    assert!(previewer.collect_bin(&id("a")).is_empty());
}

#[test]
fn test_markup_rendered_into_frame() {
    let mut item = png_item("a");
    item.metadata.markup = vec![
        MarkupItem::new(
            "rect",
            MarkupProps {
                z_index: Some(1),
                ..Default::default()
            },
        ),
        MarkupItem::new("ellipse", MarkupProps::default()),
    ];
    let mut host = MemoryHost::new().with_item(item);
    let mut previewer = Previewer::new();

    previewer.load(&mut host, &id("a")).unwrap();
    run(&mut previewer, &mut host).unwrap();

    let layer = previewer
        .frame(&id("a"))
        .and_then(|frame| frame.markup.as_ref())
        .unwrap();
    assert_eq!(layer.elements.len(), 2);
    assert_eq!(layer.size, Size::new(100.0, 75.0));
}

#[test]
fn test_markup_hidden_when_disabled() {
    let mut host = MemoryHost::new().with_item(png_item("a"));
    host.options.markup_show = false;
    let mut previewer = Previewer::new();

    previewer.load(&mut host, &id("a")).unwrap();
    run(&mut previewer, &mut host).unwrap();

    assert!(previewer.frame(&id("a")).unwrap().markup.is_none());
}

#[test]
fn test_unknown_markup_type_fails_fast() {
    let mut host = MemoryHost::new().with_item(png_item("a"));
    let mut previewer = Previewer::new();
    previewer.load(&mut host, &id("a")).unwrap();
    run(&mut previewer, &mut host).unwrap();

    host.item_mut_by("a").metadata.markup = vec![MarkupItem::new("star", MarkupProps::default())];
    let result = previewer.update_metadata(&mut host, &id("a"), MetadataKey::Markup);

    assert_eq!(
        result,
        Err(PreviewError::Markup(MarkupError::UnsupportedType(
            "star".to_string()
        )))
    );
}

#[test]
fn test_markup_fix_recovers_failed_first_render() {
    let mut item = png_item("a");
    item.metadata.markup = vec![MarkupItem::new("star", MarkupProps::default())];
    let mut host = MemoryHost::new().with_item(item);
    let mut previewer = Previewer::new();
    previewer.load(&mut host, &id("a")).unwrap();

    assert_eq!(
        run(&mut previewer, &mut host),
        Err(PreviewError::Markup(MarkupError::UnsupportedType(
            "star".to_string()
        )))
    );
    assert_eq!(previewer.state(&id("a")), Some(PreviewState::Decoded));
    assert!(previewer.frame(&id("a")).is_none());

    host.item_mut_by("a").metadata.markup = vec![MarkupItem::new("rect", MarkupProps::default())];
    previewer
        .update_metadata(&mut host, &id("a"), MetadataKey::Markup)
        .unwrap();

    assert_eq!(previewer.state(&id("a")), Some(PreviewState::Ready));
    assert!(previewer.collect_bin(&id("a")).is_empty());
    let layer = previewer
        .frame(&id("a"))
        .and_then(|frame| frame.markup.as_ref())
        .unwrap();
    assert_eq!(layer.elements.len(), 1);
    assert_eq!(host.count(|e| matches!(e, PreviewEvent::RenderReady { .. })), 1);
}

#[test]
fn test_update_for_removed_item() {
    let mut host = MemoryHost::new().with_item(png_item("a"));
    let mut previewer = Previewer::new();
    previewer.load(&mut host, &id("a")).unwrap();
    run(&mut previewer, &mut host).unwrap();

    host.items.clear();
    let result = previewer.update_metadata(&mut host, &id("a"), MetadataKey::Crop);
    assert_eq!(result, Err(PreviewError::ItemNotFound(id("a"))));
    assert!(!previewer.remove(&id("a")));
}

#[test]
fn test_items_are_independent() {
    let mut host = MemoryHost::new()
        .with_item(png_item("a"))
        .with_item(png_item("b"));
    let mut previewer = Previewer::new();

    previewer.load(&mut host, &id("a")).unwrap();
    previewer.load(&mut host, &id("b")).unwrap();
    assert!(previewer.remove(&id("a")));
    run(&mut previewer, &mut host).unwrap();

    assert_eq!(previewer.state(&id("a")), None);
    assert_eq!(previewer.state(&id("b")), Some(PreviewState::Ready));
    assert_eq!(
        host.count(|e| matches!(e, PreviewEvent::RenderReady { id } if id.as_str() == "b")),
        1
    );
    assert_eq!(host.count(|e| matches!(e, PreviewEvent::RenderReady { .. })), 1);
}
