//! Shape variants produced from markup items.
//!
//! Each variant consumes the resolved rect and style of its item and keeps
//! the render attributes a host needs to draw it. Elements are persistent:
//! `update` may be called again with new props, and text content is only
//! replaced when it actually changed.

use serde::Serialize;

use super::resolve::{resolve_rect, resolve_style, resolve_value, ResolvedStyle};
use super::types::{MarkupProps, MarkupType, MarkupValue};
use crate::geometry::{Rect, Size, Vector};

/// Rotation of the arrowhead wings around the wing base, in radians.
const ARROW_WING_ROTATION: f64 = 2.0;

/// Length of the arrowhead wings as a fraction of the smaller frame side.
const ARROW_WING_LENGTH: f64 = 0.05;

/// Frame the markup is rendered into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkupFrame {
    /// Frame size in pixels.
    pub size: Size,
    /// Scale applied to pixel-valued strings.
    pub scale: f64,
}

/// Ellipse geometry derived from the item rect.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EllipseGeometry {
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    pub ry: f64,
}

impl From<&Rect> for EllipseGeometry {
    fn from(rect: &Rect) -> Self {
        Self {
            cx: rect.x + rect.width * 0.5,
            cy: rect.y + rect.height * 0.5,
            rx: rect.width * 0.5,
            ry: rect.height * 0.5,
        }
    }
}

/// Horizontal anchoring of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

impl TextAnchor {
    /// Map a `textAlign` value; anything unknown anchors at the start.
    pub fn from_text_align(align: Option<&str>) -> Self {
        match align {
            Some("center") => TextAnchor::Middle,
            Some("right") => TextAnchor::End,
            _ => TextAnchor::Start,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// Text element state.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TextShape {
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: String,
    pub anchor: TextAnchor,
    /// Source text the content was last built from.
    pub text: Option<String>,
    /// Rendered content; empty text renders as a single space.
    pub content: String,
    /// Number of times the content was rebuilt.
    pub content_updates: u32,
}

impl TextShape {
    fn update(&mut self, props: &MarkupProps, frame: &MarkupFrame) {
        self.font_size = resolve_value(props.font_size.as_ref(), frame.size, frame.scale, None);
        self.font_family = props
            .font_family
            .clone()
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| "sans-serif".to_string());
        self.font_weight = props
            .font_weight
            .clone()
            .filter(|w| !w.is_empty())
            .unwrap_or_else(|| "normal".to_string());
        self.anchor = TextAnchor::from_text_align(props.text_align.as_deref());

        if self.text != props.text {
            self.text = props.text.clone();
            let text = props.text.as_deref().unwrap_or_default();
            self.content = if text.is_empty() {
                " ".to_string()
            } else {
                text.to_string()
            };
            self.content_updates += 1;
        }
    }
}

/// One arrowhead as a polyline through `a`, the line tip and `b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Arrowhead {
    pub a: Vector,
    pub tip: Vector,
    pub b: Vector,
}

impl Arrowhead {
    /// SVG path data for the arrowhead.
    pub fn path(&self) -> String {
        format!(
            "M{},{} L{},{} L{},{}",
            self.a.x, self.a.y, self.tip.x, self.tip.y, self.b.x, self.b.y
        )
    }
}

/// Line element state.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LineShape {
    pub start: Vector,
    pub end: Vector,
    pub arrow_begin: Option<Arrowhead>,
    pub arrow_end: Option<Arrowhead>,
}

/// Build an arrowhead at `tip`, with wings rotated around a point `offset`
/// along the line from the tip.
fn arrowhead(tip: Vector, offset: Vector) -> Arrowhead {
    let center = tip.add(offset);
    Arrowhead {
        a: tip.rotate(ARROW_WING_ROTATION, center),
        tip,
        b: tip.rotate(-ARROW_WING_ROTATION, center),
    }
}

impl LineShape {
    fn update(&mut self, props: &MarkupProps, rect: &Rect, frame: &MarkupFrame) {
        self.start = rect.origin();
        self.end = Vector::new(rect.x + rect.width, rect.y + rect.height);
        self.arrow_begin = None;
        self.arrow_end = None;

        let Some(decoration) = props.line_decoration.as_ref() else {
            return;
        };

        let direction = self.end.subtract(self.start).normalize();
        let wing = resolve_value(
            Some(&MarkupValue::Number(ARROW_WING_LENGTH)),
            frame.size,
            frame.scale,
            None,
        );

        if decoration.iter().any(|d| d == "arrow-begin") {
            self.arrow_begin = Some(arrowhead(self.start, direction.multiply(wing)));
        }

        if decoration.iter().any(|d| d == "arrow-end") {
            self.arrow_end = Some(arrowhead(self.end, direction.multiply(-wing)));
        }
    }
}

/// How an image fills its rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ImageFit {
    /// Fit inside the rect without cropping.
    Contain,
    /// Fill the rect, cropping overflow.
    Cover,
    /// Stretch to the rect.
    #[default]
    Stretch,
}

impl ImageFit {
    pub fn from_fit(fit: Option<&str>) -> Self {
        match fit {
            Some("contain") => ImageFit::Contain,
            Some("cover") => ImageFit::Cover,
            _ => ImageFit::Stretch,
        }
    }

    /// SVG `preserveAspectRatio` value.
    pub fn preserve_aspect_ratio(self) -> &'static str {
        match self {
            ImageFit::Contain => "xMidYMid meet",
            ImageFit::Cover => "xMidYMid slice",
            ImageFit::Stretch => "none",
        }
    }
}

/// Image element state.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ImageShape {
    pub src: String,
    pub fit: ImageFit,
    /// Current opacity; 0 until the asset has loaded.
    pub opacity: f64,
    /// Opacity to reveal once loaded.
    pub target_opacity: f64,
    pub loaded: bool,
}

impl ImageShape {
    fn update(&mut self, props: &MarkupProps) {
        self.src = props.src.clone().unwrap_or_default();
        self.fit = ImageFit::from_fit(props.fit.as_deref());
        self.target_opacity = props.opacity.filter(|o| *o != 0.0).unwrap_or(1.0);
        if self.loaded {
            self.opacity = self.target_opacity;
        }
    }

    /// Called by the host when the referenced asset has finished loading.
    pub fn on_load(&mut self) {
        self.loaded = true;
        self.opacity = self.target_opacity;
    }
}

/// Variant-specific state of an element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rect,
    Ellipse(EllipseGeometry),
    Text(TextShape),
    Line(LineShape),
    Image(ImageShape),
}

impl Shape {
    fn create(markup_type: MarkupType) -> Self {
        match markup_type {
            MarkupType::Rect => Shape::Rect,
            MarkupType::Ellipse => Shape::Ellipse(EllipseGeometry::default()),
            MarkupType::Text => Shape::Text(TextShape::default()),
            MarkupType::Line => Shape::Line(LineShape::default()),
            MarkupType::Image => Shape::Image(ImageShape::default()),
        }
    }

    pub fn markup_type(&self) -> MarkupType {
        match self {
            Shape::Rect => MarkupType::Rect,
            Shape::Ellipse(_) => MarkupType::Ellipse,
            Shape::Text(_) => MarkupType::Text,
            Shape::Line(_) => MarkupType::Line,
            Shape::Image(_) => MarkupType::Image,
        }
    }
}

/// A rendered markup element: resolved geometry, style and shape state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkupElement {
    pub rect: Rect,
    pub style: ResolvedStyle,
    pub shape: Shape,
}

impl MarkupElement {
    /// Create an empty element for `markup_type`.
    pub fn create(markup_type: MarkupType) -> Self {
        let shape = Shape::create(markup_type);
        let style = resolve_style(&MarkupProps::default(), Size::default(), 1.0);
        Self {
            rect: Rect::default(),
            style,
            shape,
        }
    }

    /// Re-resolve this element from `props` for `frame`.
    pub fn update(&mut self, props: &MarkupProps, frame: &MarkupFrame) {
        self.rect = resolve_rect(props, frame.size, frame.scale);
        self.style = resolve_style(props, frame.size, frame.scale);

        match &mut self.shape {
            Shape::Rect => {}
            Shape::Ellipse(geometry) => *geometry = EllipseGeometry::from(&self.rect),
            Shape::Text(text) => {
                self.style.stroke_width = 0.0;
                text.update(props, frame);
            }
            Shape::Line(line) => {
                self.style.fill = "none".to_string();
                line.update(props, &self.rect, frame);
            }
            Shape::Image(image) => image.update(props),
        }
    }

    /// SVG-style attributes for hosts that build DOM nodes.
    ///
    /// Line arrowheads are not included; read them from [`LineShape`].
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let rect = [
            ("x", self.rect.x.to_string()),
            ("y", self.rect.y.to_string()),
            ("width", self.rect.width.to_string()),
            ("height", self.rect.height.to_string()),
        ];

        let mut attributes = match &self.shape {
            Shape::Ellipse(e) => vec![
                ("cx", e.cx.to_string()),
                ("cy", e.cy.to_string()),
                ("rx", e.rx.to_string()),
                ("ry", e.ry.to_string()),
            ],
            Shape::Line(line) => vec![
                ("x1", line.start.x.to_string()),
                ("y1", line.start.y.to_string()),
                ("x2", line.end.x.to_string()),
                ("y2", line.end.y.to_string()),
            ],
            _ => rect.to_vec(),
        };

        let mut style = self.style.attributes();
        if let Shape::Image(image) = &self.shape {
            style.retain(|(name, _)| *name != "opacity");
            style.push(("opacity", image.opacity.to_string()));
        }
        attributes.extend(style);

        match &self.shape {
            Shape::Text(text) => attributes.extend([
                ("font-weight", text.font_weight.clone()),
                ("font-size", text.font_size.to_string()),
                ("font-family", text.font_family.clone()),
                ("text-anchor", text.anchor.as_str().to_string()),
            ]),
            Shape::Image(image) => attributes.extend([
                ("href", image.src.clone()),
                (
                    "preserveAspectRatio",
                    image.fit.preserve_aspect_ratio().to_string(),
                ),
            ]),
            _ => {}
        }

        attributes
    }
}
