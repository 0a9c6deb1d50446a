use super::Color;
use serde::{Deserialize, Serialize};

/// Index of a node inside a document arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Document,
    Page,
    Frame,
    Group,
    Component,
    ComponentSet,
    Instance,
    Text,
    Rectangle,
    Ellipse,
    Vector,
    Line,
    Polygon,
    Star,
    BooleanOperation,
    Section,
    Slice,
    #[serde(other)]
    Other,
}

impl NodeKind {
    /// Containers that render no background of their own.
    pub fn is_pass_through(self) -> bool {
        matches!(
            self,
            NodeKind::Group | NodeKind::Component | NodeKind::Instance
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Document => "DOCUMENT",
            NodeKind::Page => "PAGE",
            NodeKind::Frame => "FRAME",
            NodeKind::Group => "GROUP",
            NodeKind::Component => "COMPONENT",
            NodeKind::ComponentSet => "COMPONENT_SET",
            NodeKind::Instance => "INSTANCE",
            NodeKind::Text => "TEXT",
            NodeKind::Rectangle => "RECTANGLE",
            NodeKind::Ellipse => "ELLIPSE",
            NodeKind::Vector => "VECTOR",
            NodeKind::Line => "LINE",
            NodeKind::Polygon => "POLYGON",
            NodeKind::Star => "STAR",
            NodeKind::BooleanOperation => "BOOLEAN_OPERATION",
            NodeKind::Section => "SECTION",
            NodeKind::Slice => "SLICE",
            NodeKind::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A text style value that is either uniform across the run or mixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontValue<T> {
    Value(T),
    Mixed(MixedMarker),
}

/// The host's marker for a non-uniform style, serialized as `"mixed"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MixedMarker {
    Mixed,
}

impl<T> FontValue<T> {
    pub const MIXED: FontValue<T> = FontValue::Mixed(MixedMarker::Mixed);

    pub fn value(&self) -> Option<&T> {
        match self {
            FontValue::Value(v) => Some(v),
            FontValue::Mixed(_) => None,
        }
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, FontValue::Mixed(_))
    }
}

impl FontValue<f64> {
    pub fn number(&self) -> Option<f64> {
        self.value().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontName {
    pub family: String,
    pub style: String,
}

impl std::fmt::Display for FontName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.family, self.style)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineHeight {
    Auto,
    Pixels { value: f64 },
    Percent { value: f64 },
}

/// A styled character range `[start, end)` of a mixed text run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRun {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub font_weight: Option<f64>,
    #[serde(default)]
    pub font_size: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextProps {
    pub characters: String,
    pub font_size: FontValue<f64>,
    pub font_weight: FontValue<f64>,
    /// `None` when the host did not report a font.
    pub font_name: Option<FontValue<FontName>>,
    pub line_height: Option<LineHeight>,
    pub runs: Vec<StyleRun>,
}

impl TextProps {
    pub fn char_count(&self) -> usize {
        self.characters.chars().count()
    }

    /// Weight over the character range `[start, end)`.
    ///
    /// Returns `None` when the range is out of bounds or a character in it is
    /// not covered by any style run.
    pub fn range_weight(&self, start: usize, end: usize) -> Option<FontValue<f64>> {
        if start >= end || end > self.char_count() {
            return None;
        }
        if let FontValue::Value(weight) = self.font_weight {
            return Some(FontValue::Value(weight));
        }

        let mut found: Option<f64> = None;
        for offset in start..end {
            let weight = self
                .runs
                .iter()
                .find(|run| run.start <= offset && offset < run.end)
                .and_then(|run| run.font_weight)?;
            match found {
                None => found = Some(weight),
                Some(prev) if prev != weight => return Some(FontValue::MIXED),
                Some(_) => {}
            }
        }
        found.map(FontValue::Value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaintKind {
    Solid,
    GradientLinear,
    GradientRadial,
    GradientAngular,
    GradientDiamond,
    Image,
    Video,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub kind: PaintKind,
    pub visible: bool,
    /// Present only on solid paints.
    pub color: Option<Color>,
}

impl Paint {
    pub fn solid(color: Color) -> Self {
        Self {
            kind: PaintKind::Solid,
            visible: true,
            color: Some(color),
        }
    }

    /// The paint's color when it is a visible solid paint.
    pub fn visible_solid(&self) -> Option<Color> {
        match self.kind {
            PaintKind::Solid if self.visible => self.color,
            _ => None,
        }
    }
}

/// The first visible solid color in paint order.
pub fn first_visible_solid(fills: &[Paint]) -> Option<Color> {
    fills.iter().find_map(Paint::visible_solid)
}

/// Axis-aligned bounding box in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Strict intersection: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Geometry,
    Fills,
    Text,
}

impl Capability {
    fn bit(self) -> u8 {
        match self {
            Capability::Geometry => 1,
            Capability::Fills => 1 << 1,
            Capability::Text => 1 << 2,
        }
    }
}

/// Capability set resolved once when a node is ingested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities(u8);

impl Capabilities {
    pub fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    pub fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub name: Option<String>,
    pub(crate) bounds: Option<Rect>,
    pub(crate) fills: Option<Vec<Paint>>,
    pub(crate) text: Option<TextProps>,
    /// Host reference to the master component of an instance.
    pub(crate) main_component: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    capabilities: Capabilities,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        kind: NodeKind,
        name: Option<String>,
        bounds: Option<Rect>,
        fills: Option<Vec<Paint>>,
        text: Option<TextProps>,
    ) -> Self {
        let mut capabilities = Capabilities::default();
        if bounds.is_some() {
            capabilities = capabilities.with(Capability::Geometry);
        }
        if fills.is_some() {
            capabilities = capabilities.with(Capability::Fills);
        }
        if kind == NodeKind::Text && text.is_some() {
            capabilities = capabilities.with(Capability::Text);
        }
        Self {
            id: id.into(),
            kind,
            name,
            bounds,
            fills,
            text,
            main_component: None,
            parent: None,
            children: Vec::new(),
            capabilities,
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn bounds(&self) -> Option<&Rect> {
        self.bounds.as_ref()
    }

    pub fn fills(&self) -> Option<&[Paint]> {
        self.fills.as_deref()
    }

    pub fn text(&self) -> Option<&TextProps> {
        if self.has(Capability::Text) {
            self.text.as_ref()
        } else {
            None
        }
    }

    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn main_component(&self) -> Option<&str> {
        self.main_component.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub(crate) fn set_font_size(&mut self, size: f64) {
        if let Some(text) = self.text.as_mut() {
            text.font_size = FontValue::Value(size);
            for run in &mut text.runs {
                run.font_size = None;
            }
        }
    }
}
