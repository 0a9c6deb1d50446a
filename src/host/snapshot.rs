//! A host document loaded from a JSON export of the design file.
//!
//! The nested JSON tree is flattened into an arena on ingestion. Node ids are
//! assigned in pre-order, so iterating the arena by index visits the page in
//! document order.
//!
//! The parsed JSON is kept next to the arena. Commands patch it in place and
//! [`DocumentSnapshot::to_json`] writes it back, so properties the audit never
//! reads survive a fix.

use super::{DocumentHost, HostCommand, HostError, NodeTree};
use crate::fs::{FileSystem, default_fs};
use crate::model::{
    Color, FontName, FontValue, LineHeight, Node, NodeId, NodeKind, Paint, PaintKind, Rect,
    StyleRun, TextProps,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate node id in document: {0}")]
    DuplicateId(String),
    #[error("Node not found: {0}")]
    UnknownNode(String),
    #[error(transparent)]
    Host(#[from] HostError),
}

#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    name: String,
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    component_roots: Vec<NodeId>,
    index: HashMap<String, NodeId>,
    selection: Vec<NodeId>,
    unavailable_fonts: Vec<FontName>,
    source: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    #[serde(default)]
    name: String,
    #[serde(default)]
    children: Vec<RawNode>,
    /// Master components referenced by instances but not placed on the page.
    #[serde(default)]
    components: Vec<RawNode>,
    #[serde(default)]
    selection: Vec<String>,
    #[serde(default)]
    unavailable_fonts: Vec<FontName>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    id: String,
    #[serde(rename = "type")]
    kind: Option<NodeKind>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    absolute_bounding_box: Option<Rect>,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
    #[serde(default)]
    fills: Option<Vec<RawPaint>>,
    #[serde(default)]
    children: Vec<RawNode>,
    #[serde(default)]
    characters: Option<String>,
    #[serde(default)]
    font_size: Option<FontValue<f64>>,
    #[serde(default)]
    font_weight: Option<FontValue<f64>>,
    #[serde(default)]
    font_name: Option<FontValue<FontName>>,
    #[serde(default)]
    line_height: Option<LineHeight>,
    #[serde(default)]
    style_runs: Vec<StyleRun>,
    #[serde(default)]
    main_component: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPaint {
    #[serde(rename = "type")]
    kind: PaintKind,
    #[serde(default = "default_visible")]
    visible: bool,
    #[serde(default)]
    color: Option<RawColor>,
}

#[derive(Debug, Deserialize)]
struct RawColor {
    r: f64,
    g: f64,
    b: f64,
}

fn default_visible() -> bool {
    true
}

const DEFAULT_FONT_WEIGHT: f64 = 400.0;

impl DocumentSnapshot {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let source: Value = serde_json::from_str(json)?;
        let raw = RawDocument::deserialize(&source)?;
        Self::from_raw(raw, source)
    }

    pub fn load(path: &std::path::Path) -> Result<Self, SnapshotError> {
        Self::load_with_fs(path, default_fs())
    }

    pub fn load_with_fs(path: &std::path::Path, fs: &dyn FileSystem) -> Result<Self, SnapshotError> {
        let content = fs.read_to_string(path)?;
        Self::from_json(&content)
    }

    fn from_raw(raw: RawDocument, source: Value) -> Result<Self, SnapshotError> {
        let mut snapshot = Self {
            name: raw.name,
            nodes: Vec::new(),
            roots: Vec::new(),
            component_roots: Vec::new(),
            index: HashMap::new(),
            selection: Vec::new(),
            unavailable_fonts: raw.unavailable_fonts,
            source,
        };

        snapshot.roots = snapshot.ingest(raw.children)?;
        snapshot.component_roots = snapshot.ingest(raw.components)?;

        for id in raw.selection {
            let node = snapshot
                .find(&id)
                .ok_or_else(|| SnapshotError::UnknownNode(id.clone()))?;
            snapshot.selection.push(node);
        }

        Ok(snapshot)
    }

    /// Flatten a forest into the arena with an explicit stack, returning the
    /// ids of its top-level nodes.
    fn ingest(&mut self, forest: Vec<RawNode>) -> Result<Vec<NodeId>, SnapshotError> {
        let mut top_level = Vec::with_capacity(forest.len());
        let mut stack: Vec<(RawNode, Option<NodeId>)> =
            forest.into_iter().rev().map(|raw| (raw, None)).collect();

        while let Some((mut raw, parent)) = stack.pop() {
            let children = std::mem::take(&mut raw.children);
            let id = NodeId(self.nodes.len());

            if self.index.insert(raw.id.clone(), id).is_some() {
                return Err(SnapshotError::DuplicateId(raw.id));
            }

            let mut node = convert_node(raw);
            node.parent = parent;
            self.nodes.push(node);

            match parent {
                Some(parent_id) => self.nodes[parent_id.0].children.push(id),
                None => top_level.push(id),
            }

            stack.extend(children.into_iter().rev().map(|child| (child, Some(id))));
        }

        Ok(top_level)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn set_selection(&mut self, selection: Vec<NodeId>) {
        self.selection = selection;
    }

    /// Carry out a queued host command against this document.
    pub fn apply(&mut self, command: &HostCommand) -> Result<(), SnapshotError> {
        let id = self
            .find(command.node_id())
            .ok_or_else(|| SnapshotError::UnknownNode(command.node_id().to_string()))?;

        match command {
            HostCommand::SetFontSize { font_size, .. } => {
                let node = &mut self.nodes[id.0];
                if node.text().is_none() {
                    return Err(HostError::NotText(node.id.clone()).into());
                }
                node.set_font_size(*font_size);
                if let Some(raw) = raw_node_mut(&mut self.source, &node.id) {
                    set_raw_font_size(raw, *font_size);
                }
                tracing::info!(node_id = %node.id, font_size, "updated font size");
            }
            HostCommand::Select { .. } | HostCommand::RevealInViewport { .. } => {
                self.selection = vec![id];
            }
        }
        Ok(())
    }

    /// The document as loaded, with every applied command reflected in it.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        let mut document = self.source.clone();
        if let Some(root) = document.as_object_mut() {
            if !self.selection.is_empty() || root.contains_key("selection") {
                let selection = self
                    .selection
                    .iter()
                    .map(|id| Value::String(self.nodes[id.0].id.clone()))
                    .collect();
                root.insert("selection".to_string(), Value::Array(selection));
            }
        }
        Ok(serde_json::to_string_pretty(&document)?)
    }
}

/// Find the raw JSON object for a host id among the page and component trees.
fn raw_node_mut<'a>(document: &'a mut Value, host_id: &str) -> Option<&'a mut Map<String, Value>> {
    let mut stack: Vec<&'a mut Value> = Vec::new();
    for (key, forest) in document.as_object_mut()?.iter_mut() {
        if key == "children" || key == "components" {
            if let Some(nodes) = forest.as_array_mut() {
                stack.extend(nodes.iter_mut());
            }
        }
    }

    while let Some(value) = stack.pop() {
        let Some(raw) = value.as_object_mut() else {
            continue;
        };
        if raw.get("id").and_then(Value::as_str) == Some(host_id) {
            return Some(raw);
        }
        if let Some(children) = raw.get_mut("children").and_then(Value::as_array_mut) {
            stack.extend(children.iter_mut());
        }
    }
    None
}

fn set_raw_font_size(raw: &mut Map<String, Value>, font_size: f64) {
    raw.insert("fontSize".to_string(), Value::from(font_size));
    if let Some(runs) = raw.get_mut("styleRuns").and_then(Value::as_array_mut) {
        for run in runs.iter_mut().filter_map(Value::as_object_mut) {
            run.remove("fontSize");
        }
    }
}

fn convert_node(raw: RawNode) -> Node {
    let kind = raw.kind.unwrap_or(NodeKind::Other);

    let bounds = raw.absolute_bounding_box.or_else(|| match (raw.width, raw.height) {
        (Some(width), Some(height)) => Some(Rect::new(
            raw.x.unwrap_or(0.0),
            raw.y.unwrap_or(0.0),
            width,
            height,
        )),
        _ => None,
    });

    let fills = raw.fills.map(|paints| {
        paints
            .into_iter()
            .map(|paint| Paint {
                kind: paint.kind,
                visible: paint.visible,
                color: match paint.kind {
                    PaintKind::Solid => paint.color.map(|c| Color::from_unit(c.r, c.g, c.b)),
                    _ => None,
                },
            })
            .collect()
    });

    let text = match (kind, raw.font_size) {
        (NodeKind::Text, Some(font_size)) => Some(TextProps {
            characters: raw.characters.unwrap_or_default(),
            font_size,
            font_weight: raw
                .font_weight
                .unwrap_or(FontValue::Value(DEFAULT_FONT_WEIGHT)),
            font_name: raw.font_name,
            line_height: raw.line_height,
            runs: raw.style_runs,
        }),
        _ => None,
    };

    let mut node = Node::new(raw.id, kind, raw.name, bounds, fills, text);
    node.main_component = raw.main_component;
    node
}

impl NodeTree for DocumentSnapshot {
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    fn document_name(&self) -> &str {
        &self.name
    }

    fn find(&self, host_id: &str) -> Option<NodeId> {
        self.index.get(host_id).copied()
    }

    fn selection(&self) -> &[NodeId] {
        &self.selection
    }
}

impl DocumentHost for DocumentSnapshot {
    async fn load_font(&self, id: NodeId) -> Result<(), HostError> {
        let node = self.node(id);
        let text = node
            .text()
            .ok_or_else(|| HostError::NotText(node.id.clone()))?;

        match &text.font_name {
            None => Ok(()),
            Some(FontValue::Mixed(_)) => Err(HostError::FontUnavailable {
                node_id: node.id.clone(),
                font: "mixed".to_string(),
            }),
            Some(FontValue::Value(font)) if self.unavailable_fonts.contains(font) => {
                Err(HostError::FontUnavailable {
                    node_id: node.id.clone(),
                    font: font.to_string(),
                })
            }
            Some(FontValue::Value(_)) => Ok(()),
        }
    }

    async fn resolve_master_component(&self, id: NodeId) -> Result<Option<NodeId>, HostError> {
        let node = self.node(id);
        if node.kind != NodeKind::Instance {
            return Ok(None);
        }
        match node.main_component() {
            None => Ok(None),
            Some(reference) => self.find(reference).map(Some).ok_or_else(|| {
                HostError::ComponentUnavailable {
                    node_id: node.id.clone(),
                    reference: reference.to_string(),
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Capability;

    const DOC: &str = r#"{
        "name": "Checkout",
        "children": [
            {
                "id": "1:1", "type": "FRAME", "name": "Card",
                "absoluteBoundingBox": {"x": 0, "y": 0, "width": 200, "height": 100},
                "fills": [{"type": "SOLID", "color": {"r": 1, "g": 0, "b": 0}}],
                "children": [
                    {"id": "1:2", "type": "TEXT", "name": "Title", "x": 10, "y": 10,
                     "width": 80, "height": 20, "characters": "Pay", "fontSize": 16,
                     "fontName": {"family": "Inter", "style": "Bold"}},
                    {"id": "1:3", "type": "INSTANCE", "name": "Primary",
                     "mainComponent": "9:1"}
                ]
            },
            {"id": "2:1", "type": "RECTANGLE", "width": 5, "height": 5}
        ],
        "components": [{"id": "9:1", "type": "COMPONENT", "name": "Button/Primary"}],
        "selection": ["1:2"],
        "unavailableFonts": [{"family": "Inter", "style": "Bold"}]
    }"#;

    #[test]
    fn test_ingest_preorder_arena() {
        let doc = DocumentSnapshot::from_json(DOC).unwrap();
        assert_eq!(doc.name(), "Checkout");
        assert_eq!(doc.len(), 5);

        let ids: Vec<_> = (0..4).map(|i| doc.node(NodeId(i)).id.as_str()).collect();
        assert_eq!(ids, vec!["1:1", "1:2", "1:3", "2:1"]);

        let card = doc.find("1:1").unwrap();
        assert_eq!(doc.roots(), &[card, doc.find("2:1").unwrap()]);
        assert_eq!(doc.children(card).len(), 2);
        assert_eq!(doc.parent(doc.find("1:2").unwrap()), Some(card));
        assert_eq!(doc.selection(), &[doc.find("1:2").unwrap()]);
    }

    #[test]
    fn test_capabilities_and_colors() {
        let doc = DocumentSnapshot::from_json(DOC).unwrap();
        let card = doc.node(doc.find("1:1").unwrap());
        assert!(card.has(Capability::Fills));
        assert_eq!(
            card.fills().unwrap()[0].visible_solid(),
            Some(Color::rgb(255, 0, 0))
        );

        let title = doc.find("1:2").unwrap();
        assert_eq!(doc.characters(title), Some("Pay"));
        assert_eq!(doc.font_weight(title), Some(&FontValue::Value(400.0)));
        assert_eq!(
            doc.bounding_box(title),
            Some(&Rect::new(10.0, 10.0, 80.0, 20.0))
        );
        assert!(doc.bounding_box(doc.find("1:3").unwrap()).is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{"children": [{"id": "1", "type": "FRAME"}, {"id": "1", "type": "TEXT"}]}"#;
        assert!(matches!(
            DocumentSnapshot::from_json(json),
            Err(SnapshotError::DuplicateId(id)) if id == "1"
        ));
    }

    #[tokio::test]
    async fn test_async_host_operations() {
        let doc = DocumentSnapshot::from_json(DOC).unwrap();

        let title = doc.find("1:2").unwrap();
        assert!(matches!(
            doc.load_font(title).await,
            Err(HostError::FontUnavailable { .. })
        ));

        let instance = doc.find("1:3").unwrap();
        let master = doc.resolve_master_component(instance).await.unwrap().unwrap();
        assert_eq!(doc.node(master).name.as_deref(), Some("Button/Primary"));
        assert_eq!(doc.resolve_master_component(title).await, Ok(None));
    }

    #[tokio::test]
    async fn test_dangling_component_reference_is_an_error() {
        let json = r#"{"children": [{"id": "5", "type": "INSTANCE", "mainComponent": "missing"}]}"#;
        let doc = DocumentSnapshot::from_json(json).unwrap();
        let err = doc
            .resolve_master_component(doc.find("5").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, HostError::ComponentUnavailable { .. }));
    }

    #[test]
    fn test_apply_font_size_and_write_back() {
        let mut doc = DocumentSnapshot::from_json(DOC).unwrap();
        doc.apply(&HostCommand::SetFontSize {
            node_id: "1:2".to_string(),
            font_size: 18.0,
        })
        .unwrap();
        assert!(
            doc.apply(&HostCommand::SetFontSize {
                node_id: "1:1".to_string(),
                font_size: 18.0,
            })
            .is_err()
        );

        let reloaded = DocumentSnapshot::from_json(&doc.to_json().unwrap()).unwrap();
        let title = reloaded.find("1:2").unwrap();
        assert_eq!(reloaded.font_size(title), Some(&FontValue::Value(18.0)));
        assert_eq!(reloaded.len(), doc.len());
        assert_eq!(reloaded.roots().len(), 2);
        assert!(reloaded.find("9:1").is_some());
    }

    #[test]
    fn test_write_back_keeps_unread_properties() {
        let json = r#"{
            "name": "Board",
            "exportedBy": "plugin 2.1",
            "children": [
                {"id": "n", "type": "STICKY", "name": "Note", "x": 5, "y": 5, "width": 100, "height": 100,
                 "cornerRadius": 8,
                 "strokes": [{"type": "SOLID", "color": {"r": 0, "g": 0, "b": 0}}],
                 "effects": [{"type": "DROP_SHADOW", "radius": 4}],
                 "fills": [{"type": "SOLID", "opacity": 0.5, "color": {"r": 1, "g": 1, "b": 0.8}}],
                 "children": [
                    {"id": "t", "type": "TEXT", "characters": "ab", "fontSize": "mixed",
                     "letterSpacing": 0.2,
                     "styleRuns": [{"start": 0, "end": 1, "fontSize": 9, "fontWeight": 700},
                                   {"start": 1, "end": 2, "fontSize": 10}]}
                 ]}
            ]
        }"#;
        let mut doc = DocumentSnapshot::from_json(json).unwrap();
        doc.apply(&HostCommand::SetFontSize {
            node_id: "t".to_string(),
            font_size: 12.0,
        })
        .unwrap();

        let written: Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(written["exportedBy"], "plugin 2.1");
        let note = &written["children"][0];
        assert_eq!(note["type"], "STICKY");
        assert_eq!(note["cornerRadius"], 8);
        assert_eq!(note["x"], 5);
        assert!(note.get("absoluteBoundingBox").is_none());
        assert_eq!(note["strokes"].as_array().unwrap().len(), 1);
        assert_eq!(note["effects"][0]["type"], "DROP_SHADOW");
        assert_eq!(note["fills"][0]["opacity"], 0.5);

        let text = &note["children"][0];
        assert_eq!(text["fontSize"], 12.0);
        assert_eq!(text["letterSpacing"], 0.2);
        assert!(text["styleRuns"][0].get("fontSize").is_none());
        assert_eq!(text["styleRuns"][0]["fontWeight"], 700);

        let reloaded = DocumentSnapshot::from_json(&written.to_string()).unwrap();
        let t = reloaded.find("t").unwrap();
        assert_eq!(reloaded.font_size(t), Some(&FontValue::Value(12.0)));
    }

    #[test]
    fn test_untouched_document_writes_back_unchanged() {
        let doc = DocumentSnapshot::from_json(DOC).unwrap();
        let original: Value = serde_json::from_str(DOC).unwrap();
        let written: Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(written, original);
    }

    #[test]
    fn test_select_command_updates_written_selection() {
        let mut doc = DocumentSnapshot::from_json(DOC).unwrap();
        doc.apply(&HostCommand::Select {
            node_id: "2:1".to_string(),
        })
        .unwrap();
        assert_eq!(doc.selection(), &[doc.find("2:1").unwrap()]);

        let written: Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(written["selection"], serde_json::json!(["2:1"]));
    }
}
