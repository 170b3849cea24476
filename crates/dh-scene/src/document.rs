//! In-memory design document implementing the [`Canvas`] host API.
//!
//! The document is a tree stored in a petgraph `StableDiGraph`: the current
//! page is the root, frames nest other nodes, and edges go parent → child.
//! Child z-order is kept explicitly per parent because nodes are created on
//! the page and re-parented later, so insertion index order is not paint
//! order.

use crate::fonts::FontLibrary;
use dh_core::error::HostError;
use dh_core::host::{Canvas, ComponentHandle};
use dh_core::id::NodeId;
use dh_core::model::{Bounds, FontName, NodeInfo, NodeType, Paint};
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

/// Line height relative to font size used when measuring text.
pub const LINE_HEIGHT: f32 = 1.21;
/// Average glyph advance relative to font size.
const GLYPH_ADVANCE: f32 = 0.55;
/// Smallest size the host accepts for a resize.
const MIN_SIZE: f32 = 0.01;

// ─── Nodes ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Page,
    Frame {
        width: f32,
        height: f32,
    },
    Text {
        characters: String,
        font: FontName,
        font_size: f32,
    },
    Instance {
        component_key: String,
        width: f32,
        height: f32,
    },
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Page => NodeType::Page,
            NodeKind::Frame { .. } => NodeType::Frame,
            NodeKind::Text { .. } => NodeType::Text,
            NodeKind::Instance { .. } => NodeType::Instance,
        }
    }

    fn accepts_children(&self) -> bool {
        matches!(self, NodeKind::Page | NodeKind::Frame { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub x: f32,
    pub y: f32,
    pub fills: SmallVec<[Paint; 1]>,
    pub strokes: SmallVec<[Paint; 1]>,
    pub stroke_weight: f32,
}

impl SceneNode {
    fn new(id: NodeId, name: &str, kind: NodeKind) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            x: 0.0,
            y: 0.0,
            fills: SmallVec::new(),
            strokes: SmallVec::new(),
            stroke_weight: 1.0,
        }
    }

    /// Width and height; text is measured from its characters and font size.
    pub fn size(&self) -> (f32, f32) {
        match &self.kind {
            NodeKind::Page => (0.0, 0.0),
            NodeKind::Frame { width, height } | NodeKind::Instance { width, height, .. } => {
                (*width, *height)
            }
            NodeKind::Text {
                characters,
                font_size,
                ..
            } => measure_text(characters, *font_size),
        }
    }

    pub fn bounds(&self) -> Bounds {
        let (width, height) = self.size();
        Bounds {
            x: self.x,
            y: self.y,
            width,
            height,
        }
    }

    fn info(&self) -> NodeInfo {
        NodeInfo {
            id: self.id,
            name: self.name.clone(),
            node_type: self.kind.node_type(),
            bounds: self.bounds(),
        }
    }
}

/// Rough single-font text metrics: one line per `\n`, fixed advance.
pub fn measure_text(characters: &str, font_size: f32) -> (f32, f32) {
    let lines = characters.split('\n').count().max(1);
    let longest = characters
        .split('\n')
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    (
        longest as f32 * font_size * GLYPH_ADVANCE,
        lines as f32 * font_size * LINE_HEIGHT,
    )
}

// ─── Document ────────────────────────────────────────────────────────────

/// A single-page design document.
#[derive(Debug)]
pub struct Document {
    graph: StableDiGraph<SceneNode, ()>,
    page: NodeIndex,
    id_index: HashMap<NodeId, NodeIndex>,
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,
    fonts: Arc<FontLibrary>,
    selection: Vec<NodeId>,
    background: Vec<Paint>,
    viewport: Bounds,
    file_key: Option<String>,
    file_name: String,
}

impl Document {
    /// An empty page sharing `fonts` with the engine's font loader.
    pub fn new(fonts: Arc<FontLibrary>) -> Self {
        let mut graph = StableDiGraph::new();
        let page_id = NodeId::next("page");
        let page = graph.add_node(SceneNode::new(page_id, "Page 1", NodeKind::Page));

        let mut id_index = HashMap::new();
        id_index.insert(page_id, page);

        Self {
            graph,
            page,
            id_index,
            child_order: HashMap::new(),
            fonts,
            selection: Vec::new(),
            background: Vec::new(),
            viewport: Bounds {
                x: 0.0,
                y: 0.0,
                width: 1440.0,
                height: 900.0,
            },
            file_key: None,
            file_name: "Untitled".into(),
        }
    }

    pub fn set_background(&mut self, background: Vec<Paint>) {
        self.background = background;
    }

    pub fn set_viewport(&mut self, viewport: Bounds) {
        self.viewport = viewport;
    }

    pub fn set_file(&mut self, key: Option<String>, name: impl Into<String>) {
        self.file_key = key;
        self.file_name = name.into();
    }

    /// Replace the selection; unknown ids are dropped.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.selection = ids
            .into_iter()
            .filter(|id| self.id_index.contains_key(id))
            .collect();
    }

    pub(crate) fn page_background_paint(&self) -> Option<&Paint> {
        self.background.first()
    }

    pub fn fonts(&self) -> &Arc<FontLibrary> {
        &self.fonts
    }

    pub fn page_id(&self) -> NodeId {
        self.graph[self.page].id
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    /// Find nodes anywhere in the document whose name matches exactly.
    pub fn find_by_name(&self, name: &str) -> Vec<NodeId> {
        self.descendants(self.page)
            .into_iter()
            .map(|idx| self.graph[idx].id)
            .filter(|id| self.get(*id).is_some_and(|n| n.name == name))
            .collect()
    }

    /// Total node count, excluding the page.
    pub fn len(&self) -> usize {
        self.graph.node_count() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn page_index(&self) -> NodeIndex {
        self.page
    }

    pub(crate) fn node_at(&self, idx: NodeIndex) -> &SceneNode {
        &self.graph[idx]
    }

    pub(crate) fn child_indices(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.child_order.get(&idx).map(Vec::as_slice).unwrap_or_default()
    }

    fn index(&self, id: NodeId) -> Result<NodeIndex, HostError> {
        self.id_index
            .get(&id)
            .copied()
            .ok_or_else(|| HostError::NodeNotFound(id.to_string()))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, HostError> {
        let idx = self.index(id)?;
        Ok(&mut self.graph[idx])
    }

    fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
    }

    fn is_ancestor_of(&self, ancestor: NodeIndex, mut idx: NodeIndex) -> bool {
        while let Some(parent) = self.parent(idx) {
            if parent == ancestor {
                return true;
            }
            idx = parent;
        }
        false
    }

    /// All nodes below `idx` in depth-first paint order.
    fn descendants(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        for &child in self.child_indices(idx) {
            out.push(child);
            out.extend(self.descendants(child));
        }
        out
    }

    fn add_to_page(&mut self, kind: &str, name: &str, node_kind: NodeKind) -> NodeId {
        self.insert_under(self.page, kind, name, node_kind)
    }

    fn insert_under(
        &mut self,
        parent: NodeIndex,
        kind: &str,
        name: &str,
        node_kind: NodeKind,
    ) -> NodeId {
        let id = NodeId::next(kind);
        let idx = self.graph.add_node(SceneNode::new(id, name, node_kind));
        self.graph.add_edge(parent, idx, ());
        self.child_order.entry(parent).or_default().push(idx);
        self.id_index.insert(id, idx);
        id
    }

    /// Insert a pre-built node without going through the host checks
    /// (fonts need not be loaded). Used to seed documents from profiles.
    pub(crate) fn seed(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        kind: NodeKind,
        x: f32,
        y: f32,
        fills: Vec<Paint>,
    ) -> Result<NodeId, HostError> {
        let parent = match parent {
            Some(id) => self.index(id)?,
            None => self.page,
        };
        if !self.graph[parent].kind.accepts_children() {
            return Err(HostError::Unsupported {
                id: self.graph[parent].id.to_string(),
                operation: "children",
            });
        }
        let prefix = match kind.node_type() {
            NodeType::Page => "page",
            NodeType::Frame => "frame",
            NodeType::Text => "text",
            NodeType::Instance => "instance",
        };
        let id = self.insert_under(parent, prefix, name, kind);
        let node = self.node_mut(id)?;
        node.x = x;
        node.y = y;
        node.fills = fills.into();
        Ok(id)
    }

    fn detach(&mut self, idx: NodeIndex) {
        if let Some(parent) = self.parent(idx) {
            if let Some(edge) = self.graph.find_edge(parent, idx) {
                self.graph.remove_edge(edge);
            }
            if let Some(order) = self.child_order.get_mut(&parent) {
                order.retain(|&c| c != idx);
            }
        }
    }

    fn reparent(&mut self, child: NodeIndex, parent: NodeIndex) -> Result<(), HostError> {
        let child_id = self.graph[child].id;
        if child == self.page {
            return Err(HostError::Unsupported {
                id: child_id.to_string(),
                operation: "re-parenting the page",
            });
        }
        if !self.graph[parent].kind.accepts_children() {
            return Err(HostError::Unsupported {
                id: self.graph[parent].id.to_string(),
                operation: "children",
            });
        }
        if child == parent || self.is_ancestor_of(child, parent) {
            return Err(HostError::Unsupported {
                id: child_id.to_string(),
                operation: "appending into its own subtree",
            });
        }
        self.detach(child);
        self.graph.add_edge(parent, child, ());
        self.child_order.entry(parent).or_default().push(child);
        Ok(())
    }

    fn check_loaded(&self, font: &FontName) -> Result<(), HostError> {
        if self.fonts.is_loaded(font) {
            Ok(())
        } else {
            Err(HostError::FontNotLoaded(font.clone()))
        }
    }

    fn text_mut(
        &mut self,
        id: NodeId,
        operation: &'static str,
    ) -> Result<(&mut String, &mut FontName, &mut f32), HostError> {
        let node = self.node_mut(id)?;
        match &mut node.kind {
            NodeKind::Text {
                characters,
                font,
                font_size,
            } => Ok((characters, font, font_size)),
            _ => Err(HostError::Unsupported {
                id: id.to_string(),
                operation,
            }),
        }
    }
}

fn finite_size(property: &'static str, value: f32) -> Result<f32, HostError> {
    if value.is_finite() && value >= MIN_SIZE {
        Ok(value)
    } else {
        Err(HostError::InvalidValue {
            property,
            value: value.to_string(),
        })
    }
}

// ─── Canvas ──────────────────────────────────────────────────────────────

impl Canvas for Document {
    fn page_children(&self) -> Vec<NodeInfo> {
        self.child_indices(self.page)
            .iter()
            .map(|&idx| self.graph[idx].info())
            .collect()
    }

    fn node(&self, id: NodeId) -> Option<NodeInfo> {
        self.get(id).map(SceneNode::info)
    }

    fn children(&self, id: NodeId) -> Vec<NodeInfo> {
        match self.id_index.get(&id) {
            Some(&idx) => self
                .child_indices(idx)
                .iter()
                .map(|&c| self.graph[c].info())
                .collect(),
            None => Vec::new(),
        }
    }

    fn create_frame(&mut self) -> NodeId {
        self.add_to_page(
            "frame",
            "Frame",
            NodeKind::Frame {
                width: 100.0,
                height: 100.0,
            },
        )
    }

    fn create_text(&mut self) -> NodeId {
        self.add_to_page(
            "text",
            "Text",
            NodeKind::Text {
                characters: String::new(),
                font: FontName::new("Inter", "Regular"),
                font_size: 12.0,
            },
        )
    }

    fn create_instance(&mut self, component: &ComponentHandle) -> NodeId {
        self.add_to_page(
            "instance",
            &component.name,
            NodeKind::Instance {
                component_key: component.key.clone(),
                width: component.width,
                height: component.height,
            },
        )
    }

    fn set_name(&mut self, id: NodeId, name: &str) -> Result<(), HostError> {
        self.node_mut(id)?.name = name.to_string();
        Ok(())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        let parent = self.index(parent)?;
        let child = self.index(child)?;
        self.reparent(child, parent)
    }

    fn append_to_page(&mut self, id: NodeId) -> Result<(), HostError> {
        let child = self.index(id)?;
        self.reparent(child, self.page)
    }

    fn remove(&mut self, id: NodeId) -> Result<(), HostError> {
        let idx = self.index(id)?;
        if idx == self.page {
            return Err(HostError::Unsupported {
                id: id.to_string(),
                operation: "removing the page",
            });
        }
        self.detach(idx);
        let mut doomed = self.descendants(idx);
        doomed.push(idx);
        for victim in doomed {
            if let Some(node) = self.graph.remove_node(victim) {
                self.id_index.remove(&node.id);
                self.selection.retain(|s| *s != node.id);
            }
            self.child_order.remove(&victim);
        }
        Ok(())
    }

    fn resize(&mut self, id: NodeId, width: f32, height: f32) -> Result<(), HostError> {
        let width = finite_size("width", width)?;
        let height = finite_size("height", height)?;
        let node = self.node_mut(id)?;
        match &mut node.kind {
            NodeKind::Frame { width: w, height: h } | NodeKind::Instance { width: w, height: h, .. } => {
                *w = width;
                *h = height;
                Ok(())
            }
            _ => Err(HostError::Unsupported {
                id: id.to_string(),
                operation: "resize",
            }),
        }
    }

    fn set_position(&mut self, id: NodeId, x: f32, y: f32) -> Result<(), HostError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(HostError::InvalidValue {
                property: "position",
                value: format!("({x}, {y})"),
            });
        }
        let node = self.node_mut(id)?;
        node.x = x;
        node.y = y;
        Ok(())
    }

    fn set_fills(&mut self, id: NodeId, fills: Vec<Paint>) -> Result<(), HostError> {
        self.node_mut(id)?.fills = fills.into();
        Ok(())
    }

    fn set_strokes(
        &mut self,
        id: NodeId,
        strokes: Vec<Paint>,
        weight: f32,
    ) -> Result<(), HostError> {
        let node = self.node_mut(id)?;
        node.strokes = strokes.into();
        node.stroke_weight = weight;
        Ok(())
    }

    fn set_font(&mut self, id: NodeId, font: &FontName) -> Result<(), HostError> {
        self.check_loaded(font)?;
        let (_, current, _) = self.text_mut(id, "fonts")?;
        *current = font.clone();
        Ok(())
    }

    fn set_characters(&mut self, id: NodeId, text: &str) -> Result<(), HostError> {
        let current = self.text_mut(id, "characters")?.1.clone();
        self.check_loaded(&current)?;
        let (characters, _, _) = self.text_mut(id, "characters")?;
        *characters = text.to_string();
        Ok(())
    }

    fn set_font_size(&mut self, id: NodeId, size: f32) -> Result<(), HostError> {
        if !size.is_finite() || size < 1.0 {
            return Err(HostError::InvalidValue {
                property: "fontSize",
                value: size.to_string(),
            });
        }
        let (_, _, font_size) = self.text_mut(id, "fontSize")?;
        *font_size = size;
        Ok(())
    }

    fn selection(&self) -> Vec<NodeId> {
        self.selection.clone()
    }

    fn page_background(&self) -> Vec<Paint> {
        self.background.clone()
    }

    fn viewport(&self) -> Bounds {
        self.viewport
    }

    fn file_key(&self) -> Option<String> {
        self.file_key.clone()
    }

    fn file_name(&self) -> String {
        self.file_name.clone()
    }
}

// ─── Snapshot ────────────────────────────────────────────────────────────

/// Serializable tree view of the document, for inspection and CLI output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fills: Vec<Paint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub strokes: Vec<Paint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl Document {
    pub fn snapshot(&self) -> NodeSnapshot {
        self.snapshot_of(self.page)
    }

    fn snapshot_of(&self, idx: NodeIndex) -> NodeSnapshot {
        let node = &self.graph[idx];
        let (width, height) = node.size();
        let (characters, font, font_size, component_key) = match &node.kind {
            NodeKind::Text {
                characters,
                font,
                font_size,
            } => (
                Some(characters.clone()),
                Some(font.clone()),
                Some(*font_size),
                None,
            ),
            NodeKind::Instance { component_key, .. } => {
                (None, None, None, Some(component_key.clone()))
            }
            _ => (None, None, None, None),
        };
        NodeSnapshot {
            id: node.id,
            name: node.name.clone(),
            node_type: node.kind.node_type(),
            x: node.x,
            y: node.y,
            width,
            height,
            characters,
            font,
            font_size,
            component_key,
            fills: node.fills.to_vec(),
            strokes: node.strokes.to_vec(),
            children: self
                .child_indices(idx)
                .iter()
                .map(|&c| self.snapshot_of(c))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dh_core::host::FontLoader;
    use dh_core::model::Rgb;
    use pretty_assertions::assert_eq;

    fn doc() -> Document {
        Document::new(Arc::new(FontLibrary::new([FontName::new("Inter", "Regular")])))
    }

    #[test]
    fn new_nodes_land_on_the_page_in_order() {
        let mut d = doc();
        let a = d.create_frame();
        let b = d.create_frame();
        let ids: Vec<NodeId> = d.page_children().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn append_child_moves_to_end_of_parent() {
        let mut d = doc();
        let container = d.create_frame();
        let first = d.create_frame();
        let second = d.create_frame();
        d.append_child(container, second).unwrap();
        d.append_child(container, first).unwrap();

        let kids: Vec<NodeId> = d.children(container).iter().map(|n| n.id).collect();
        assert_eq!(kids, vec![second, first]);
        assert_eq!(d.page_children().len(), 1);
    }

    #[test]
    fn cycles_are_rejected() {
        let mut d = doc();
        let outer = d.create_frame();
        let inner = d.create_frame();
        d.append_child(outer, inner).unwrap();
        assert!(d.append_child(inner, outer).is_err());
        assert!(d.append_child(outer, outer).is_err());
    }

    #[test]
    fn text_cannot_have_children() {
        let mut d = doc();
        let text = d.create_text();
        let frame = d.create_frame();
        assert!(matches!(
            d.append_child(text, frame),
            Err(HostError::Unsupported { .. })
        ));
    }

    #[test]
    fn remove_drops_the_subtree() {
        let mut d = doc();
        let outer = d.create_frame();
        let inner = d.create_frame();
        d.append_child(outer, inner).unwrap();
        d.set_selection([inner]);

        d.remove(outer).unwrap();
        assert!(d.is_empty());
        assert!(d.get(inner).is_none());
        assert!(d.selection().is_empty());
    }

    #[test]
    fn resize_rejects_degenerate_sizes() {
        let mut d = doc();
        let f = d.create_frame();
        assert!(d.resize(f, 0.0, 10.0).is_err());
        assert!(d.resize(f, -5.0, 10.0).is_err());
        assert!(d.resize(f, f32::NAN, 10.0).is_err());
        d.resize(f, 320.0, 240.0).unwrap();
        assert_eq!(d.node(f).unwrap().bounds.width, 320.0);
    }

    #[tokio::test]
    async fn text_needs_a_loaded_font() {
        let mut d = doc();
        let t = d.create_text();
        assert!(matches!(
            d.set_characters(t, "Hi"),
            Err(HostError::FontNotLoaded(_))
        ));

        d.fonts().load_font(FontName::new("Inter", "Regular")).await.unwrap();
        d.set_characters(t, "Hi").unwrap();
        assert!(d.set_font(t, &FontName::new("Inter", "Bold")).is_err());
        assert!(d.set_font_size(t, 0.5).is_err());
        d.set_font_size(t, 20.0).unwrap();

        let (w, h) = d.get(t).unwrap().size();
        assert_eq!(h, 20.0 * LINE_HEIGHT);
        assert!(w > 0.0);
    }

    #[test]
    fn snapshot_nests_children() {
        let mut d = doc();
        let frame = d.create_frame();
        d.set_name(frame, "Card").unwrap();
        d.set_fills(frame, vec![Paint::solid(Rgb::WHITE)]).unwrap();
        let inner = d.create_frame();
        d.append_child(frame, inner).unwrap();

        let snap = d.snapshot();
        assert_eq!(snap.node_type, NodeType::Page);
        assert_eq!(snap.children.len(), 1);
        assert_eq!(snap.children[0].name, "Card");
        assert_eq!(snap.children[0].children[0].id, inner);
    }

    #[test]
    fn multi_line_text_measures_each_line() {
        let (w, h) = measure_text("ab\nabcd", 10.0);
        assert_eq!(h, 2.0 * 10.0 * LINE_HEIGHT);
        assert_eq!(w, 4.0 * 10.0 * GLYPH_ADVANCE);
    }
}
