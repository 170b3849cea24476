//! The host seam: everything the engine needs from the design tool.
//!
//! [`Canvas`] is the synchronous document API (node creation, geometry,
//! paints, selection). Font loading and component lookup are asynchronous
//! and live behind [`FontLoader`] and [`AssetRegistry`]. The engine never
//! holds host state across calls; it reads the canvas fresh on every batch.

use crate::error::HostError;
use crate::id::NodeId;
use crate::model::{Bounds, FontName, NodeInfo, Paint};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// A reusable component published in the asset registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentHandle {
    pub key: String,
    pub name: String,
    pub width: f32,
    pub height: f32,
}

/// Synchronous document operations.
///
/// New nodes are created on the current page (top level), mirroring the
/// host; [`Canvas::append_child`] moves them under another node.
pub trait Canvas {
    /// Top-level nodes of the current page, in z-order.
    fn page_children(&self) -> Vec<NodeInfo>;

    /// Look up a node anywhere in the document.
    fn node(&self, id: NodeId) -> Option<NodeInfo>;

    /// Children of a node, in z-order.
    fn children(&self, id: NodeId) -> Vec<NodeInfo>;

    fn create_frame(&mut self) -> NodeId;
    fn create_text(&mut self) -> NodeId;
    fn create_instance(&mut self, component: &ComponentHandle) -> NodeId;

    fn set_name(&mut self, id: NodeId, name: &str) -> Result<(), HostError>;

    /// Move `child` to the end of `parent`'s children.
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError>;

    /// Move a node back to the top level of the current page.
    fn append_to_page(&mut self, id: NodeId) -> Result<(), HostError>;

    /// Remove a node and its subtree.
    fn remove(&mut self, id: NodeId) -> Result<(), HostError>;

    /// Rejects non-finite sizes and sizes below 0.01.
    fn resize(&mut self, id: NodeId, width: f32, height: f32) -> Result<(), HostError>;

    /// Position relative to the node's parent.
    fn set_position(&mut self, id: NodeId, x: f32, y: f32) -> Result<(), HostError>;

    fn set_fills(&mut self, id: NodeId, fills: Vec<Paint>) -> Result<(), HostError>;
    fn set_strokes(&mut self, id: NodeId, strokes: Vec<Paint>, weight: f32)
    -> Result<(), HostError>;

    /// Fails with [`HostError::FontNotLoaded`] unless the face was loaded.
    fn set_font(&mut self, id: NodeId, font: &FontName) -> Result<(), HostError>;

    /// Fails unless the node's current font is loaded.
    fn set_characters(&mut self, id: NodeId, characters: &str) -> Result<(), HostError>;

    /// Rejects sizes below 1.
    fn set_font_size(&mut self, id: NodeId, size: f32) -> Result<(), HostError>;

    /// Currently selected nodes, in selection order.
    fn selection(&self) -> Vec<NodeId>;

    /// Background paints of the current page.
    fn page_background(&self) -> Vec<Paint>;

    /// Visible area of the current page.
    fn viewport(&self) -> Bounds;

    /// Key of the open document, when the host exposes one.
    fn file_key(&self) -> Option<String>;

    /// Display name of the open document.
    fn file_name(&self) -> String;
}

/// Asynchronous font loading. Loads run concurrently, so implementations are
/// shared across tasks.
pub trait FontLoader: Send + Sync + 'static {
    fn load_font(&self, font: FontName) -> impl Future<Output = Result<(), HostError>> + Send;
}

/// Asynchronous lookup of published components by key.
pub trait AssetRegistry {
    fn resolve_component(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<ComponentHandle, HostError>>;
}
