//! Host profiles: JSON descriptions of a document to start from.
//!
//! A profile lists the installed fonts, the published components, the page
//! background and viewport, any pre-existing nodes and which of them start
//! selected. Every field is optional:
//!
//! ```json
//! {
//!   "fileKey": "AbC123",
//!   "fonts": [{ "family": "Inter", "style": "Regular" }],
//!   "nodes": [{ "type": "frame", "name": "Hero", "width": 1440, "height": 900 }],
//!   "selection": ["Hero"]
//! }
//! ```

use crate::assets::ComponentLibrary;
use crate::document::{Document, NodeKind};
use crate::fonts::FontLibrary;
use dh_core::error::HostError;
use dh_core::host::ComponentHandle;
use dh_core::id::NodeId;
use dh_core::model::{Bounds, FontName, Paint, Rgb};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("host profile is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not seed node \"{name}\": {source}")]
    Seed {
        name: String,
        #[source]
        source: HostError,
    },

    #[error("selection names \"{0}\", which matches no node")]
    UnknownSelection(String),
}

/// A node present in the document before the engine runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SeedNode {
    #[serde(rename_all = "camelCase")]
    Frame {
        name: String,
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        width: f32,
        height: f32,
        #[serde(default)]
        fill: Option<Rgb>,
        #[serde(default)]
        children: Vec<SeedNode>,
    },
    #[serde(rename_all = "camelCase")]
    Text {
        name: String,
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        characters: String,
        #[serde(default = "default_font_size")]
        font_size: f32,
    },
}

fn default_font_size() -> f32 {
    12.0
}

fn default_fonts() -> Vec<FontName> {
    ["Regular", "Medium", "Bold"]
        .into_iter()
        .map(|style| FontName::new("Inter", style))
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostProfile {
    pub file_key: Option<String>,
    pub file_name: String,
    pub fonts: Vec<FontName>,
    pub components: Vec<ComponentHandle>,
    pub background: Vec<Paint>,
    pub viewport: Bounds,
    pub nodes: Vec<SeedNode>,
    /// Names of nodes to select, in selection order.
    pub selection: Vec<String>,
    /// Artificial delay applied to every font load and component lookup.
    pub latency_ms: Option<u64>,
}

impl Default for HostProfile {
    fn default() -> Self {
        Self {
            file_key: None,
            file_name: "Untitled".into(),
            fonts: default_fonts(),
            components: Vec::new(),
            background: vec![Paint::solid(Rgb::new(0.96, 0.96, 0.96))],
            viewport: Bounds {
                x: 0.0,
                y: 0.0,
                width: 1440.0,
                height: 900.0,
            },
            nodes: Vec::new(),
            selection: Vec::new(),
            latency_ms: None,
        }
    }
}

/// A complete in-memory host: the document plus its font and component
/// libraries. The document shares the font library so text edits can see
/// which faces were loaded.
#[derive(Debug)]
pub struct MemoryHost {
    pub document: Document,
    pub fonts: Arc<FontLibrary>,
    pub assets: ComponentLibrary,
}

impl HostProfile {
    pub fn from_json(text: &str) -> Result<Self, ProfileError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn build(&self) -> Result<MemoryHost, ProfileError> {
        let latency = self.latency_ms.map(Duration::from_millis);

        let mut fonts = FontLibrary::new(self.fonts.iter().cloned());
        let mut assets = ComponentLibrary::new(self.components.iter().cloned());
        if let Some(latency) = latency {
            fonts = fonts.with_latency(latency);
            assets = assets.with_latency(latency);
        }
        let fonts = Arc::new(fonts);

        let mut document = Document::new(Arc::clone(&fonts));
        document.set_background(self.background.clone());
        document.set_viewport(self.viewport);
        document.set_file(self.file_key.clone(), self.file_name.clone());

        for node in &self.nodes {
            seed_node(&mut document, None, node)?;
        }

        let mut selection = Vec::new();
        for name in &self.selection {
            let found = document.find_by_name(name);
            if found.is_empty() {
                return Err(ProfileError::UnknownSelection(name.clone()));
            }
            selection.extend(found);
        }
        document.set_selection(selection);

        log::debug!(
            "host profile seeded {} nodes, {} fonts, {} components",
            document.len(),
            self.fonts.len(),
            self.components.len()
        );
        Ok(MemoryHost {
            document,
            fonts,
            assets,
        })
    }
}

fn seed_node(
    doc: &mut Document,
    parent: Option<NodeId>,
    node: &SeedNode,
) -> Result<(), ProfileError> {
    match node {
        SeedNode::Frame {
            name,
            x,
            y,
            width,
            height,
            fill,
            children,
        } => {
            let fills = fill.map(Paint::solid).into_iter().collect();
            let id = doc
                .seed(
                    parent,
                    name,
                    NodeKind::Frame {
                        width: *width,
                        height: *height,
                    },
                    *x,
                    *y,
                    fills,
                )
                .map_err(|source| ProfileError::Seed {
                    name: name.clone(),
                    source,
                })?;
            for child in children {
                seed_node(doc, Some(id), child)?;
            }
        }
        SeedNode::Text {
            name,
            x,
            y,
            characters,
            font_size,
        } => {
            doc.seed(
                parent,
                name,
                NodeKind::Text {
                    characters: characters.clone(),
                    font: FontName::new("Inter", "Regular"),
                    font_size: *font_size,
                },
                *x,
                *y,
                vec![Paint::solid(Rgb::BLACK)],
            )
            .map_err(|source| ProfileError::Seed {
                name: name.clone(),
                source,
            })?;
        }
    }
    Ok(())
}
