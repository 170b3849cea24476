//! Instruction interpreter: renders a typography instruction into one design
//! container on the canvas.
//!
//! A batch goes through fixed phases: validate, preload fonts, remove the
//! previous containers, create the container, then text nodes and logos in
//! input order. Only validation can abort the batch. Every text node and
//! logo fails on its own, and a text node whose font cannot be applied is
//! rendered with the fallback face instead.

use crate::engine::{Engine, EngineError, HostResultExt};
use crate::fonts::{FontCache, bounded};
use dh_core::error::HostError;
use dh_core::font::{FontRequests, requested_font};
use dh_core::host::{AssetRegistry, Canvas, FontLoader};
use dh_core::id::NodeId;
use dh_core::instruction::{
    FrameStyle, Instruction, LogoInstruction, TextNodeInstruction, TypographyContent,
};
use dh_core::model::{NodeType, Paint};
use serde::Serialize;

/// What a successful batch produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderReport {
    pub container: NodeId,
    pub removed_containers: usize,
    pub fonts_loaded: usize,
    pub fonts_failed: usize,
    pub text_nodes: usize,
    pub text_nodes_failed: usize,
    pub logos: usize,
    pub logos_failed: usize,
    pub logos_skipped: usize,
}

impl<C, F, A> Engine<C, F, A>
where
    C: Canvas,
    F: FontLoader,
    A: AssetRegistry,
{
    /// Render the first typography instruction of `instructions`.
    ///
    /// Structural problems are logged and returned before the canvas is
    /// touched.
    pub async fn render_typography(
        &mut self,
        instructions: &[Instruction],
    ) -> Result<RenderReport, EngineError> {
        let content = TypographyContent::from_instructions(instructions).inspect_err(|e| {
            log::error!("typography instruction rejected: {e}");
        })?;

        // ─── Fonts ───
        let mut fonts = FontCache::new(self.host_timeout());
        let requests: FontRequests = content
            .text_nodes
            .iter()
            .filter_map(|node| node.as_ref().ok())
            .filter_map(|node| {
                let font = requested_font(&node.style);
                if font.is_none() {
                    log::warn!(
                        "text node \"{}\" has no fontFamily; it will use {}",
                        node.name,
                        self.config.render.fallback_font
                    );
                }
                font
            })
            .collect();
        log::info!("loading {} unique fonts", requests.len());
        let preload = fonts.preload(&self.fonts, requests.into_fonts()).await;

        // ─── Container ───
        let removed_containers = self.remove_containers()?;
        let container = self.create_container(&content.frame)?;

        let mut report = RenderReport {
            container,
            removed_containers,
            fonts_loaded: preload.loaded.len(),
            fonts_failed: preload.failed.len(),
            text_nodes: 0,
            text_nodes_failed: 0,
            logos: 0,
            logos_failed: 0,
            logos_skipped: 0,
        };

        // ─── Text ───
        for entry in &content.text_nodes {
            let node = match entry {
                Ok(node) => node,
                Err(e) => {
                    log::error!("{e}");
                    report.text_nodes_failed += 1;
                    continue;
                }
            };
            match self.render_text_node(container, node, &mut fonts).await {
                Ok(_) => report.text_nodes += 1,
                Err(e) => {
                    log::error!("text node \"{}\" failed: {e}", node.name);
                    report.text_nodes_failed += 1;
                }
            }
        }

        // ─── Logos ───
        for entry in &content.logos {
            let logo = match entry {
                Ok(logo) => logo,
                Err(e) => {
                    log::error!("{e}");
                    report.logos_failed += 1;
                    continue;
                }
            };
            let Some(key) = logo.key() else {
                log::warn!("logo \"{}\" has no componentKey, skipping", logo.name);
                report.logos_skipped += 1;
                continue;
            };
            match self.place_logo(container, logo, key).await {
                Ok(_) => report.logos += 1,
                Err(e) => {
                    log::error!("logo \"{}\" failed: {e}", logo.name);
                    report.logos_failed += 1;
                }
            }
        }

        log::info!(
            "rendered {} text nodes ({} failed), {} logos ({} failed, {} skipped)",
            report.text_nodes,
            report.text_nodes_failed,
            report.logos,
            report.logos_failed,
            report.logos_skipped
        );
        Ok(report)
    }

    /// Remove every top-level frame carrying the container prefix.
    fn remove_containers(&mut self) -> Result<usize, EngineError> {
        let prefix = self.config.render.container_prefix.as_str();
        let stale: Vec<NodeId> = self
            .canvas
            .page_children()
            .into_iter()
            .filter(|n| n.node_type == NodeType::Frame && n.name.starts_with(prefix))
            .map(|n| n.id)
            .collect();
        for id in &stale {
            self.canvas.remove(*id).during("removing a previous container")?;
        }
        if !stale.is_empty() {
            log::debug!("removed {} previous containers", stale.len());
        }
        Ok(stale.len())
    }

    fn create_container(&mut self, frame: &FrameStyle) -> Result<NodeId, EngineError> {
        let cfg = &self.config.render;
        let id = self.canvas.create_frame();
        let name = frame.name.as_deref().unwrap_or(&cfg.container_prefix);
        self.canvas.set_name(id, name).during("naming the container")?;

        let width = frame.width.unwrap_or(f32::NAN);
        let height = frame.height.unwrap_or(f32::NAN);
        if let Err(e) = self.canvas.resize(id, width, height) {
            log::warn!(
                "container size {width}x{height} rejected ({e}); using {}x{}",
                cfg.fallback_width,
                cfg.fallback_height
            );
            self.canvas
                .resize(id, cfg.fallback_width, cfg.fallback_height)
                .during("resizing the container")?;
        }

        self.canvas
            .set_position(id, cfg.container_x, cfg.container_y)
            .during("positioning the container")?;
        self.canvas
            .set_fills(id, vec![Paint::solid(cfg.container_fill)])
            .during("filling the container")?;
        self.canvas
            .append_to_page(id)
            .during("appending the container")?;
        Ok(id)
    }

    async fn render_text_node(
        &mut self,
        container: NodeId,
        node: &TextNodeInstruction,
        fonts: &mut FontCache,
    ) -> Result<NodeId, HostError> {
        let id = self.canvas.create_text();
        let result = self.fill_text_node(id, container, node, fonts).await;
        if result.is_err() {
            // Leave nothing half-built behind.
            if let Err(e) = self.canvas.remove(id) {
                log::warn!("could not remove partial text node {id}: {e}");
            }
        }
        result.map(|()| id)
    }

    async fn fill_text_node(
        &mut self,
        id: NodeId,
        container: NodeId,
        node: &TextNodeInstruction,
        fonts: &mut FontCache,
    ) -> Result<(), HostError> {
        let cfg = &self.config.render;
        if !node.name.is_empty() {
            self.canvas.set_name(id, &node.name)?;
        }

        let applied = match requested_font(&node.style) {
            Some(font) => match self.canvas.set_font(id, &font) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!(
                        "text node \"{}\": {e}; falling back to {}",
                        node.name,
                        cfg.fallback_font
                    );
                    false
                }
            },
            None => false,
        };
        if !applied {
            let fallback = cfg.fallback_font.clone();
            fonts.ensure(&self.fonts, &fallback).await;
            self.canvas.set_font(id, &fallback)?;
        }

        // Attach before editing text properties.
        self.canvas.append_child(container, id)?;
        self.canvas.set_characters(id, &node.characters)?;

        let cfg = &self.config.render;
        let size = match node.style.font_size {
            Some(size) if size >= 1.0 => size,
            other => {
                log::warn!(
                    "text node \"{}\" has invalid fontSize {other:?}; using {}",
                    node.name,
                    cfg.default_font_size
                );
                cfg.default_font_size
            }
        };
        self.canvas.set_font_size(id, size)?;

        let color = node.style.color.unwrap_or(cfg.default_text_color);
        self.canvas.set_fills(id, vec![Paint::solid(color)])?;
        self.canvas
            .set_position(id, node.placement.x, node.placement.y)?;
        Ok(())
    }

    async fn place_logo(
        &mut self,
        container: NodeId,
        logo: &LogoInstruction,
        key: &str,
    ) -> Result<NodeId, HostError> {
        let component = bounded(
            self.host_timeout(),
            || format!("resolving component {key}"),
            self.assets.resolve_component(key),
        )
        .await?;

        let id = self.canvas.create_instance(&component);
        let result = self.fill_logo(id, container, logo, &component.name);
        if result.is_err() {
            if let Err(e) = self.canvas.remove(id) {
                log::warn!("could not remove partial logo {id}: {e}");
            }
        }
        result.map(|()| id)
    }

    fn fill_logo(
        &mut self,
        id: NodeId,
        container: NodeId,
        logo: &LogoInstruction,
        component_name: &str,
    ) -> Result<(), HostError> {
        let name = if logo.name.is_empty() {
            component_name
        } else {
            &logo.name
        };
        self.canvas.set_name(id, name)?;
        self.canvas.append_child(container, id)?;
        if let Some(dims) = logo.dimensions {
            // A rejected size keeps the component's own size.
            if let Err(e) = self.canvas.resize(id, dims.width, dims.height) {
                log::warn!("logo \"{name}\": {e}; keeping the component size");
            }
        }
        if let Some(at) = logo.placement {
            self.canvas.set_position(id, at.x, at.y)?;
        }
        Ok(())
    }
}
