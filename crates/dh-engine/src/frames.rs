//! Grouped frame layout: creates one titled strip of frames per distinct
//! size, stacked below whatever is already on the page.
//!
//! Positions come from [`dh_core::layout::place_group`]; this module only
//! creates the nodes and measures each title so the next rows start below it.

use crate::engine::Engine;
use crate::fonts::FontCache;
use dh_core::error::HostError;
use dh_core::host::{AssetRegistry, Canvas, FontLoader};
use dh_core::id::NodeId;
use dh_core::layout::{
    FrameSpec, LayoutCursor, PlacedFrame, SizeGroup, group_by_size, place_group, title_color,
    wrap_limit,
};
use dh_core::model::{Bounds, FontName, Paint, Placement, Rgb};
use serde::Serialize;

/// What a layout call produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReport {
    pub groups: usize,
    pub titles: Vec<NodeId>,
    pub frames: Vec<NodeId>,
    pub frames_failed: usize,
    /// Specs dropped before grouping because their size is unusable.
    pub specs_skipped: usize,
    /// Where the next call would start if nothing else changed.
    #[serde(skip)]
    pub cursor: LayoutCursor,
}

impl<C, F, A> Engine<C, F, A>
where
    C: Canvas,
    F: FontLoader,
    A: AssetRegistry,
{
    /// Group `specs` by exact size and lay each group out under a title.
    ///
    /// Never fails as a whole: a spec with an unusable size is skipped and a
    /// frame or title the host rejects is logged and left out.
    pub async fn layout_frames_by_size(&mut self, specs: &[FrameSpec]) -> LayoutReport {
        let usable: Vec<FrameSpec> = specs
            .iter()
            .filter(|spec| {
                let ok = spec.has_valid_size();
                if !ok {
                    log::warn!(
                        "frame \"{}\" has unusable size {}x{}, skipping",
                        spec.name,
                        spec.width,
                        spec.height
                    );
                }
                ok
            })
            .cloned()
            .collect();
        let groups = group_by_size(&usable);

        let background = self.canvas.page_background();
        let color = title_color(background.first());
        let existing: Vec<Bounds> = self
            .canvas
            .page_children()
            .into_iter()
            .map(|n| n.bounds)
            .collect();
        let mut cursor = LayoutCursor::below(&existing, &self.config.layout);
        let limit = wrap_limit(self.canvas.viewport().width, &self.config.layout);

        let title_font = if groups.is_empty() {
            None
        } else {
            Some(self.title_font().await)
        };

        let mut report = LayoutReport {
            groups: groups.len(),
            titles: Vec::with_capacity(groups.len()),
            frames: Vec::with_capacity(usable.len()),
            frames_failed: 0,
            specs_skipped: specs.len() - usable.len(),
            cursor,
        };

        for group in &groups {
            let title_at = Placement {
                x: self.config.layout.start_x,
                y: cursor.y,
            };
            let title_height = match &title_font {
                Some(font) => match self.create_title(group, font, color, title_at) {
                    Ok((id, height)) => {
                        report.titles.push(id);
                        height
                    }
                    Err(e) => {
                        log::error!("title for group {} failed: {e}", group.key);
                        0.0
                    }
                },
                None => 0.0,
            };

            let (placement, next) =
                place_group(group, cursor, title_height, limit, &self.config.layout);
            for placed in &placement.frames {
                match self.create_frame(placed) {
                    Ok(id) => report.frames.push(id),
                    Err(e) => {
                        log::error!("frame \"{}\" failed: {e}", placed.spec.name);
                        report.frames_failed += 1;
                    }
                }
            }
            log::debug!(
                "group {} placed {} frames, lowest edge {}",
                group.key,
                placement.frames.len(),
                placement.lowest_edge
            );
            cursor = next;
        }

        report.cursor = cursor;
        log::info!(
            "created {} frames in {} groups",
            report.frames.len(),
            report.groups
        );
        report
    }

    /// The configured title face if it loads, otherwise the fallback face.
    async fn title_font(&self) -> FontName {
        let mut fonts = FontCache::new(self.host_timeout());
        let wanted = self.config.layout.title_font.clone();
        if fonts.ensure(&self.fonts, &wanted).await {
            return wanted;
        }
        let fallback = self.config.render.fallback_font.clone();
        log::warn!("title font {wanted} unavailable; using {fallback}");
        fonts.ensure(&self.fonts, &fallback).await;
        fallback
    }

    fn create_title(
        &mut self,
        group: &SizeGroup,
        font: &FontName,
        color: Rgb,
        at: Placement,
    ) -> Result<(NodeId, f32), HostError> {
        let id = self.canvas.create_text();
        let result = self.style_title(id, group, font, color, at);
        match result {
            Ok(()) => {
                let height = self
                    .canvas
                    .node(id)
                    .map(|n| n.bounds.height)
                    .unwrap_or_default();
                Ok((id, height))
            }
            Err(e) => {
                if let Err(remove) = self.canvas.remove(id) {
                    log::warn!("could not remove partial title {id}: {remove}");
                }
                Err(e)
            }
        }
    }

    fn style_title(
        &mut self,
        id: NodeId,
        group: &SizeGroup,
        font: &FontName,
        color: Rgb,
        at: Placement,
    ) -> Result<(), HostError> {
        let title = group.title();
        self.canvas.set_name(id, &title)?;
        self.canvas.set_font(id, font)?;
        self.canvas.set_characters(id, &title)?;
        self.canvas
            .set_font_size(id, self.config.layout.title_font_size)?;
        self.canvas.set_fills(id, vec![Paint::solid(color)])?;
        self.canvas.set_position(id, at.x, at.y)
    }

    fn create_frame(&mut self, placed: &PlacedFrame) -> Result<NodeId, HostError> {
        let id = self.canvas.create_frame();
        if let Err(e) = self.style_frame(id, placed) {
            if let Err(remove) = self.canvas.remove(id) {
                log::warn!("could not remove partial frame {id}: {remove}");
            }
            return Err(e);
        }
        Ok(id)
    }

    fn style_frame(&mut self, id: NodeId, placed: &PlacedFrame) -> Result<(), HostError> {
        let cfg = &self.config.layout;
        self.canvas.set_name(id, &placed.spec.name)?;
        self.canvas
            .resize(id, placed.bounds.width, placed.bounds.height)?;
        self.canvas
            .set_position(id, placed.bounds.x, placed.bounds.y)?;
        self.canvas.set_fills(id, vec![Paint::solid(cfg.frame_fill)])?;
        self.canvas.set_strokes(
            id,
            vec![Paint::solid(cfg.frame_stroke)],
            cfg.frame_stroke_weight,
        )
    }
}
