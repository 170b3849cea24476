//! Static SVG export of a [`Document`], used by the CLI to preview results.
//!
//! Node positions are parent-relative, so every container opens a
//! translated `<g>` and its children render in local coordinates.

use crate::document::{Document, NodeKind, SceneNode};
use dh_core::model::{Bounds, Paint, Rgb};
use petgraph::graph::NodeIndex;
use std::fmt::Write;

const PADDING: f32 = 16.0;

fn paint_to_svg_color(p: &Paint) -> String {
    match p {
        Paint::Solid { color } => color.to_hex(),
        Paint::GradientLinear { stops } => stops
            .first()
            .map(|s| s.color.to_hex())
            .unwrap_or_else(|| "#000000".to_string()),
        // Image fills have no pixels here; show a neutral placeholder.
        Paint::Image { .. } => Rgb::new(0.85, 0.85, 0.85).to_hex(),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the whole page. The view box hugs the top-level nodes.
pub fn render_svg(doc: &Document) -> String {
    let page = doc.page_index();
    let top_level = doc.child_indices(page);

    let extent = top_level
        .iter()
        .map(|&idx| doc.node_at(idx).bounds())
        .reduce(|a, b| {
            let x = a.x.min(b.x);
            let y = a.y.min(b.y);
            Bounds {
                x,
                y,
                width: a.right().max(b.right()) - x,
                height: a.bottom().max(b.bottom()) - y,
            }
        })
        .unwrap_or(Bounds {
            x: 0.0,
            y: 0.0,
            width: 800.0,
            height: 600.0,
        });

    let width = extent.width + PADDING * 2.0;
    let height = extent.height + PADDING * 2.0;
    let background = doc
        .page_background_paint()
        .map(paint_to_svg_color)
        .unwrap_or_else(|| "#F5F5F5".to_string());

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );
    svg.push_str("<style>\n  text { font-family: Inter, system-ui, sans-serif; }\n</style>\n");
    let _ = writeln!(
        svg,
        "<rect width=\"{width}\" height=\"{height}\" fill=\"{background}\" />"
    );
    let _ = writeln!(
        svg,
        "<g transform=\"translate({}, {})\">",
        PADDING - extent.x,
        PADDING - extent.y
    );
    for &idx in top_level {
        render_node_svg(&mut svg, doc, idx);
    }
    svg.push_str("</g>\n</svg>");
    svg
}

fn render_node_svg(out: &mut String, doc: &Document, idx: NodeIndex) {
    let node = doc.node_at(idx);
    let (width, height) = node.size();
    let fill = first_paint(node, false);
    let stroke = first_paint(node, true);

    match &node.kind {
        NodeKind::Page => {}
        NodeKind::Frame { .. } => {
            let _ = writeln!(
                out,
                "<g data-name=\"{}\" transform=\"translate({}, {})\">\n  <rect width=\"{width}\" height=\"{height}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\" />",
                escape(&node.name),
                node.x,
                node.y,
                fill.unwrap_or_else(|| "none".into()),
                stroke.unwrap_or_else(|| "none".into()),
                node.stroke_weight
            );
            for &child in doc.child_indices(idx) {
                render_node_svg(out, doc, child);
            }
            out.push_str("</g>\n");
        }
        NodeKind::Text {
            characters,
            font,
            font_size,
        } => {
            let color = fill.unwrap_or_else(|| "#000000".into());
            let weight = if font.style.contains("Bold") { "bold" } else { "normal" };
            let line_height = font_size * crate::document::LINE_HEIGHT;
            let mut y = node.y + font_size * 0.9;
            for line in characters.split('\n') {
                let _ = writeln!(
                    out,
                    "  <text x=\"{}\" y=\"{y}\" font-size=\"{font_size}\" font-weight=\"{weight}\" fill=\"{color}\">{}</text>",
                    node.x,
                    escape(line)
                );
                y += line_height;
            }
        }
        NodeKind::Instance { component_key, .. } => {
            let _ = writeln!(
                out,
                "  <rect x=\"{}\" y=\"{}\" width=\"{width}\" height=\"{height}\" fill=\"{}\" stroke=\"#999999\" stroke-dasharray=\"4 2\" data-component=\"{}\" />",
                node.x,
                node.y,
                fill.unwrap_or_else(|| "none".into()),
                escape(component_key)
            );
        }
    }
}

fn first_paint(node: &SceneNode, stroke: bool) -> Option<String> {
    let paints = if stroke { &node.strokes } else { &node.fills };
    paints.first().map(paint_to_svg_color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontLibrary;
    use dh_core::host::Canvas;
    use std::sync::Arc;

    #[test]
    fn empty_page_renders_default_canvas() {
        let doc = Document::new(Arc::new(FontLibrary::default()));
        let svg = render_svg(&doc);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"832\""));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn frames_nest_their_children() {
        let mut doc = Document::new(Arc::new(FontLibrary::default()));
        let outer = doc.create_frame();
        doc.set_position(outer, 100.0, 100.0).unwrap();
        doc.set_fills(outer, vec![Paint::solid(Rgb::WHITE)]).unwrap();
        let inner = doc.create_frame();
        doc.append_child(outer, inner).unwrap();

        let svg = render_svg(&doc);
        assert!(svg.contains("fill=\"#FFFFFF\""));
        assert_eq!(svg.matches("<rect width=\"100\"").count(), 2);
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }
}
