//! Geometry, paint and font primitives shared by the engine and the host.
//!
//! Colors are normalized RGB (`0.0..=1.0` per channel), the same encoding the
//! automation pipeline sends in `style.color` and the host expects in fills.

use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Colors & Paint ──────────────────────────────────────────────────────

/// Normalized RGB color. An `a` channel in incoming JSON is accepted and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Relative luminance as a plain linear combination of the channels.
    /// No gamma correction is applied.
    pub fn luminance(&self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    /// Emit as `#RRGGBB`.
    pub fn to_hex(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02X}{:02X}{:02X}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }
}

/// A gradient stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub position: f32, // 0.0 .. 1.0
    pub color: Rgb,
}

/// Fill, stroke or page background paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Paint {
    Solid { color: Rgb },
    GradientLinear { stops: Vec<GradientStop> },
    Image {
        #[serde(rename = "imageHash")]
        image_hash: String,
    },
}

impl Paint {
    pub const fn solid(color: Rgb) -> Self {
        Paint::Solid { color }
    }

    /// The color of a solid paint, `None` for gradients and images.
    pub fn solid_color(&self) -> Option<Rgb> {
        match self {
            Paint::Solid { color } => Some(*color),
            _ => None,
        }
    }
}

// ─── Fonts ───────────────────────────────────────────────────────────────

/// A concrete font face: family plus named style (`Inter` / `Bold`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontName {
    pub family: String,
    pub style: String,
}

impl FontName {
    pub fn new(family: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            style: style.into(),
        }
    }
}

impl fmt::Display for FontName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.style)
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Position relative to the parent node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
}

/// Requested width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

/// Axis-aligned box of a node, in its parent's coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Check if this box intersects another (AABB overlap).
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

// ─── Node summaries ──────────────────────────────────────────────────────

/// Host node categories the engine cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Page,
    Frame,
    Text,
    Instance,
}

/// Read-only view of a canvas node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub node_type: NodeType,
    pub bounds: Bounds,
}

/// Selection report entry posted to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameDetails {
    pub name: String,
    pub id: NodeId,
    pub width: f32,
    pub height: f32,
    pub x: f32,
    pub y: f32,
}

impl From<&NodeInfo> for FrameDetails {
    fn from(info: &NodeInfo) -> Self {
        Self {
            name: info.name.clone(),
            id: info.id,
            width: info.bounds.width,
            height: info.bounds.height,
            x: info.bounds.x,
            y: info.bounds.y,
        }
    }
}
