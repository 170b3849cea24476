//! In-memory design host for the drafthook engine.
//!
//! [`Document`] implements the canvas API over a petgraph tree, while
//! [`FontLibrary`] and [`ComponentLibrary`] stand in for the host's font
//! loading and published component registry. A [`HostProfile`] builds all
//! three from JSON.

pub mod assets;
pub mod document;
pub mod fonts;
pub mod profile;
pub mod svg;

pub use assets::ComponentLibrary;
pub use document::{Document, NodeKind, NodeSnapshot, SceneNode};
pub use fonts::FontLibrary;
pub use profile::{HostProfile, MemoryHost, ProfileError, SeedNode};
pub use svg::render_svg;
