//! Drafthook engine: turns instruction sets and frame lists into canvas
//! nodes through the host traits of `dh-core`.
//!
//! - [`Engine::render_typography`] renders a typography instruction into a
//!   design container.
//! - [`Engine::layout_frames_by_size`] lays out spreadsheet frame specs in
//!   titled groups.
//! - [`selection_details`] reports the selected frames.
//! - [`Plugin`] dispatches inbound messages and produces outbound ones.

pub mod engine;
pub mod fonts;
pub mod frames;
pub mod interpreter;
pub mod plugin;
pub mod relay;
pub mod selection;

pub use engine::{Engine, EngineError};
pub use fonts::{FontCache, FontLoadReport};
pub use frames::LayoutReport;
pub use interpreter::RenderReport;
pub use plugin::Plugin;
pub use selection::selection_details;
