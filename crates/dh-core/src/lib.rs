pub mod config;
pub mod error;
pub mod font;
pub mod host;
pub mod id;
pub mod instruction;
pub mod layout;
pub mod message;
pub mod model;

pub use config::{EngineConfig, LayoutConfig, RenderConfig};
pub use error::{ConfigError, HostError, InstructionError, ItemError, MessageError};
pub use host::{AssetRegistry, Canvas, ComponentHandle, FontLoader};
pub use id::NodeId;
pub use instruction::{Instruction, TypographyContent};
pub use layout::{FrameSpec, LayoutCursor, SizeGroup, group_by_size};
pub use message::{Inbound, Outbound};
pub use model::*;
