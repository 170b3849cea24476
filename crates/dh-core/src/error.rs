//! Error types for instruction decoding, host calls and message envelopes.

use crate::model::FontName;
use thiserror::Error;

/// Structural problems with an instruction set. These abort the whole batch
/// before anything touches the canvas.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstructionError {
    #[error("no instruction named \"typography\" in the set")]
    MissingTypography,

    #[error("typography instruction has no content")]
    MissingContent,

    #[error("typography content is missing the frame object")]
    MissingFrame,

    #[error("typography content is missing the textNodes array")]
    MissingTextNodes,
}

/// A single entry of a batch (text node, logo, frame spec) that could not be
/// decoded. Isolated: its siblings are still processed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} #{index} is malformed: {reason}")]
pub struct ItemError {
    pub kind: &'static str,
    pub index: usize,
    pub reason: String,
}

/// Failures reported by the host canvas, font loader or asset registry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("font {0} is not available")]
    FontUnavailable(FontName),

    #[error("font {0} has not been loaded")]
    FontNotLoaded(FontName),

    #[error("no component published under key \"{0}\"")]
    ComponentNotFound(String),

    #[error("node {0} does not exist")]
    NodeNotFound(String),

    #[error("node {id} does not support {operation}")]
    Unsupported { id: String, operation: &'static str },

    #[error("invalid value for {property}: {value}")]
    InvalidValue { property: &'static str, value: String },

    #[error("{operation} timed out after {millis} ms")]
    Timeout { operation: String, millis: u64 },
}

/// Inbound message envelopes that cannot be interpreted at all.
#[derive(Error, Debug)]
pub enum MessageError {
    #[error("message is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message has no \"type\" tag")]
    MissingType,
}

/// Engine configuration that failed to load.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
