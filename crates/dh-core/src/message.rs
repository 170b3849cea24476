//! Messages exchanged with the relay UI.
//!
//! Inbound messages are `{ "type": ..., ... }` envelopes. The engine-facing
//! shapes (`build-design`, `websocket-instructions`, `create-frames`) are
//! decoded leniently: a payload that does not have the expected shape
//! decodes to `None` so the dispatcher can log and ignore it. Only an
//! envelope without a `type` tag is an error.

use crate::error::MessageError;
use crate::instruction::Instruction;
use crate::model::FrameDetails;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload tag of a build request inside `websocket-instructions`.
pub const BUILD_DESIGN: &str = "build-design";

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// `{type: "build-design", instructions: [..]}`.
    BuildDesign(Option<Vec<Instruction>>),
    /// `{type: "websocket-instructions", data: {instructions: {type: "build-design", instructions: [..]}}}`.
    WebsocketInstructions(Option<Vec<Instruction>>),
    /// `{type: "create-frames", data: [..]}`; validated by the dispatcher.
    CreateFrames(Option<Value>),
    /// Chat text for the automation backend.
    ChatMessage { message: String, figma_frame: Value },
    /// API credentials for the automation backend.
    SendCredentials {
        api_key: Option<String>,
        manual_file_key: Option<String>,
    },
    Close,
    /// Any other tag; logged and ignored.
    Unknown(String),
}

impl Inbound {
    pub fn from_json(text: &str) -> Result<Self, MessageError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    pub fn from_value(value: Value) -> Result<Self, MessageError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(MessageError::MissingType)?;

        let message = match kind {
            BUILD_DESIGN => Inbound::BuildDesign(instruction_list(value.get("instructions"))),
            "websocket-instructions" => {
                let payload = value.get("data").and_then(|d| d.get("instructions"));
                let is_build = payload
                    .and_then(|p| p.get("type"))
                    .and_then(Value::as_str)
                    == Some(BUILD_DESIGN);
                Inbound::WebsocketInstructions(if is_build {
                    instruction_list(payload.and_then(|p| p.get("instructions")))
                } else {
                    None
                })
            }
            "create-frames" => Inbound::CreateFrames(value.get("data").cloned()),
            "chat-message" => Inbound::ChatMessage {
                message: string_field(&value, "message").unwrap_or_default(),
                figma_frame: value
                    .get("figmaFrame")
                    .filter(|f| !f.is_null())
                    .cloned()
                    .unwrap_or_else(|| Value::Array(Vec::new())),
            },
            "send-credentials-to-n8n" => Inbound::SendCredentials {
                api_key: string_field(&value, "apiKey"),
                manual_file_key: string_field(&value, "manualFileKey"),
            },
            "close" => Inbound::Close,
            other => Inbound::Unknown(other.to_string()),
        };
        Ok(message)
    }

    /// The envelope tag, for logging.
    pub fn kind(&self) -> &str {
        match self {
            Inbound::BuildDesign(_) => BUILD_DESIGN,
            Inbound::WebsocketInstructions(_) => "websocket-instructions",
            Inbound::CreateFrames(_) => "create-frames",
            Inbound::ChatMessage { .. } => "chat-message",
            Inbound::SendCredentials { .. } => "send-credentials-to-n8n",
            Inbound::Close => "close",
            Inbound::Unknown(kind) => kind,
        }
    }
}

fn instruction_list(value: Option<&Value>) -> Option<Vec<Instruction>> {
    let list = value.filter(|v| v.is_array())?;
    match Vec::<Instruction>::deserialize(list) {
        Ok(instructions) => Some(instructions),
        Err(e) => {
            log::warn!("instruction list could not be decoded: {e}");
            None
        }
    }
}

/// A non-empty string field.
fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ─── Outbound ────────────────────────────────────────────────────────────

/// Destination of a pass-through payload the relay forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayChannel {
    Chat,
    Credentials,
}

/// Messages the engine posts back to the UI / relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Outbound {
    /// Toast notification.
    Notify {
        message: String,
        #[serde(default)]
        error: bool,
    },
    UpdateSelectionDetails {
        frames: Vec<FrameDetails>,
    },
    CsvFramesCreated {
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    CredentialStatus {
        text: String,
        is_error: bool,
    },
    /// Payload for the relay to forward to the automation backend.
    Relay {
        channel: RelayChannel,
        body: Value,
    },
    ClosePlugin,
}

impl Outbound {
    pub fn notify(message: impl Into<String>) -> Self {
        Outbound::Notify {
            message: message.into(),
            error: false,
        }
    }

    pub fn notify_error(message: impl Into<String>) -> Self {
        Outbound::Notify {
            message: message.into(),
            error: true,
        }
    }
}
