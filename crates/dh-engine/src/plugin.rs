//! Message dispatch: routes inbound envelopes to the engine and turns the
//! results into outbound messages for the UI and relay.
//!
//! Nothing escapes [`Plugin::handle`]: structural problems are logged,
//! unexpected host failures become an error toast.

use crate::engine::{Engine, EngineError};
use crate::relay;
use crate::selection::selection_details;
use dh_core::config::EngineConfig;
use dh_core::host::{AssetRegistry, Canvas, FontLoader};
use dh_core::instruction::Instruction;
use dh_core::layout::FrameSpec;
use dh_core::message::{Inbound, Outbound};
use serde_json::Value;
use std::sync::Arc;

pub const DESIGN_UPDATED: &str = "Design updated!";
pub const DESIGN_FAILED: &str = "Error updating design.";
pub const INVALID_CSV: &str = "Invalid data format received from CSV.";

/// A running plugin session over one host.
pub struct Plugin<C, F, A> {
    engine: Engine<C, F, A>,
    closed: bool,
}

impl<C, F, A> Plugin<C, F, A>
where
    C: Canvas,
    F: FontLoader,
    A: AssetRegistry,
{
    pub fn new(canvas: C, fonts: Arc<F>, assets: A, config: EngineConfig) -> Self {
        Self {
            engine: Engine::new(canvas, fonts, assets, config),
            closed: false,
        }
    }

    /// Messages posted when the plugin opens: the initial selection report.
    pub fn start(&self) -> Vec<Outbound> {
        vec![self.on_selection_change()]
    }

    pub fn on_selection_change(&self) -> Outbound {
        Outbound::UpdateSelectionDetails {
            frames: selection_details(&self.engine.canvas),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn engine(&self) -> &Engine<C, F, A> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine<C, F, A> {
        &mut self.engine
    }

    pub fn into_engine(self) -> Engine<C, F, A> {
        self.engine
    }

    /// Process one message to completion. A selection the message changed
    /// (for example by removing a selected container) is reported after the
    /// message's own output.
    pub async fn handle(&mut self, message: Inbound) -> Vec<Outbound> {
        if self.closed {
            log::warn!("plugin is closed, dropping {} message", message.kind());
            return Vec::new();
        }
        log::debug!("handling {} message", message.kind());

        let selected = self.engine.canvas.selection();
        let mut out = self.dispatch(message).await;
        if self.engine.canvas.selection() != selected {
            out.push(self.on_selection_change());
        }
        out
    }

    async fn dispatch(&mut self, message: Inbound) -> Vec<Outbound> {
        match message {
            Inbound::BuildDesign(Some(instructions))
            | Inbound::WebsocketInstructions(Some(instructions)) => {
                self.build_design(&instructions).await
            }
            Inbound::BuildDesign(None) => {
                log::warn!("build-design message has no instruction list");
                Vec::new()
            }
            Inbound::WebsocketInstructions(None) => {
                log::warn!("websocket-instructions payload is not a build-design request");
                Vec::new()
            }
            Inbound::CreateFrames(data) => self.create_frames(data).await,
            Inbound::ChatMessage {
                message,
                figma_frame,
            } => relay::chat_message(&message, figma_frame),
            Inbound::SendCredentials {
                api_key,
                manual_file_key,
            } => relay::credentials(
                &self.engine.canvas,
                api_key.as_deref(),
                manual_file_key.as_deref(),
            ),
            Inbound::Close => {
                log::info!("closing plugin");
                self.closed = true;
                vec![Outbound::ClosePlugin]
            }
            Inbound::Unknown(kind) => {
                log::info!("ignoring unknown message type {kind:?}");
                Vec::new()
            }
        }
    }

    async fn build_design(&mut self, instructions: &[Instruction]) -> Vec<Outbound> {
        match self.engine.render_typography(instructions).await {
            Ok(report) => {
                log::debug!("render report: {report:?}");
                vec![Outbound::notify(DESIGN_UPDATED)]
            }
            // Already logged; the missing toast is the signal.
            Err(EngineError::Instruction(_)) => Vec::new(),
            Err(e) => {
                log::error!("design update failed: {e}");
                vec![Outbound::notify_error(DESIGN_FAILED)]
            }
        }
    }

    async fn create_frames(&mut self, data: Option<Value>) -> Vec<Outbound> {
        let Some(specs) = data.as_ref().and_then(frame_specs) else {
            log::error!("invalid create-frames data: {data:?}");
            return vec![Outbound::notify_error(INVALID_CSV)];
        };

        let report = self.engine.layout_frames_by_size(&specs).await;
        let message = format!("Created {} frames.", report.frames.len());
        vec![
            Outbound::CsvFramesCreated {
                message: message.clone(),
            },
            Outbound::notify(message),
        ]
    }
}

/// Decode `create-frames` data: an array whose first row has `name`,
/// `width` and `height`, and whose rows all decode as frame specs.
fn frame_specs(data: &Value) -> Option<Vec<FrameSpec>> {
    let rows = data.as_array()?;
    if let Some(first) = rows.first() {
        let has = |key: &str| first.get(key).is_some();
        if !(has("name") && has("width") && has("height")) {
            return None;
        }
    }
    match serde_json::from_value(data.clone()) {
        Ok(specs) => Some(specs),
        Err(e) => {
            log::error!("create-frames rows could not be decoded: {e}");
            None
        }
    }
}
