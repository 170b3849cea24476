use dh_core::config::EngineConfig;
use dh_core::error::{HostError, InstructionError};
use dh_core::host::{AssetRegistry, Canvas, FontLoader};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failures that end a batch early.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The instruction set is structurally invalid. Nothing was changed.
    #[error(transparent)]
    Instruction(#[from] InstructionError),

    /// The host rejected an operation the batch cannot do without.
    #[error("{operation} failed: {source}")]
    Host {
        operation: &'static str,
        #[source]
        source: HostError,
    },
}

pub(crate) trait HostResultExt<T> {
    fn during(self, operation: &'static str) -> Result<T, EngineError>;
}

impl<T> HostResultExt<T> for Result<T, HostError> {
    fn during(self, operation: &'static str) -> Result<T, EngineError> {
        self.map_err(|source| EngineError::Host { operation, source })
    }
}

/// The layout engine bound to one host.
///
/// Owns the canvas handle and shares the font loader with its load tasks.
/// Every batch reads the canvas fresh; nothing carries over between calls
/// except the configuration.
pub struct Engine<C, F, A> {
    pub canvas: C,
    pub fonts: Arc<F>,
    pub assets: A,
    pub config: EngineConfig,
}

impl<C, F, A> Engine<C, F, A>
where
    C: Canvas,
    F: FontLoader,
    A: AssetRegistry,
{
    pub fn new(canvas: C, fonts: Arc<F>, assets: A, config: EngineConfig) -> Self {
        Self {
            canvas,
            fonts,
            assets,
            config,
        }
    }

    pub(crate) fn host_timeout(&self) -> Option<Duration> {
        self.config.host_timeout_ms.map(Duration::from_millis)
    }
}
