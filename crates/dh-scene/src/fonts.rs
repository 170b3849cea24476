//! In-memory font library.
//!
//! Tracks which faces are installed, which have been loaded, and every load
//! request issued (so callers can observe de-duplication).

use dh_core::error::HostError;
use dh_core::host::FontLoader;
use dh_core::model::FontName;
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct FontLibrary {
    available: HashSet<FontName>,
    loaded: Mutex<HashSet<FontName>>,
    requests: Mutex<Vec<FontName>>,
    latency: Option<Duration>,
}

impl FontLibrary {
    pub fn new(available: impl IntoIterator<Item = FontName>) -> Self {
        Self {
            available: available.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Delay every load by `latency` (to exercise timeouts and concurrency).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn is_available(&self, font: &FontName) -> bool {
        self.available.contains(font)
    }

    pub fn is_loaded(&self, font: &FontName) -> bool {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(font)
    }

    /// Every load request issued so far, in issue order.
    pub fn requests(&self) -> Vec<FontName> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of load requests issued for one face.
    pub fn request_count(&self, font: &FontName) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|f| *f == font)
            .count()
    }
}

impl FontLoader for FontLibrary {
    fn load_font(&self, font: FontName) -> impl Future<Output = Result<(), HostError>> + Send {
        async move {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(font.clone());

            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }

            if !self.available.contains(&font) {
                log::debug!("font {font} is not installed");
                return Err(HostError::FontUnavailable(font));
            }
            self.loaded
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(font);
            Ok(())
        }
    }
}
