//! Font loading for one batch.
//!
//! Unique faces are loaded concurrently on a `JoinSet` and the phase only
//! returns once every load has settled. A failed load is recorded, never
//! propagated; the text nodes that wanted it fall back at render time.

use dh_core::error::HostError;
use dh_core::host::FontLoader;
use dh_core::model::FontName;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Await a host call, failing with [`HostError::Timeout`] once `limit`
/// elapses. `None` waits indefinitely.
pub(crate) async fn bounded<T>(
    limit: Option<Duration>,
    operation: impl FnOnce() -> String,
    call: impl Future<Output = Result<T, HostError>>,
) -> Result<T, HostError> {
    let Some(limit) = limit else {
        return call.await;
    };
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(HostError::Timeout {
            operation: operation(),
            millis: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

/// Outcome of a preload phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontLoadReport {
    pub loaded: Vec<FontName>,
    pub failed: Vec<(FontName, HostError)>,
}

/// Which faces this batch has already tried to load, and whether they loaded.
///
/// Every face is requested from the host at most once per batch, including
/// the fallback face that text nodes load on demand.
#[derive(Debug, Default)]
pub struct FontCache {
    settled: HashMap<FontName, bool>,
    timeout: Option<Duration>,
}

impl FontCache {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            settled: HashMap::new(),
            timeout,
        }
    }

    pub fn is_loaded(&self, font: &FontName) -> bool {
        self.settled.get(font).copied().unwrap_or(false)
    }

    /// Load `fonts` concurrently and wait for all of them to settle.
    /// Faces already settled in this cache are not requested again.
    pub async fn preload<F: FontLoader>(
        &mut self,
        loader: &Arc<F>,
        fonts: Vec<FontName>,
    ) -> FontLoadReport {
        let mut tasks = JoinSet::new();
        for font in fonts {
            if self.settled.contains_key(&font) {
                continue;
            }
            let loader = Arc::clone(loader);
            let timeout = self.timeout;
            tasks.spawn(async move {
                let label = font.to_string();
                let result = bounded(
                    timeout,
                    || format!("loading font {label}"),
                    loader.load_font(font.clone()),
                )
                .await;
                (font, result)
            });
        }

        let mut report = FontLoadReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((font, Ok(()))) => {
                    log::debug!("loaded font {font}");
                    self.settled.insert(font.clone(), true);
                    report.loaded.push(font);
                }
                Ok((font, Err(e))) => {
                    log::error!("failed to load font {font}: {e}");
                    self.settled.insert(font.clone(), false);
                    report.failed.push((font, e));
                }
                Err(e) => log::error!("font load task aborted: {e}"),
            }
        }
        report
    }

    /// Load one face unless this batch already settled it. Returns whether
    /// the face is usable.
    pub async fn ensure<F: FontLoader>(&mut self, loader: &Arc<F>, font: &FontName) -> bool {
        if let Some(&loaded) = self.settled.get(font) {
            return loaded;
        }
        let result = bounded(
            self.timeout,
            || format!("loading font {font}"),
            loader.load_font(font.clone()),
        )
        .await;
        let loaded = match result {
            Ok(()) => true,
            Err(e) => {
                log::error!("failed to load font {font}: {e}");
                false
            }
        };
        self.settled.insert(font.clone(), loaded);
        loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Loader that only knows `Inter`, with a fixed delay per load.
    #[derive(Default)]
    struct SlowLoader {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak: Mutex<usize>,
        delay_ms: u64,
    }

    impl FontLoader for SlowLoader {
        fn load_font(&self, font: FontName) -> impl Future<Output = Result<(), HostError>> + Send {
            async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                {
                    let mut peak = self.peak.lock().unwrap();
                    *peak = (*peak).max(now);
                }
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                if font.family == "Inter" {
                    Ok(())
                } else {
                    Err(HostError::FontUnavailable(font))
                }
            }
        }
    }

    fn fonts(names: &[(&str, &str)]) -> Vec<FontName> {
        names.iter().map(|(f, s)| FontName::new(*f, *s)).collect()
    }

    #[tokio::test]
    async fn failures_do_not_block_other_loads() {
        let loader = Arc::new(SlowLoader {
            delay_ms: 5,
            ..Default::default()
        });
        let mut cache = FontCache::default();
        let report = cache
            .preload(
                &loader,
                fonts(&[("Inter", "Bold"), ("Missing", "Regular"), ("Inter", "Regular")]),
            )
            .await;

        assert_eq!(report.loaded.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert!(cache.is_loaded(&FontName::new("Inter", "Bold")));
        assert!(!cache.is_loaded(&FontName::new("Missing", "Regular")));
    }

    #[tokio::test]
    async fn loads_run_concurrently() {
        let loader = Arc::new(SlowLoader {
            delay_ms: 20,
            ..Default::default()
        });
        let mut cache = FontCache::default();
        cache
            .preload(
                &loader,
                fonts(&[("Inter", "Thin"), ("Inter", "Light"), ("Inter", "Black")]),
            )
            .await;
        assert_eq!(*loader.peak.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn settled_faces_are_not_requested_again() {
        let loader = Arc::new(SlowLoader::default());
        let mut cache = FontCache::default();
        cache.preload(&loader, fonts(&[("Inter", "Regular")])).await;
        assert!(cache.ensure(&loader, &FontName::new("Inter", "Regular")).await);
        assert!(!cache.ensure(&loader, &FontName::new("Nope", "Bold")).await);
        assert!(!cache.ensure(&loader, &FontName::new("Nope", "Bold")).await);
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn timeouts_become_host_errors() {
        let loader = Arc::new(SlowLoader {
            delay_ms: 200,
            ..Default::default()
        });
        let mut cache = FontCache::new(Some(Duration::from_millis(10)));
        let report = cache.preload(&loader, fonts(&[("Inter", "Regular")])).await;
        assert!(matches!(
            report.failed.as_slice(),
            [(_, HostError::Timeout { millis: 10, .. })]
        ));
    }
}
