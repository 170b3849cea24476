//! In-memory component library standing in for the published asset registry.

use dh_core::error::HostError;
use dh_core::host::{AssetRegistry, ComponentHandle};
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct ComponentLibrary {
    components: HashMap<String, ComponentHandle>,
    lookups: RefCell<Vec<String>>,
    latency: Option<Duration>,
}

impl ComponentLibrary {
    pub fn new(components: impl IntoIterator<Item = ComponentHandle>) -> Self {
        Self {
            components: components
                .into_iter()
                .map(|c| (c.key.clone(), c))
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn publish(&mut self, component: ComponentHandle) {
        self.components.insert(component.key.clone(), component);
    }

    /// Keys looked up so far, in lookup order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }
}

impl AssetRegistry for ComponentLibrary {
    fn resolve_component(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<ComponentHandle, HostError>> {
        let key = key.to_string();
        async move {
            self.lookups.borrow_mut().push(key.clone());
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            self.components
                .get(&key)
                .cloned()
                .ok_or(HostError::ComponentNotFound(key))
        }
    }
}
