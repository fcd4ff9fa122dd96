//! Application state shared across handlers.

use std::sync::Arc;

use customer_registry_core::LookupError;

use crate::config::RegistryConfig;
use crate::drafts::DraftCache;
use crate::lookup::LookupClient;
use crate::storage::JsonFileStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RegistryConfig,
    store: JsonFileStore,
    lookup: LookupClient,
    drafts: DraftCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup HTTP client cannot be built.
    pub fn new(config: RegistryConfig) -> Result<Self, LookupError> {
        let store = JsonFileStore::new(&config.data_dir);
        let lookup = LookupClient::new(&config.lookup)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                lookup,
                drafts: DraftCache::new(),
            }),
        })
    }

    /// Get a reference to the registry configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// Get a reference to the customer store.
    #[must_use]
    pub fn store(&self) -> &JsonFileStore {
        &self.inner.store
    }

    /// Get a reference to the lookup client.
    #[must_use]
    pub fn lookup(&self) -> &LookupClient {
        &self.inner.lookup
    }

    /// Get a reference to the open drafts.
    #[must_use]
    pub fn drafts(&self) -> &DraftCache {
        &self.inner.drafts
    }
}
