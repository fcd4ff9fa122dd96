//! In-progress forms, keyed by draft ID.
//!
//! Opening the add or edit page creates a draft; every htmx request on that
//! page names its draft in the URL. Drafts idle out after an hour.
//!
//! Each draft sits behind a `std::sync::Mutex`. Handlers must never hold the
//! lock across an `.await`: take a lookup ticket under the lock, release it,
//! run the lookup, then lock again to apply the result.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use customer_registry_core::CustomerForm;
use moka::future::Cache;

customer_registry_core::define_id!(DraftId);

/// Drafts untouched for this long are dropped.
const DRAFT_IDLE: Duration = Duration::from_secs(60 * 60);

/// Upper bound on concurrently open drafts.
const MAX_DRAFTS: u64 = 10_000;

/// A form shared between the requests of one page.
pub type SharedForm = Arc<Mutex<CustomerForm>>;

/// Store of open drafts.
#[derive(Clone)]
pub struct DraftCache {
    cache: Cache<DraftId, SharedForm>,
}

impl DraftCache {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_DRAFTS)
            .time_to_idle(DRAFT_IDLE)
            .build();
        Self { cache }
    }

    /// Register `form` under a fresh ID.
    pub async fn open(&self, form: CustomerForm) -> DraftId {
        let id = DraftId::generate();
        self.cache.insert(id, Arc::new(Mutex::new(form))).await;
        tracing::debug!(draft_id = %id, "Draft opened");
        id
    }

    /// Look up an open draft.
    pub async fn get(&self, id: DraftId) -> Option<SharedForm> {
        self.cache.get(&id).await
    }

    /// Drop a draft once it has been saved.
    pub async fn discard(&self, id: DraftId) {
        self.cache.invalidate(&id).await;
    }
}

impl Default for DraftCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock a draft, recovering the form if a previous holder panicked.
pub fn lock(form: &SharedForm) -> MutexGuard<'_, CustomerForm> {
    form.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_then_get_shares_state() {
        let drafts = DraftCache::new();
        let id = drafts.open(CustomerForm::create()).await;

        let first = drafts.get(id).await.unwrap();
        lock(&first).set_email("asha@example.com");

        let second = drafts.get(id).await.unwrap();
        assert_eq!(lock(&second).email(), "asha@example.com");
    }

    #[tokio::test]
    async fn test_unknown_draft() {
        let drafts = DraftCache::new();
        assert!(drafts.get(DraftId::generate()).await.is_none());
    }

    #[tokio::test]
    async fn test_discard() {
        let drafts = DraftCache::new();
        let id = drafts.open(CustomerForm::create()).await;
        drafts.discard(id).await;
        assert!(drafts.get(id).await.is_none());
    }

    #[test]
    fn test_draft_id_round_trips_through_path_segment() {
        let id = DraftId::generate();
        let parsed: DraftId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }
}
