//! Record store contract.
//!
//! The whole customer collection is read and written as one value. There are
//! no partial updates: callers load, change the sequence, then save it back.

use std::future::Future;
use std::sync::RwLock;

use thiserror::Error;

use crate::customer::Customer;

/// Storage key the customer collection lives under.
pub const CUSTOMERS_KEY: &str = "customers";

/// Errors that can occur when writing the collection.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem or other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The collection could not be encoded.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The backing store is unusable (for example a poisoned lock).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for the ordered customer collection.
pub trait CustomerStore: Send + Sync {
    /// Read the full collection.
    ///
    /// Returns an empty collection when nothing has been stored yet or the
    /// stored value cannot be parsed.
    fn load(&self) -> impl Future<Output = Vec<Customer>> + Send;

    /// Replace the full collection.
    fn save(&self, customers: &[Customer]) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// In-memory store, used by tests and as a scratch store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    customers: RwLock<Vec<Customer>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `customers`.
    #[must_use]
    pub fn with_customers(customers: Vec<Customer>) -> Self {
        Self {
            customers: RwLock::new(customers),
        }
    }

    /// Snapshot of the stored collection.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Customer> {
        self.customers
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl CustomerStore for MemoryStore {
    async fn load(&self) -> Vec<Customer> {
        self.snapshot()
    }

    async fn save(&self, customers: &[Customer]) -> Result<(), StoreError> {
        let mut guard = self
            .customers
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        *guard = customers.to_vec();
        Ok(())
    }
}
