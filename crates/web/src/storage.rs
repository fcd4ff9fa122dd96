//! JSON file store for the customer collection.
//!
//! Mimics browser local storage: a directory of keys, one `<key>.json` file
//! per key, each holding one JSON value. The registry only uses the
//! `customers` key.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use customer_registry_core::{CUSTOMERS_KEY, Customer, CustomerStore, StoreError};
use tokio::sync::Mutex;

/// Customer store backed by `<dir>/<key>.json`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

/// Result of decoding the stored value.
struct Decoded {
    customers: Vec<Customer>,
    /// Records that had no `id` and were given a fresh one.
    assigned_ids: usize,
}

impl JsonFileStore {
    /// Store the customer collection under `dir`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_key(dir, CUSTOMERS_KEY)
    }

    /// Store under an explicit key.
    #[must_use]
    pub fn with_key(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{key}.json")),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Option<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Some(text),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read customer store");
                None
            }
        }
    }
}

/// Decode the stored text, treating `null` like a missing key.
fn decode(text: &str) -> Result<Decoded, serde_json::Error> {
    let Some(values) = serde_json::from_str::<Option<Vec<serde_json::Value>>>(text)? else {
        return Ok(Decoded {
            customers: Vec::new(),
            assigned_ids: 0,
        });
    };

    let assigned_ids = values.iter().filter(|value| value.get("id").is_none()).count();
    let customers = values
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<Customer>, _>>()?;

    Ok(Decoded {
        customers,
        assigned_ids,
    })
}

impl CustomerStore for JsonFileStore {
    async fn load(&self) -> Vec<Customer> {
        let Some(text) = self.read().await else {
            return Vec::new();
        };

        let decoded = match decode(&text) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Customer store is malformed, treating as empty");
                return Vec::new();
            }
        };

        // Records from before IDs existed get one now; write it back so the
        // next load sees the same ID.
        if decoded.assigned_ids > 0 {
            match self.save(&decoded.customers).await {
                Ok(()) => tracing::info!(
                    count = decoded.assigned_ids,
                    "Assigned IDs to customers stored without one"
                ),
                Err(e) => tracing::warn!(error = %e, "Failed to persist assigned customer IDs"),
            }
        }

        decoded.customers
    }

    async fn save(&self, customers: &[Customer]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(customers)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), count = customers.len(), "Customer store written");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use customer_registry_core::{Address, CustomerId, Mobile, Pan};

    fn customer(pan: &str) -> Customer {
        Customer {
            id: CustomerId::generate(),
            pan: Pan::parse(pan).unwrap(),
            full_name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            mobile: Mobile::parse("+919876543210").unwrap(),
            addresses: vec![Address {
                address_line1: "12 MG Road".to_string(),
                address_line2: String::new(),
                postcode: "411001".to_string(),
                city: "Pune".to_string(),
                state: "Maharashtra".to_string(),
            }],
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));
        let customers = vec![customer("AAAAA1111A"), customer("BBBBB2222B")];

        store.save(&customers).await.unwrap();

        assert_eq!(store.load().await, customers);
        assert!(store.path().ends_with("nested/customers.json"));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_malformed_content_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(store.path(), "{not json").unwrap();

        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_record_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(
            store.path(),
            r#"[{"pan":"SHORT","fullName":"x","email":"","mobile":"+919876543210","addresses":[]}]"#,
        )
        .unwrap();

        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_null_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(store.path(), "null").unwrap();

        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_records_without_id_get_a_stable_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(
            store.path(),
            r#"[{
                "pan": "ABCDE1234Z",
                "fullName": "Asha Rao",
                "email": "asha@example.com",
                "mobile": "+919876543210",
                "addresses": [{"addressLine1": "12 MG Road", "addressLine2": "", "postcode": "411001", "city": "Pune", "state": "Maharashtra"}]
            }]"#,
        )
        .unwrap();

        let first = store.load().await;
        let second = store.load().await;
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, second[0].id);
    }

    #[tokio::test]
    async fn test_with_key_uses_separate_file() {
        let dir = tempfile::tempdir().unwrap();
        let customers = JsonFileStore::new(dir.path());
        let archive = JsonFileStore::with_key(dir.path(), "archive");

        archive.save(&[customer("AAAAA1111A")]).await.unwrap();

        assert!(customers.load().await.is_empty());
        assert_eq!(archive.load().await.len(), 1);
    }
}
