//! Customer store commands.
//!
//! # Usage
//!
//! ```bash
//! # List every stored customer
//! registry-cli list
//!
//! # Show one customer with all addresses
//! registry-cli show 0b7c3c52-4c0e-4f55-9a8e-1d2f5a9c6e11
//!
//! # Delete one customer
//! registry-cli delete 0b7c3c52-4c0e-4f55-9a8e-1d2f5a9c6e11
//! ```
//!
//! # Environment Variables
//!
//! - `REGISTRY_DATA_DIR` - Directory holding `customers.json` (default: data)

use customer_registry_core::{Customer, CustomerId, CustomerList, CustomerStore, ListError};
use customer_registry_web::config::{ConfigError, RegistryConfig};
use customer_registry_web::storage::JsonFileStore;
use thiserror::Error;

/// Errors that can occur during customer commands.
#[derive(Debug, Error)]
pub enum CustomersError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The argument is not a customer ID.
    #[error("Invalid customer ID: {0}")]
    InvalidId(String),

    /// No stored customer has this ID.
    #[error("Customer not found: {0}")]
    NotFound(CustomerId),

    /// Deleting failed.
    #[error("Store error: {0}")]
    List(#[source] ListError),
}

impl From<ListError> for CustomersError {
    fn from(err: ListError) -> Self {
        match err {
            ListError::NotFound(id) => Self::NotFound(id),
            other => Self::List(other),
        }
    }
}

/// Open the store the web app uses.
pub fn open_store() -> Result<JsonFileStore, CustomersError> {
    let config = RegistryConfig::from_env()?;
    tracing::debug!(data_dir = %config.data_dir.display(), "Opening customer store");
    Ok(JsonFileStore::new(&config.data_dir))
}

fn parse_id(raw: &str) -> Result<CustomerId, CustomersError> {
    raw.parse()
        .map_err(|_| CustomersError::InvalidId(raw.to_owned()))
}

/// One-line summary used by `list`.
#[must_use]
pub fn summary(customer: &Customer) -> String {
    format!(
        "{}  {}  {}  {}  {}",
        customer.id, customer.pan, customer.full_name, customer.email, customer.mobile
    )
}

/// All stored customers, in stored order.
pub async fn list<S: CustomerStore>(store: &S) -> Vec<Customer> {
    CustomerList::mount(store).await.customers().to_vec()
}

/// Find one customer.
pub async fn show<S: CustomerStore>(store: &S, id: &str) -> Result<Customer, CustomersError> {
    let id = parse_id(id)?;
    let list = CustomerList::mount(store).await;
    list.get(id).cloned().ok_or(CustomersError::NotFound(id))
}

/// Delete one customer and return it.
pub async fn delete<S: CustomerStore>(store: &S, id: &str) -> Result<Customer, CustomersError> {
    let id = parse_id(id)?;
    let mut list = CustomerList::mount(store).await;
    Ok(list.delete(store, id).await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use customer_registry_core::{Address, MemoryStore, Mobile, Pan};

    fn customer(pan: &str) -> Customer {
        Customer {
            id: CustomerId::generate(),
            pan: Pan::parse(pan).unwrap(),
            full_name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            mobile: Mobile::parse("+919876543210").unwrap(),
            addresses: vec![Address::default()],
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_list_keeps_order() {
        let customers = vec![customer("AAAAA1111A"), customer("BBBBB2222B")];
        let store = MemoryStore::with_customers(customers.clone());

        assert_eq!(list(&store).await, customers);
    }

    #[test]
    fn test_summary_contains_fields() {
        let customer = customer("AAAAA1111A");
        let line = summary(&customer);
        assert!(line.starts_with(&customer.id.to_string()));
        assert!(line.contains("AAAAA1111A"));
        assert!(line.contains("+919876543210"));
    }

    #[tokio::test]
    async fn test_show_unknown_and_invalid_ids() {
        let store = MemoryStore::with_customers(vec![customer("AAAAA1111A")]);

        let unknown = CustomerId::generate();
        assert!(matches!(
            show(&store, &unknown.to_string()).await,
            Err(CustomersError::NotFound(id)) if id == unknown
        ));
        assert!(matches!(
            show(&store, "7").await,
            Err(CustomersError::InvalidId(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_only_that_customer() {
        let customers = vec![customer("AAAAA1111A"), customer("BBBBB2222B")];
        let store = MemoryStore::with_customers(customers.clone());

        let removed = delete(&store, &customers[0].id.to_string()).await.unwrap();

        assert_eq!(removed, customers[0]);
        assert_eq!(store.snapshot(), vec![customers[1].clone()]);
    }
}
