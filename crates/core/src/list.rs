//! Customer list view model.

use thiserror::Error;

use crate::customer::Customer;
use crate::store::{CustomerStore, StoreError};
use crate::types::CustomerId;

/// Errors from list operations.
#[derive(Debug, Error)]
pub enum ListError {
    /// No customer with this ID is in the list.
    #[error("customer {0} not found")]
    NotFound(CustomerId),

    /// Persisting the updated list failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The customer list as loaded when the view was mounted.
///
/// The list does not watch the store; it only changes through its own
/// operations.
#[derive(Debug, Clone, Default)]
pub struct CustomerList {
    customers: Vec<Customer>,
}

impl CustomerList {
    /// Load the list from `store`.
    pub async fn mount<S: CustomerStore>(store: &S) -> Self {
        Self {
            customers: store.load().await,
        }
    }

    /// Customers in stored order.
    #[must_use]
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// Returns `true` if there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Find a customer by ID.
    #[must_use]
    pub fn get(&self, id: CustomerId) -> Option<&Customer> {
        self.customers.iter().find(|customer| customer.id == id)
    }

    /// Remove the customer with `id` and persist the remaining list.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::NotFound`] if the ID is not in the list and
    /// [`ListError::Store`] if saving fails. On a save failure the in-memory
    /// list is left unchanged.
    pub async fn delete<S: CustomerStore>(
        &mut self,
        store: &S,
        id: CustomerId,
    ) -> Result<Customer, ListError> {
        let position = self
            .customers
            .iter()
            .position(|customer| customer.id == id)
            .ok_or(ListError::NotFound(id))?;

        let mut remaining = self.customers.clone();
        let removed = remaining.remove(position);
        store.save(&remaining).await?;
        self.customers = remaining;

        tracing::info!(customer_id = %id, position, "Customer deleted");
        Ok(removed)
    }
}

/// Path of the form view for a new customer.
pub const ADD_PATH: &str = "/add";

/// Path of the form view editing `id`.
#[must_use]
pub fn edit_path(id: CustomerId) -> String {
    format!("/edit/{id}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_support::customer;

    #[tokio::test]
    async fn test_mount_reads_store_in_order() {
        let store = MemoryStore::with_customers(vec![
            customer("AAAAA1111A"),
            customer("BBBBB2222B"),
        ]);
        let list = CustomerList::mount(&store).await;
        let pans: Vec<&str> = list.customers().iter().map(|c| c.pan.as_str()).collect();
        assert_eq!(pans, ["AAAAA1111A", "BBBBB2222B"]);
    }

    #[tokio::test]
    async fn test_delete_middle_of_five_shifts_following() {
        let customers: Vec<Customer> = [
            "AAAAA0000A",
            "AAAAA1111A",
            "AAAAA2222A",
            "AAAAA3333A",
            "AAAAA4444A",
        ]
        .into_iter()
        .map(customer)
        .collect();
        let former_third = customers[3].clone();
        let target = customers[2].id;
        let store = MemoryStore::with_customers(customers);

        let mut list = CustomerList::mount(&store).await;
        let removed = list.delete(&store, target).await.unwrap();

        assert_eq!(removed.pan.as_str(), "AAAAA2222A");
        let stored = store.snapshot();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[2], former_third);
        assert_eq!(list.customers(), stored.as_slice());
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let store = MemoryStore::with_customers(vec![customer("AAAAA1111A")]);
        let mut list = CustomerList::mount(&store).await;

        let err = list
            .delete(&store, CustomerId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, ListError::NotFound(_)));
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_list_ignores_external_changes_until_remounted() {
        let store = MemoryStore::new();
        let list = CustomerList::mount(&store).await;
        store.save(&[customer("AAAAA1111A")]).await.unwrap();

        assert!(list.is_empty());
        assert_eq!(CustomerList::mount(&store).await.customers().len(), 1);
    }

    #[test]
    fn test_edit_path() {
        let id = CustomerId::generate();
        assert_eq!(edit_path(id), format!("/edit/{id}"));
    }
}
