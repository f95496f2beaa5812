use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use billforge_core::{Clock, CustomerId, DomainError, position_of};
use billforge_storage::{PersistedState, StateStore, StorageError};

use crate::customer::Customer;

/// Persisted directory document: every customer, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerBook {
    pub customers: Vec<Customer>,
}

impl PersistedState for CustomerBook {
    const KIND: &'static str = "customers";

    /// Legacy layout: a bare array of customer objects.
    fn from_legacy(value: Value) -> Result<Self, serde_json::Error> {
        Ok(CustomerBook {
            customers: serde_json::from_value(value)?,
        })
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Keyed store of customer master records.
///
/// Mutations hold the store's document lock and persist the whole book before
/// returning, so directories opened on the same file see each other's writes.
/// Reads load the last persisted book.
pub struct CustomerDirectory<S> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S> CustomerDirectory<S>
where
    S: StateStore<CustomerBook>,
{
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn load_book(&self) -> Result<CustomerBook, StorageError> {
        Ok(self.store.load()?.unwrap_or_default())
    }

    /// Insert a new customer or replace the record with the same id.
    ///
    /// `last_modified` is always refreshed. `created_date` is kept from the
    /// existing record on replace and stamped on insert when the caller left it
    /// empty. Returns the record as stored.
    pub fn upsert(&self, mut customer: Customer) -> Result<Customer, DirectoryError> {
        customer.validate()?;

        let _guard = self.store.lock()?;

        let mut book = self.load_book()?;
        let now = self.clock.now();
        customer.last_modified = Some(now);

        match position_of(&book.customers, &customer.customer_id) {
            Some(idx) => {
                let existing = &book.customers[idx];
                customer.created_date = existing.created_date.or(customer.created_date);
                book.customers[idx] = customer.clone();
                self.store.save(&book)?;
                tracing::info!(customer_id = %customer.customer_id, "customer updated");
            }
            None => {
                customer.created_date.get_or_insert(now);
                book.customers.push(customer.clone());
                self.store.save(&book)?;
                tracing::info!(customer_id = %customer.customer_id, "customer added");
            }
        }

        Ok(customer)
    }

    pub fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, DirectoryError> {
        let book = self.load_book()?;
        Ok(book.customers.into_iter().find(|c| &c.customer_id == id))
    }

    /// All customers in insertion order.
    pub fn list(&self) -> Result<Vec<Customer>, DirectoryError> {
        Ok(self.load_book()?.customers)
    }

    /// Customers with any field containing `text` (case-insensitive). A blank
    /// query lists everyone.
    pub fn search(&self, text: &str) -> Result<Vec<Customer>, DirectoryError> {
        let text = text.trim();
        let customers = self.load_book()?.customers;
        if text.is_empty() {
            return Ok(customers);
        }
        Ok(customers.into_iter().filter(|c| c.matches(text)).collect())
    }

    /// Delete unconditionally. Ledger history keeps its own snapshot of the
    /// customer, so nothing else is checked. Returns whether a record existed.
    pub fn remove(&self, id: &CustomerId) -> Result<bool, DirectoryError> {
        let _guard = self.store.lock()?;

        let mut book = self.load_book()?;
        let Some(idx) = position_of(&book.customers, id) else {
            tracing::debug!(customer_id = %id, "remove: customer not present");
            return Ok(false);
        };
        book.customers.remove(idx);
        self.store.save(&book)?;
        tracing::info!(customer_id = %id, "customer removed");
        Ok(true)
    }
}
