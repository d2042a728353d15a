use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::customer::{Customer, CustomerRecord};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCustomerStore;
pub use postgres::PostgresCustomerStore;

// ============================================================================
// Customer Store
// ============================================================================
//
// The storage collaborator the domain depends on. The validator only ever
// reads through `find_by_name_and_birth_date`; everything else is for the
// service. Identity is assigned here, on insert, and nowhere else.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The storage layer's own unique constraint over
    /// (first name, last name, date of birth) rejected a write. This is
    /// the guarantee that actually closes the validator's check-then-act
    /// window; backends without such a constraint never return it.
    #[error("a customer with the same first name, last name, and date of birth already exists")]
    IdentityConflict,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Persist a new customer and return the identity assigned to it.
    async fn insert(&self, customer: Customer) -> Result<Uuid, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Customer>, StoreError>;

    /// Replace the customer stored under `id`. Returns whether a record
    /// existed to replace.
    async fn update(&self, id: Uuid, customer: Customer) -> Result<bool, StoreError>;

    /// Returns whether a record existed to delete.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn list(&self) -> Result<Vec<CustomerRecord>, StoreError>;

    /// Identity of a committed customer matching exactly on the triple,
    /// if any. Read consistency beyond "latest committed" is not part of
    /// the contract.
    async fn find_by_name_and_birth_date(
        &self,
        first_name: &str,
        last_name: &str,
        date_of_birth: NaiveDate,
    ) -> Result<Option<Uuid>, StoreError>;
}
