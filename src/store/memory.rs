use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CustomerStore, StoreError};
use crate::domain::customer::{Customer, CustomerRecord};

// ============================================================================
// In-Memory Customer Store
// ============================================================================

/// Map-backed store for the demo binary and for tests.
///
/// Carries NO unique constraint over the identity triple: a colliding
/// insert that slips past the validator's advisory check is accepted, as
/// it would be by any backend without such a constraint.
#[derive(Debug, Default)]
pub struct InMemoryCustomerStore {
    customers: RwLock<HashMap<Uuid, Customer>>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn insert(&self, customer: Customer) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        self.customers.write().await.insert(id, customer);
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Customer>, StoreError> {
        Ok(self.customers.read().await.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, customer: Customer) -> Result<bool, StoreError> {
        let mut customers = self.customers.write().await;
        if !customers.contains_key(&id) {
            return Ok(false);
        }
        customers.insert(id, customer);
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.customers.write().await.remove(&id).is_some())
    }

    async fn list(&self) -> Result<Vec<CustomerRecord>, StoreError> {
        let customers = self.customers.read().await;
        let mut records: Vec<CustomerRecord> = customers
            .iter()
            .map(|(id, customer)| CustomerRecord {
                id: *id,
                customer: customer.clone(),
            })
            .collect();
        records.sort_by_key(|record| record.id);
        Ok(records)
    }

    async fn find_by_name_and_birth_date(
        &self,
        first_name: &str,
        last_name: &str,
        date_of_birth: NaiveDate,
    ) -> Result<Option<Uuid>, StoreError> {
        let customers = self.customers.read().await;
        let found = customers.iter().find(|(_, customer)| {
            customer.first_name == first_name
                && customer.last_name == last_name
                && customer.date_of_birth == Some(date_of_birth)
        });
        Ok(found.map(|(id, _)| *id))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::test_support::valid_candidate;

    #[tokio::test]
    async fn test_insert_assigns_distinct_identities() {
        let store = InMemoryCustomerStore::new();

        let first = store.insert(valid_candidate()).await.unwrap();
        let second = store.insert(valid_candidate()).await.unwrap();

        assert_ne!(first, second);
        assert!(store.get(first).await.unwrap().is_some());
        assert!(store.get(second).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_by_identity_triple() {
        let store = InMemoryCustomerStore::new();
        let candidate = valid_candidate();
        let id = store.insert(candidate.clone()).await.unwrap();

        let dob = candidate.date_of_birth.unwrap();
        let found = store
            .find_by_name_and_birth_date(&candidate.first_name, &candidate.last_name, dob)
            .await
            .unwrap();
        assert_eq!(found, Some(id));

        let missed = store
            .find_by_name_and_birth_date("Nobody", &candidate.last_name, dob)
            .await
            .unwrap();
        assert_eq!(missed, None);
    }

    #[tokio::test]
    async fn test_update_and_delete_report_existence() {
        let store = InMemoryCustomerStore::new();
        let id = store.insert(valid_candidate()).await.unwrap();

        assert!(store.update(id, valid_candidate()).await.unwrap());
        assert!(!store.update(Uuid::new_v4(), valid_candidate()).await.unwrap());

        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
        assert!(store.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_ordered_and_complete() {
        let store = InMemoryCustomerStore::new();
        let mut ids = vec![
            store.insert(valid_candidate()).await.unwrap(),
            store.insert(valid_candidate()).await.unwrap(),
            store.insert(valid_candidate()).await.unwrap(),
        ];
        ids.sort();

        let records = store.list().await.unwrap();
        let listed: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        assert_eq!(listed, ids);
    }
}
