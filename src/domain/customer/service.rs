use std::sync::Arc;

use uuid::Uuid;

use super::model::{Customer, CustomerRecord};
use super::validation::{CustomerValidator, ValidationError};
use crate::store::{CustomerStore, StoreError};

// ============================================================================
// Customer Service
// ============================================================================
//
// Orchestrates: candidate -> validation -> store. The service owns the
// existence checks (NotFound); the validator never produces those.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("customer {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct CustomerService {
    store: Arc<dyn CustomerStore>,
    validator: CustomerValidator,
}

impl CustomerService {
    pub fn new(store: Arc<dyn CustomerStore>, validator: CustomerValidator) -> Self {
        Self { store, validator }
    }

    /// Validate and persist a new customer, returning the identity the
    /// store assigned to it.
    pub async fn create(&self, candidate: Customer) -> Result<Uuid, ServiceError> {
        let customer = self.validator.validate_for_create(candidate).await?;
        let id = self.store.insert(customer).await?;

        tracing::info!(customer_id = %id, "customer created");
        Ok(id)
    }

    pub async fn get(&self, id: Uuid) -> Result<Customer, ServiceError> {
        self.store
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Validate and persist a replacement for an existing customer.
    ///
    /// The target must exist before anything is validated; the record
    /// keeps its identity and is excluded from its own uniqueness match.
    pub async fn update(&self, id: Uuid, candidate: Customer) -> Result<(), ServiceError> {
        if self.store.get(id).await?.is_none() {
            return Err(ServiceError::NotFound(id));
        }

        let customer = self.validator.validate_for_update(candidate, id).await?;
        if !self.store.update(id, customer).await? {
            // Deleted between the existence check and the write
            return Err(ServiceError::NotFound(id));
        }

        tracing::info!(customer_id = %id, "customer updated");
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        if !self.store.delete(id).await? {
            return Err(ServiceError::NotFound(id));
        }

        tracing::info!(customer_id = %id, "customer deleted");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<CustomerRecord>, ServiceError> {
        Ok(self.store.list().await?)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::test_support::valid_candidate;
    use crate::domain::customer::validation::{ValidatorConfig, Violation};
    use crate::domain::customer::value_objects::PhoneNumber;
    use crate::store::memory::InMemoryCustomerStore;

    fn service() -> CustomerService {
        let store: Arc<dyn CustomerStore> = Arc::new(InMemoryCustomerStore::new());
        let validator = CustomerValidator::new(store.clone(), ValidatorConfig::default());
        CustomerService::new(store, validator)
    }

    #[tokio::test]
    async fn test_create_then_get_roundtrip() {
        let service = service();
        let candidate = valid_candidate();

        let id = service.create(candidate.clone()).await.unwrap();
        let stored = service.get(id).await.unwrap();

        assert_eq!(stored, candidate);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_identity() {
        let service = service();
        service.create(valid_candidate()).await.unwrap();

        let err = service.create(valid_candidate()).await.unwrap_err();
        match err {
            ServiceError::Validation(validation) => {
                assert!(validation
                    .violations()
                    .unwrap()
                    .iter()
                    .any(|v| matches!(v, Violation::Uniqueness { .. })));
            }
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_replaces_the_record() {
        let service = service();
        let id = service.create(valid_candidate()).await.unwrap();

        let mut replacement = valid_candidate();
        replacement.phone_number = PhoneNumber::new("+14155550123");
        service.update(id, replacement.clone()).await.unwrap();

        assert_eq!(service.get(id).await.unwrap(), replacement);
    }

    #[tokio::test]
    async fn test_update_of_unknown_id_is_not_found() {
        let service = service();
        let err = service
            .update(Uuid::new_v4(), valid_candidate())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_the_record() {
        let service = service();
        let id = service.create(valid_candidate()).await.unwrap();

        service.delete(id).await.unwrap();

        assert!(matches!(
            service.get(id).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            service.delete(id).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_list_returns_every_record_with_its_identity() {
        let service = service();
        let first = service.create(valid_candidate()).await.unwrap();

        let mut other = valid_candidate();
        other.first_name = "Marie".to_string();
        let second = service.create(other).await.unwrap();

        let records = service.list().await.unwrap();
        let mut ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        ids.sort();

        let mut expected = vec![first, second];
        expected.sort();
        assert_eq!(ids, expected);
    }
}
