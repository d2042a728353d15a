use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod domain;
mod store;

use domain::customer::{
    BankAccountNumber, Customer, CustomerService, CustomerValidator, Email, PhoneNumber,
    ServiceError, ValidationError, ValidatorConfig,
};
use store::{CustomerStore, InMemoryCustomerStore, PostgresCustomerStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging with environment-based filtering.
    // Default to INFO, override with RUST_LOG (e.g. RUST_LOG=debug).
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,customer_registry=debug")),
        )
        .init();

    tracing::info!("🚀 Starting customer registry");

    // === 1. Pick a store ===
    // Postgres when DATABASE_URL is set, in-memory otherwise. Only the
    // Postgres schema enforces the identity triple under concurrency.
    let store: Arc<dyn CustomerStore> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            tracing::info!("Connecting to Postgres...");
            let postgres = PostgresCustomerStore::connect(&url).await?;
            postgres.ensure_schema().await?;
            Arc::new(postgres)
        }
        Err(_) => {
            tracing::info!("DATABASE_URL not set, using the in-memory store");
            Arc::new(InMemoryCustomerStore::new())
        }
    };

    // === 2. Wire validator and service ===
    let default_region =
        std::env::var("DEFAULT_REGION").unwrap_or_else(|_| "US".to_string());
    tracing::info!(region = %default_region, "Phone numbers parsed under default region");

    let config = ValidatorConfig {
        default_region,
        lookup_timeout: Some(Duration::from_secs(5)),
    };
    let validator = CustomerValidator::new(store.clone(), config);
    let service = CustomerService::new(store, validator);

    // === 3. Demonstrate the customer lifecycle ===
    let candidate = Customer {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12),
        phone_number: PhoneNumber::new("+14155552671"),
        email: Email::new("jane.doe@example.com"),
        bank_account_number: BankAccountNumber::new("DE89370400440532013000"),
    };

    let id = service.create(candidate.clone()).await?;
    tracing::info!(customer_id = %id, "✅ Customer created");

    // A second candidate with the same name and birth date must bounce
    match service.create(candidate.clone()).await {
        Err(ServiceError::Validation(ValidationError::Rejected(violations))) => {
            for violation in &violations {
                tracing::warn!(violation = %violation, "Duplicate rejected");
            }
        }
        Ok(other) => tracing::error!(customer_id = %other, "Duplicate was accepted"),
        Err(error) => return Err(error.into()),
    }

    // Updating the record itself is not a collision
    let mut updated = candidate;
    updated.phone_number = PhoneNumber::new("+14155550123");
    service.update(id, updated).await?;
    tracing::info!(customer_id = %id, "✅ Customer updated");

    let records = service.list().await?;
    tracing::info!(count = records.len(), "Registry contents");
    for record in &records {
        tracing::info!(
            customer_id = %record.id,
            customer = %serde_json::to_string(&record.customer)?,
            "Registered customer"
        );
    }

    service.delete(id).await?;
    tracing::info!(customer_id = %id, "✅ Customer deleted");

    Ok(())
}
