use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use super::{CustomerStore, StoreError};
use crate::domain::customer::{
    BankAccountNumber, Customer, CustomerRecord, Email, PhoneNumber,
};

// ============================================================================
// Postgres Customer Store
// ============================================================================
//
// Unlike the validator's advisory lookup, the unique index created by
// `ensure_schema` makes the identity-triple invariant hold under
// concurrent writers: a colliding write loses the race at commit time and
// surfaces as `StoreError::IdentityConflict`.
//
// ============================================================================

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS customers (
    id UUID PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    date_of_birth DATE NOT NULL,
    phone_number TEXT NOT NULL,
    email TEXT NOT NULL,
    bank_account_number TEXT NOT NULL
)";

const CREATE_IDENTITY_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS customers_identity_key
    ON customers (first_name, last_name, date_of_birth)";

pub struct PostgresCustomerStore {
    pool: PgPool,
}

impl PostgresCustomerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(url).await?;
        Ok(Self::new(pool))
    }

    /// Create the customers table and the unique identity index.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_IDENTITY_INDEX).execute(&self.pool).await?;

        tracing::debug!("customer schema ensured");
        Ok(())
    }

    fn map_write_error(error: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(db_error) = &error {
            if db_error.is_unique_violation() {
                return StoreError::IdentityConflict;
            }
        }
        StoreError::Database(error)
    }
}

type CustomerRow = (String, String, NaiveDate, String, String, String);

fn customer_from_row(row: CustomerRow) -> Customer {
    let (first_name, last_name, date_of_birth, phone_number, email, bank_account_number) = row;
    Customer {
        first_name,
        last_name,
        date_of_birth: Some(date_of_birth),
        phone_number: PhoneNumber::new(phone_number),
        email: Email::new(email),
        bank_account_number: BankAccountNumber::new(bank_account_number),
    }
}

#[async_trait]
impl CustomerStore for PostgresCustomerStore {
    async fn insert(&self, customer: Customer) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO customers (
                id, first_name, last_name, date_of_birth,
                phone_number, email, bank_account_number
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id)
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(customer.date_of_birth)
        .bind(customer.phone_number.as_str())
        .bind(customer.email.as_str())
        .bind(customer.bank_account_number.as_str())
        .execute(&self.pool)
        .await
        .map_err(Self::map_write_error)?;

        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Customer>, StoreError> {
        let row: Option<CustomerRow> = sqlx::query_as(
            "SELECT first_name, last_name, date_of_birth,
                    phone_number, email, bank_account_number
             FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(customer_from_row))
    }

    async fn update(&self, id: Uuid, customer: Customer) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE customers SET
                first_name = $1, last_name = $2, date_of_birth = $3,
                phone_number = $4, email = $5, bank_account_number = $6
             WHERE id = $7",
        )
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(customer.date_of_birth)
        .bind(customer.phone_number.as_str())
        .bind(customer.email.as_str())
        .bind(customer.bank_account_number.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Self::map_write_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<CustomerRecord>, StoreError> {
        let rows: Vec<(Uuid, String, String, NaiveDate, String, String, String)> =
            sqlx::query_as(
                "SELECT id, first_name, last_name, date_of_birth,
                        phone_number, email, bank_account_number
                 FROM customers ORDER BY id",
            )
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, first_name, last_name, date_of_birth, phone, email, account)| {
                CustomerRecord {
                    id,
                    customer: customer_from_row((
                        first_name,
                        last_name,
                        date_of_birth,
                        phone,
                        email,
                        account,
                    )),
                }
            })
            .collect())
    }

    async fn find_by_name_and_birth_date(
        &self,
        first_name: &str,
        last_name: &str,
        date_of_birth: NaiveDate,
    ) -> Result<Option<Uuid>, StoreError> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM customers
             WHERE first_name = $1 AND last_name = $2 AND date_of_birth = $3
             LIMIT 1",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(date_of_birth)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id,)| id))
    }
}
