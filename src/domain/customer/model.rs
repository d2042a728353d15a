use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{BankAccountNumber, Email, PhoneNumber};

// ============================================================================
// Customer Entity
// ============================================================================

/// A customer as supplied by the caller of create/update.
///
/// The date of birth is optional here so that a request missing it can
/// still be built and reported as a validation violation instead of
/// failing construction. A customer that passed validation always has it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: PhoneNumber,
    pub email: Email,
    pub bank_account_number: BankAccountNumber,
}

/// A persisted customer together with its store-assigned identity.
///
/// Identity is opaque and chosen by the storage layer on insert; nothing
/// in the domain ever computes or reuses one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub customer: Customer,
}
