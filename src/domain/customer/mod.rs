// ============================================================================
// Customer Domain
// ============================================================================
//
// Everything customer-specific lives here:
// - Value objects (Email, PhoneNumber, BankAccountNumber)
// - Entity (Customer candidate, CustomerRecord with assigned identity)
// - Validation (field rules, numbering plan, IBAN scheme, orchestrator)
// - Service (create/get/update/delete/list over validator + store)
//
// ============================================================================

pub mod model;
pub mod service;
pub mod validation;
pub mod value_objects;

pub use model::*;
pub use service::*;
pub use validation::{
    BankAccountScheme, CustomerValidator, NumberingPlan, ValidationError, ValidatorConfig,
    Violation,
};
pub use value_objects::*;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use super::model::Customer;
    use super::value_objects::{BankAccountNumber, Email, PhoneNumber};

    /// A candidate that passes every rule under the default configuration.
    pub(crate) fn valid_candidate() -> Customer {
        Customer {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12),
            phone_number: PhoneNumber::new("+14155552671"),
            email: Email::new("jane.doe@example.com"),
            bank_account_number: BankAccountNumber::new("DE89370400440532013000"),
        }
    }
}
