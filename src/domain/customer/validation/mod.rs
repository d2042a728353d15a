use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::customer::model::Customer;
use crate::store::{CustomerStore, StoreError};

pub mod iban;
pub mod phone;
mod rules;

pub use iban::{BankAccountError, BankAccountScheme, IbanScheme};
pub use phone::{BuiltinNumberingPlan, NumberingPlan, PhoneNumberType};

// ============================================================================
// Customer Validation
// ============================================================================
//
// One linear collect-then-decide pass per call: every field rule runs
// (nothing short-circuits across fields), then the uniqueness check - the
// single suspension point - runs regardless of what the field rules
// found, so format and uniqueness violations can surface together.
//
// ============================================================================

/// A single validation failure, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Violation {
    /// One field failed a structural or format check.
    FieldFormat {
        field: &'static str,
        message: String,
    },
    /// The cross-record identity invariant is violated.
    Uniqueness {
        fields: &'static str,
        message: String,
    },
}

impl Violation {
    pub fn field_format(field: &'static str, message: impl Into<String>) -> Self {
        Self::FieldFormat {
            field,
            message: message.into(),
        }
    }

    pub fn uniqueness(fields: &'static str, message: impl Into<String>) -> Self {
        Self::Uniqueness {
            fields,
            message: message.into(),
        }
    }

    /// The offending field, or field list for uniqueness violations.
    pub fn field(&self) -> &'static str {
        match self {
            Self::FieldFormat { field, .. } => field,
            Self::Uniqueness { fields, .. } => fields,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldFormat { field, message } => write!(f, "{}: {}", field, message),
            Self::Uniqueness { fields, message } => write!(f, "{}: {}", fields, message),
        }
    }
}

/// Why a validation call did not return a customer.
///
/// A rejected candidate is an ordinary outcome and carries the complete
/// violation list; the other variants mean the identity lookup itself
/// failed and nothing can be said about uniqueness.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("customer rejected with {} validation violation(s)", .0.len())]
    Rejected(Vec<Violation>),

    #[error("identity lookup failed")]
    Lookup(#[source] StoreError),

    #[error("identity lookup timed out after {0:?}")]
    LookupTimeout(Duration),
}

impl ValidationError {
    /// The violation list, when the candidate was rejected.
    pub fn violations(&self) -> Option<&[Violation]> {
        match self {
            Self::Rejected(violations) => Some(violations),
            _ => None,
        }
    }
}

/// Knobs for the validator.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Region used to parse phone numbers that are not in
    /// international form.
    pub default_region: String,
    /// Upper bound on the identity lookup. `None` leaves cancellation
    /// entirely to the caller's context.
    pub lookup_timeout: Option<Duration>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            default_region: "US".to_string(),
            lookup_timeout: None,
        }
    }
}

/// Validates customer candidates against the field rules and the
/// cross-record identity invariant.
pub struct CustomerValidator {
    store: Arc<dyn CustomerStore>,
    numbering_plan: Arc<dyn NumberingPlan>,
    bank_account_scheme: Arc<dyn BankAccountScheme>,
    config: ValidatorConfig,
}

impl CustomerValidator {
    /// Validator with the builtin numbering plan and the ISO 13616 scheme.
    pub fn new(store: Arc<dyn CustomerStore>, config: ValidatorConfig) -> Self {
        Self::with_capabilities(
            store,
            Arc::new(BuiltinNumberingPlan),
            Arc::new(IbanScheme),
            config,
        )
    }

    /// Validator with caller-supplied format capabilities.
    pub fn with_capabilities(
        store: Arc<dyn CustomerStore>,
        numbering_plan: Arc<dyn NumberingPlan>,
        bank_account_scheme: Arc<dyn BankAccountScheme>,
        config: ValidatorConfig,
    ) -> Self {
        Self {
            store,
            numbering_plan,
            bank_account_scheme,
            config,
        }
    }

    /// Validate a candidate for creation.
    ///
    /// Any stored customer with the same first name, last name and date
    /// of birth disqualifies the candidate.
    pub async fn validate_for_create(
        &self,
        candidate: Customer,
    ) -> Result<Customer, ValidationError> {
        self.validate(candidate, None).await
    }

    /// Validate a candidate for an update of the record `current_id`.
    ///
    /// The record being updated is compared against itself and excluded
    /// from the uniqueness match.
    pub async fn validate_for_update(
        &self,
        candidate: Customer,
        current_id: Uuid,
    ) -> Result<Customer, ValidationError> {
        self.validate(candidate, Some(current_id)).await
    }

    async fn validate(
        &self,
        candidate: Customer,
        self_id: Option<Uuid>,
    ) -> Result<Customer, ValidationError> {
        let mut violations = self.format_violations(&candidate);
        violations.extend(self.uniqueness_violation(&candidate, self_id).await?);

        if violations.is_empty() {
            Ok(candidate)
        } else {
            tracing::debug!(
                violation_count = violations.len(),
                "candidate rejected by validation"
            );
            Err(ValidationError::Rejected(violations))
        }
    }

    /// Run every field rule and collect everything it finds.
    fn format_violations(&self, candidate: &Customer) -> Vec<Violation> {
        let mut violations = Vec::new();
        violations.extend(rules::first_name(candidate));
        violations.extend(rules::last_name(candidate));
        violations.extend(rules::date_of_birth(candidate));
        violations.extend(rules::email(candidate));
        violations.extend(self.phone_violation(candidate));
        violations.extend(self.bank_account_violation(candidate));
        violations
    }

    fn phone_violation(&self, candidate: &Customer) -> Option<Violation> {
        let parsed = match self
            .numbering_plan
            .parse(candidate.phone_number.as_str(), &self.config.default_region)
        {
            Ok(parsed) => parsed,
            Err(phone::NumberParseError::Empty) => {
                return Some(Violation::field_format(
                    "phoneNumber",
                    "Phone number is required.",
                ));
            }
            Err(_) => {
                return Some(Violation::field_format(
                    "phoneNumber",
                    "Phone number is invalid.",
                ));
            }
        };

        if !parsed.is_valid() {
            return Some(Violation::field_format(
                "phoneNumber",
                "Phone number is invalid.",
            ));
        }
        if !parsed.is_possible() {
            return Some(Violation::field_format(
                "phoneNumber",
                "Phone number is not possible.",
            ));
        }
        // Only numbers a person can be reached on directly qualify
        match parsed.number_type() {
            PhoneNumberType::Mobile | PhoneNumberType::FixedLineOrMobile => None,
            _ => Some(Violation::field_format(
                "phoneNumber",
                "Phone number must be a valid mobile number.",
            )),
        }
    }

    fn bank_account_violation(&self, candidate: &Customer) -> Option<Violation> {
        match self
            .bank_account_scheme
            .validate(candidate.bank_account_number.as_str())
        {
            Ok(()) => None,
            Err(BankAccountError::Empty) => Some(Violation::field_format(
                "bankAccountNumber",
                "Bank account number is required.",
            )),
            Err(_) => Some(Violation::field_format(
                "bankAccountNumber",
                "Invalid bank account number.",
            )),
        }
    }

    /// The one suspension point of a validation pass.
    ///
    /// Check-then-act: the lookup reflects committed state at call time,
    /// and nothing prevents a colliding insert from landing between this
    /// check and the caller's subsequent write. Detection here is
    /// advisory; actual enforcement needs a unique constraint in the
    /// storage layer (the Postgres store's schema carries one).
    async fn uniqueness_violation(
        &self,
        candidate: &Customer,
        self_id: Option<Uuid>,
    ) -> Result<Option<Violation>, ValidationError> {
        // Without a date of birth there is no identity triple to check;
        // the required-field rule already reported the problem.
        let Some(date_of_birth) = candidate.date_of_birth else {
            return Ok(None);
        };

        let lookup = self.store.find_by_name_and_birth_date(
            &candidate.first_name,
            &candidate.last_name,
            date_of_birth,
        );
        let existing = match self.config.lookup_timeout {
            Some(limit) => tokio::time::timeout(limit, lookup)
                .await
                .map_err(|_| ValidationError::LookupTimeout(limit))?,
            None => lookup.await,
        }
        .map_err(ValidationError::Lookup)?;

        Ok(match existing {
            // An update never collides with the record it replaces
            Some(id) if self_id == Some(id) => None,
            Some(_) => Some(Violation::uniqueness(
                "firstName,lastName,dateOfBirth",
                "A customer with the same first name, last name, and date of birth already exists.",
            )),
            None => None,
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::test_support::valid_candidate;
    use crate::domain::customer::value_objects::{BankAccountNumber, Email, PhoneNumber};
    use crate::store::memory::InMemoryCustomerStore;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    fn validator(store: Arc<dyn CustomerStore>) -> CustomerValidator {
        CustomerValidator::new(store, ValidatorConfig::default())
    }

    fn field_violations<'a>(violations: &'a [Violation], field: &str) -> Vec<&'a Violation> {
        violations.iter().filter(|v| v.field() == field).collect()
    }

    #[tokio::test]
    async fn test_valid_candidate_passes_unchanged() {
        let store = Arc::new(InMemoryCustomerStore::new());
        let candidate = valid_candidate();

        let validated = validator(store)
            .validate_for_create(candidate.clone())
            .await
            .unwrap();

        assert_eq!(validated, candidate);
    }

    #[tokio::test]
    async fn test_empty_names_each_produce_their_own_violation() {
        let store = Arc::new(InMemoryCustomerStore::new());
        let mut candidate = valid_candidate();
        candidate.first_name = String::new();
        candidate.last_name = "  ".to_string();

        let err = validator(store)
            .validate_for_create(candidate)
            .await
            .unwrap_err();
        let violations = err.violations().unwrap();

        assert_eq!(field_violations(violations, "firstName").len(), 1);
        assert_eq!(field_violations(violations, "lastName").len(), 1);
    }

    #[tokio::test]
    async fn test_all_field_rules_run_even_when_everything_fails() {
        let store = Arc::new(InMemoryCustomerStore::new());
        let candidate = Customer {
            first_name: String::new(),
            last_name: String::new(),
            date_of_birth: None,
            phone_number: PhoneNumber::new("123"),
            email: Email::new("not-an-email"),
            bank_account_number: BankAccountNumber::new("DE00370400440532013000"),
        };

        let err = validator(store)
            .validate_for_create(candidate)
            .await
            .unwrap_err();
        let violations = err.violations().unwrap();

        for field in [
            "firstName",
            "lastName",
            "dateOfBirth",
            "email",
            "phoneNumber",
            "bankAccountNumber",
        ] {
            assert_eq!(
                field_violations(violations, field).len(),
                1,
                "expected exactly one violation for {}",
                field
            );
        }
    }

    #[tokio::test]
    async fn test_corrupted_iban_rejected() {
        let store = Arc::new(InMemoryCustomerStore::new());
        let mut candidate = valid_candidate();
        candidate.bank_account_number = BankAccountNumber::new("DE00370400440532013000");

        let err = validator(store)
            .validate_for_create(candidate)
            .await
            .unwrap_err();
        let violations = err.violations().unwrap();

        assert_eq!(field_violations(violations, "bankAccountNumber").len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_identity_triple_rejected_on_create() {
        let store = Arc::new(InMemoryCustomerStore::new());
        store.insert(valid_candidate()).await.unwrap();

        let err = validator(store)
            .validate_for_create(valid_candidate())
            .await
            .unwrap_err();
        let violations = err.violations().unwrap();

        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::Uniqueness { .. })));
    }

    #[tokio::test]
    async fn test_update_does_not_collide_with_itself() {
        let store = Arc::new(InMemoryCustomerStore::new());
        let id = store.insert(valid_candidate()).await.unwrap();

        let mut candidate = valid_candidate();
        candidate.email = Email::new("changed@example.com");

        let validated = validator(store)
            .validate_for_update(candidate, id)
            .await
            .unwrap();
        assert_eq!(validated.email.as_str(), "changed@example.com");
    }

    #[tokio::test]
    async fn test_update_still_collides_with_another_record() {
        let store = Arc::new(InMemoryCustomerStore::new());
        store.insert(valid_candidate()).await.unwrap();

        let mut other = valid_candidate();
        other.first_name = "Marie".to_string();
        let other_id = store.insert(other).await.unwrap();

        // Renaming the second record onto the first one's triple
        let err = validator(store)
            .validate_for_update(valid_candidate(), other_id)
            .await
            .unwrap_err();

        assert!(err
            .violations()
            .unwrap()
            .iter()
            .any(|v| matches!(v, Violation::Uniqueness { .. })));
    }

    #[tokio::test]
    async fn test_format_and_uniqueness_violations_surface_together() {
        let store = Arc::new(InMemoryCustomerStore::new());
        store.insert(valid_candidate()).await.unwrap();

        let mut candidate = valid_candidate();
        candidate.email = Email::new("broken");

        let err = validator(store)
            .validate_for_create(candidate)
            .await
            .unwrap_err();
        let violations = err.violations().unwrap();

        assert_eq!(field_violations(violations, "email").len(), 1);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::Uniqueness { .. })));
    }

    #[tokio::test]
    async fn test_validation_is_idempotent_against_an_unchanged_store() {
        let store = Arc::new(InMemoryCustomerStore::new());
        store.insert(valid_candidate()).await.unwrap();
        let validator = validator(store);

        let first = validator.validate_for_create(valid_candidate()).await;
        let second = validator.validate_for_create(valid_candidate()).await;

        let first = first.unwrap_err().violations().unwrap().to_vec();
        let second = second.unwrap_err().violations().unwrap().to_vec();
        assert_eq!(first, second);
    }

    // ------------------------------------------------------------------
    // Substituted capabilities
    // ------------------------------------------------------------------

    struct RejectEverythingPlan;

    impl NumberingPlan for RejectEverythingPlan {
        fn parse(
            &self,
            _input: &str,
            _default_region: &str,
        ) -> Result<phone::ParsedNumber, phone::NumberParseError> {
            Err(phone::NumberParseError::UnknownCountryCode("0".to_string()))
        }
    }

    struct FixedLineOnlyPlan;

    impl NumberingPlan for FixedLineOnlyPlan {
        fn parse(
            &self,
            input: &str,
            _default_region: &str,
        ) -> Result<phone::ParsedNumber, phone::NumberParseError> {
            Ok(phone::ParsedNumber::new(
                44,
                input,
                true,
                true,
                PhoneNumberType::FixedLine,
            ))
        }
    }

    #[tokio::test]
    async fn test_numbering_plan_is_substitutable() {
        let store: Arc<dyn CustomerStore> = Arc::new(InMemoryCustomerStore::new());

        let rejecting = CustomerValidator::with_capabilities(
            store.clone(),
            Arc::new(RejectEverythingPlan),
            Arc::new(IbanScheme),
            ValidatorConfig::default(),
        );
        let err = rejecting
            .validate_for_create(valid_candidate())
            .await
            .unwrap_err();
        assert_eq!(
            field_violations(err.violations().unwrap(), "phoneNumber").len(),
            1
        );

        let fixed_line_only = CustomerValidator::with_capabilities(
            store,
            Arc::new(FixedLineOnlyPlan),
            Arc::new(IbanScheme),
            ValidatorConfig::default(),
        );
        let err = fixed_line_only
            .validate_for_create(valid_candidate())
            .await
            .unwrap_err();
        let violations = err.violations().unwrap();
        assert!(violations
            .iter()
            .any(|v| v.field() == "phoneNumber"
                && v.to_string().contains("valid mobile number")));
    }

    // ------------------------------------------------------------------
    // Lookup failure modes
    // ------------------------------------------------------------------

    struct StalledStore;

    #[async_trait]
    impl CustomerStore for StalledStore {
        async fn insert(&self, _customer: Customer) -> Result<Uuid, StoreError> {
            unimplemented!("not used by this test")
        }

        async fn get(&self, _id: Uuid) -> Result<Option<Customer>, StoreError> {
            unimplemented!("not used by this test")
        }

        async fn update(&self, _id: Uuid, _customer: Customer) -> Result<bool, StoreError> {
            unimplemented!("not used by this test")
        }

        async fn delete(&self, _id: Uuid) -> Result<bool, StoreError> {
            unimplemented!("not used by this test")
        }

        async fn list(&self) -> Result<Vec<crate::domain::customer::CustomerRecord>, StoreError> {
            unimplemented!("not used by this test")
        }

        async fn find_by_name_and_birth_date(
            &self,
            _first_name: &str,
            _last_name: &str,
            _date_of_birth: NaiveDate,
        ) -> Result<Option<Uuid>, StoreError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_lookup_timeout_bounds_the_suspension() {
        let validator = CustomerValidator::new(
            Arc::new(StalledStore),
            ValidatorConfig {
                lookup_timeout: Some(Duration::from_millis(50)),
                ..ValidatorConfig::default()
            },
        );

        let err = validator
            .validate_for_create(valid_candidate())
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::LookupTimeout(_)));
    }
}
