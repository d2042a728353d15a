use serde::{Deserialize, Serialize};

// ============================================================================
// Customer Value Objects
// ============================================================================
//
// Thin wrappers around the raw field text. Constructors do NOT validate;
// the rules in `validation` are the single place format checks live, so a
// candidate can always be built from request input and every problem
// reported in one pass.
//
// ============================================================================

/// Customer email address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email(pub String);

impl Email {
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Customer phone number, exactly as entered by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumber(pub String);

impl PhoneNumber {
    pub fn new(phone: impl Into<String>) -> Self {
        Self(phone.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Customer bank account number (IBAN)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankAccountNumber(pub String);

impl BankAccountNumber {
    pub fn new(account: impl Into<String>) -> Self {
        Self(account.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
