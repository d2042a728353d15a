use std::sync::LazyLock;

use regex::Regex;

use super::Violation;
use crate::domain::customer::model::Customer;

// ============================================================================
// Field Rules
// ============================================================================
//
// Each rule is a pure predicate over the candidate: `&Customer ->
// Option<Violation>`. The orchestrator runs every one of them; a rule
// never looks at another field and never short-circuits its neighbours.
//
// ============================================================================

// Practical address grammar: local part, "@", dotted domain with a
// two-letter-or-longer top level. Compiled once.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
        .expect("email pattern is a valid regex")
});

pub(super) fn first_name(customer: &Customer) -> Option<Violation> {
    if customer.first_name.trim().is_empty() {
        return Some(Violation::field_format(
            "firstName",
            "First name is required.",
        ));
    }
    None
}

pub(super) fn last_name(customer: &Customer) -> Option<Violation> {
    if customer.last_name.trim().is_empty() {
        return Some(Violation::field_format("lastName", "Last name is required."));
    }
    None
}

pub(super) fn date_of_birth(customer: &Customer) -> Option<Violation> {
    if customer.date_of_birth.is_none() {
        return Some(Violation::field_format(
            "dateOfBirth",
            "Date of birth is required.",
        ));
    }
    None
}

pub(super) fn email(customer: &Customer) -> Option<Violation> {
    let address = customer.email.as_str().trim();
    if address.is_empty() {
        return Some(Violation::field_format("email", "Email is required."));
    }
    if !EMAIL_RE.is_match(address) {
        return Some(Violation::field_format(
            "email",
            "Email must be a valid email address.",
        ));
    }
    None
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::test_support::valid_candidate;

    #[test]
    fn test_names_must_be_non_empty_after_trimming() {
        let mut customer = valid_candidate();
        customer.first_name = "   ".to_string();
        customer.last_name = String::new();

        assert!(first_name(&customer).is_some());
        assert!(last_name(&customer).is_some());
    }

    #[test]
    fn test_date_of_birth_must_be_present() {
        let mut customer = valid_candidate();
        assert!(date_of_birth(&customer).is_none());

        customer.date_of_birth = None;
        assert!(date_of_birth(&customer).is_some());
    }

    #[test]
    fn test_email_accepts_common_addresses() {
        let mut customer = valid_candidate();
        for address in [
            "jane.doe@example.com",
            "jane+tag@mail.example.co.uk",
            "j_d%x-1@sub.example.org",
        ] {
            customer.email = crate::domain::customer::Email::new(address);
            assert!(email(&customer).is_none(), "rejected {}", address);
        }
    }

    #[test]
    fn test_email_rejects_malformed_addresses() {
        let mut customer = valid_candidate();
        for address in ["", "plainaddress", "missing@tld", "two@@example.com", "@example.com"] {
            customer.email = crate::domain::customer::Email::new(address);
            assert!(email(&customer).is_some(), "accepted {:?}", address);
        }
    }
}
