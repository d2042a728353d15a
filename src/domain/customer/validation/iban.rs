// ============================================================================
// Bank Account Number Validation (ISO 13616 IBAN)
// ============================================================================
//
// Structure checks first (country code, check digits, alphabet, registry
// length), then the ISO 7064 MOD 97-10 checksum: move the first four
// characters to the end, remap A-Z to 10-35, and the whole number must
// leave remainder 1 modulo 97.
//
// ============================================================================

/// Shortest registered IBAN (Norway).
const MIN_LEN: usize = 15;
/// Longest IBAN permitted by ISO 13616.
const MAX_LEN: usize = 34;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BankAccountError {
    #[error("bank account number is empty")]
    Empty,

    #[error("IBAN must be between 15 and 34 characters (found {0})")]
    Length(usize),

    #[error("IBAN may only contain letters and digits")]
    Alphabet,

    #[error("IBAN must start with a two-letter country code followed by two check digits")]
    Prefix,

    #[error("unknown IBAN country code {0}")]
    UnknownCountry(String),

    #[error("IBAN for {country} must be {expected} characters (found {found})")]
    CountryLength {
        country: String,
        expected: usize,
        found: usize,
    },

    #[error("IBAN check digits do not match")]
    Checksum,
}

/// Bank-account format check as a capability the validator is handed,
/// so tests can substitute a deterministic stand-in for the real registry.
pub trait BankAccountScheme: Send + Sync {
    fn validate(&self, account_number: &str) -> Result<(), BankAccountError>;
}

/// The production scheme: ISO 13616 with the published per-country lengths.
#[derive(Debug, Clone, Copy, Default)]
pub struct IbanScheme;

impl IbanScheme {
    /// Registered IBAN length for a country code, grouped by length.
    ///
    /// Returns `None` for country codes outside the registry; those are
    /// rejected outright since their length cannot be verified.
    fn registry_length(country: &str) -> Option<usize> {
        let expected = match country {
            "NO" => 15,
            "BE" => 16,
            "DK" | "FI" | "FO" | "GL" | "NL" => 18,
            "MK" | "SI" => 19,
            "AT" | "BA" | "EE" | "KZ" | "LT" | "LU" | "XK" => 20,
            "CH" | "HR" | "LI" | "LV" => 21,
            "BG" | "BH" | "CR" | "DE" | "GB" | "GE" | "IE" | "ME" | "RS" | "VA" => 22,
            "AE" | "GI" | "IL" | "IQ" => 23,
            "AD" | "CZ" | "ES" | "MD" | "PK" | "RO" | "SA" | "SE" | "SK" | "TN" | "VG" => 24,
            "PT" | "ST" => 25,
            "IS" | "TR" => 26,
            "FR" | "GR" | "IT" | "MC" | "MR" | "SM" => 27,
            "AL" | "AZ" | "BY" | "CY" | "DO" | "GT" | "HU" | "LB" | "PL" => 28,
            "BR" | "EG" | "PS" | "QA" | "UA" => 29,
            "JO" | "KW" | "MU" => 30,
            "MT" => 31,
            _ => return None,
        };
        Some(expected)
    }

    /// ISO 7064 MOD 97-10 remainder over the rearranged IBAN.
    ///
    /// Operates directly on the bytes without building the remapped
    /// numeric string; digits extend the remainder by one decimal place,
    /// letters (10-35) by two. Caller must have confirmed the input is
    /// uppercase alphanumeric ASCII.
    fn mod97_10(iban: &str) -> u32 {
        let bytes = iban.as_bytes();
        let rearranged = bytes[4..].iter().chain(&bytes[..4]);

        let mut remainder: u32 = 0;
        for &byte in rearranged {
            match byte {
                b'0'..=b'9' => {
                    remainder = (remainder * 10 + u32::from(byte - b'0')) % 97;
                }
                b'A'..=b'Z' => {
                    remainder = (remainder * 100 + u32::from(byte - b'A') + 10) % 97;
                }
                _ => unreachable!("alphabet checked before checksum"),
            }
        }
        remainder
    }
}

impl BankAccountScheme for IbanScheme {
    fn validate(&self, account_number: &str) -> Result<(), BankAccountError> {
        // Accept the common grouped-by-four display form
        let iban: String = account_number
            .trim()
            .chars()
            .filter(|c| *c != ' ')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if iban.is_empty() {
            return Err(BankAccountError::Empty);
        }
        if !iban.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(BankAccountError::Alphabet);
        }
        if iban.len() < MIN_LEN || iban.len() > MAX_LEN {
            return Err(BankAccountError::Length(iban.len()));
        }

        let country = &iban[..2];
        let check_digits = &iban[2..4];
        if !country.chars().all(|c| c.is_ascii_uppercase())
            || !check_digits.chars().all(|c| c.is_ascii_digit())
        {
            return Err(BankAccountError::Prefix);
        }

        let expected = Self::registry_length(country)
            .ok_or_else(|| BankAccountError::UnknownCountry(country.to_string()))?;
        if iban.len() != expected {
            return Err(BankAccountError::CountryLength {
                country: country.to_string(),
                expected,
                found: iban.len(),
            });
        }

        if Self::mod97_10(&iban) != 1 {
            return Err(BankAccountError::Checksum);
        }

        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
