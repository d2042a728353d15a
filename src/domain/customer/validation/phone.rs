// ============================================================================
// Phone Number Validation (numbering-plan classification)
// ============================================================================
//
// The numbering plan is a capability handed to the validator rather than a
// global, so tests can swap in deterministic plans. The builtin plan
// carries a small embedded table: country-code extraction for numbers in
// international form, length-based possibility, per-plan validity, and
// mobile classification by national prefix.
//
// ============================================================================

/// Classification of a parsed number within its plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneNumberType {
    FixedLine,
    Mobile,
    /// Plans like the NANP assign fixed-line and mobile numbers from the
    /// same ranges and cannot tell them apart.
    FixedLineOrMobile,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumberParseError {
    #[error("phone number is empty")]
    Empty,

    #[error("phone number contains character {0:?}")]
    InvalidCharacter(char),

    #[error("country code {0} is not covered by this numbering plan")]
    UnknownCountryCode(String),

    #[error("region {0} is not covered by this numbering plan")]
    UnknownRegion(String),
}

/// Outcome of parsing a raw string under a numbering plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNumber {
    country_code: u16,
    national_number: String,
    possible: bool,
    valid: bool,
    number_type: PhoneNumberType,
}

impl ParsedNumber {
    pub fn new(
        country_code: u16,
        national_number: impl Into<String>,
        possible: bool,
        valid: bool,
        number_type: PhoneNumberType,
    ) -> Self {
        Self {
            country_code,
            national_number: national_number.into(),
            possible,
            valid,
            number_type,
        }
    }

    pub fn country_code(&self) -> u16 {
        self.country_code
    }

    pub fn national_number(&self) -> &str {
        &self.national_number
    }

    /// Length-plausible for the plan it parsed under.
    pub fn is_possible(&self) -> bool {
        self.possible
    }

    /// Matches an assignable range of the plan.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn number_type(&self) -> PhoneNumberType {
        self.number_type
    }
}

/// Parse capability over a set of regional numbering plans.
pub trait NumberingPlan: Send + Sync {
    /// Parse `input` as a phone number, using `default_region` when the
    /// input is not in international (`+`-prefixed) form.
    fn parse(&self, input: &str, default_region: &str)
        -> Result<ParsedNumber, NumberParseError>;
}

// ============================================================================
// Builtin plan table
// ============================================================================

/// How a plan tells mobile ranges apart, if it does at all.
#[derive(Clone, Copy)]
enum PlanStyle {
    /// Fixed-line and mobile numbers share the same ranges (NANP).
    Undifferentiated,
    /// Mobile numbers start with one of these national prefixes.
    MobilePrefixes(&'static [&'static str]),
}

struct RegionPlan {
    region: &'static str,
    country_code: u16,
    /// Inclusive bounds on the national significant number length.
    min_len: usize,
    max_len: usize,
    style: PlanStyle,
}

impl RegionPlan {
    fn is_valid_national(&self, national: &str) -> bool {
        match self.style {
            // NANP: NXX NXX-XXXX, area code and exchange both start 2-9
            PlanStyle::Undifferentiated => {
                let b = national.as_bytes();
                b.len() == 10 && (b'2'..=b'9').contains(&b[0]) && (b'2'..=b'9').contains(&b[3])
            }
            // Trunk prefix already stripped, so a leading zero is dead
            PlanStyle::MobilePrefixes(_) => !national.starts_with('0'),
        }
    }

    fn classify(&self, national: &str) -> PhoneNumberType {
        match self.style {
            PlanStyle::Undifferentiated => PhoneNumberType::FixedLineOrMobile,
            PlanStyle::MobilePrefixes(prefixes) => {
                if prefixes.iter().any(|p| national.starts_with(p)) {
                    PhoneNumberType::Mobile
                } else {
                    PhoneNumberType::FixedLine
                }
            }
        }
    }
}

const PLANS: &[RegionPlan] = &[
    RegionPlan {
        region: "US",
        country_code: 1,
        min_len: 10,
        max_len: 10,
        style: PlanStyle::Undifferentiated,
    },
    RegionPlan {
        region: "CA",
        country_code: 1,
        min_len: 10,
        max_len: 10,
        style: PlanStyle::Undifferentiated,
    },
    RegionPlan {
        region: "GB",
        country_code: 44,
        min_len: 9,
        max_len: 10,
        style: PlanStyle::MobilePrefixes(&["7"]),
    },
    RegionPlan {
        region: "DE",
        country_code: 49,
        min_len: 6,
        max_len: 11,
        style: PlanStyle::MobilePrefixes(&["15", "16", "17"]),
    },
    RegionPlan {
        region: "FR",
        country_code: 33,
        min_len: 9,
        max_len: 9,
        style: PlanStyle::MobilePrefixes(&["6", "7"]),
    },
    RegionPlan {
        region: "NL",
        country_code: 31,
        min_len: 9,
        max_len: 9,
        style: PlanStyle::MobilePrefixes(&["6"]),
    },
    RegionPlan {
        region: "ES",
        country_code: 34,
        min_len: 9,
        max_len: 9,
        style: PlanStyle::MobilePrefixes(&["6", "7"]),
    },
];

/// The embedded numbering plan shipped with the service.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinNumberingPlan;

impl BuiltinNumberingPlan {
    fn plan_for_country_code(digits: &str) -> Option<&'static RegionPlan> {
        // Longest country-code match wins ("44" before "4...")
        PLANS
            .iter()
            .filter(|p| digits.starts_with(&p.country_code.to_string()))
            .max_by_key(|p| p.country_code.to_string().len())
    }

    fn plan_for_region(region: &str) -> Option<&'static RegionPlan> {
        PLANS.iter().find(|p| p.region == region)
    }
}

impl NumberingPlan for BuiltinNumberingPlan {
    fn parse(
        &self,
        input: &str,
        default_region: &str,
    ) -> Result<ParsedNumber, NumberParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(NumberParseError::Empty);
        }

        let mut digits = String::with_capacity(trimmed.len());
        let mut international = false;
        for (i, c) in trimmed.chars().enumerate() {
            match c {
                '+' if i == 0 => international = true,
                '0'..='9' => digits.push(c),
                ' ' | '-' | '.' | '(' | ')' | '/' => {}
                other => return Err(NumberParseError::InvalidCharacter(other)),
            }
        }
        // "00" is the conventional dial-out prefix where "+" is not typed
        if !international && digits.starts_with("00") {
            international = true;
            digits.drain(..2);
        }
        if digits.is_empty() {
            return Err(NumberParseError::Empty);
        }

        let (plan, national) = if international {
            let plan = Self::plan_for_country_code(&digits).ok_or_else(|| {
                NumberParseError::UnknownCountryCode(digits.chars().take(3).collect())
            })?;
            let national = digits[plan.country_code.to_string().len()..].to_string();
            (plan, national)
        } else {
            let plan = Self::plan_for_region(default_region)
                .ok_or_else(|| NumberParseError::UnknownRegion(default_region.to_string()))?;
            let national = match plan.style {
                // Tolerate the country code being dialed domestically
                PlanStyle::Undifferentiated
                    if digits.len() == 11 && digits.starts_with('1') =>
                {
                    digits[1..].to_string()
                }
                PlanStyle::Undifferentiated => digits,
                // Trunk prefix is not part of the national number
                PlanStyle::MobilePrefixes(_) => match digits.strip_prefix('0') {
                    Some(rest) => rest.to_string(),
                    None => digits,
                },
            };
            (plan, national)
        };

        let possible = (plan.min_len..=plan.max_len).contains(&national.len());
        let valid = possible && plan.is_valid_national(&national);
        let number_type = if valid {
            plan.classify(&national)
        } else {
            PhoneNumberType::Unknown
        };

        Ok(ParsedNumber {
            country_code: plan.country_code,
            national_number: national,
            possible,
            valid,
            number_type,
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
