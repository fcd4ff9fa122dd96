//! Submit-time validation of a customer form.
//!
//! Every rule is checked and every violation is collected, so the caller can
//! show one notification that lists everything wrong at once.

use core::fmt;

use crate::customer::{Address, MAX_ADDRESSES, MAX_EMAIL_LENGTH, MAX_FULL_NAME_LENGTH};
use crate::types::{Mobile, Pan};

/// A single violated rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Violation {
    /// PAN is not exactly ten characters.
    InvalidPan,
    /// Display name is blank or longer than 140 characters.
    InvalidFullName,
    /// Email is longer than 255 characters.
    EmailTooLong,
    /// Mobile does not match `+91` followed by ten digits.
    InvalidMobile,
    /// The address at `index` is missing line 1, postcode, city or state.
    IncompleteAddress {
        /// Zero-based position of the address in the form.
        index: usize,
    },
    /// The form has no addresses at all.
    NoAddresses,
    /// The form has more than ten addresses.
    TooManyAddresses,
}

impl Violation {
    /// The message shown to the operator.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::InvalidPan => "Invalid PAN format.".to_string(),
            Self::InvalidFullName => format!(
                "Full Name is mandatory and should be less than {MAX_FULL_NAME_LENGTH} characters."
            ),
            Self::EmailTooLong => {
                format!("Email must be at most {MAX_EMAIL_LENGTH} characters.")
            }
            Self::InvalidMobile => {
                "Mobile number field should be in valid form Eg: +91XXXXXXXXXX.".to_string()
            }
            Self::IncompleteAddress { index } => format!(
                "Address {}: address line 1, postcode, city and state are mandatory.",
                index + 1
            ),
            Self::NoAddresses => "At least one address is required.".to_string(),
            Self::TooManyAddresses => {
                format!("No more than {MAX_ADDRESSES} addresses are allowed.")
            }
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// All rules violated by one submission, in check order.
#[derive(thiserror::Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{}", self.message())]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` when nothing was violated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// The violated rules.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns `true` if `violation` is part of the report.
    #[must_use]
    pub fn contains(&self, violation: &Violation) -> bool {
        self.violations.contains(violation)
    }

    /// One line per violation.
    #[must_use]
    pub fn message(&self) -> String {
        self.violations
            .iter()
            .map(Violation::message)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `Ok(())` when empty, otherwise the report as an error.
    ///
    /// # Errors
    ///
    /// Returns `self` if any rule was violated.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }
}

/// The raw form values to validate.
#[derive(Debug, Clone, Copy)]
pub struct Submission<'a> {
    pub pan: &'a str,
    pub full_name: &'a str,
    pub email: &'a str,
    pub mobile: &'a str,
    pub addresses: &'a [&'a Address],
}

/// Check every rule against `submission`.
#[must_use]
pub fn validate(submission: &Submission<'_>) -> ValidationReport {
    let mut report = ValidationReport::default();

    if Pan::parse(submission.pan).is_err() {
        report.push(Violation::InvalidPan);
    }

    if submission.full_name.trim().is_empty()
        || submission.full_name.chars().count() > MAX_FULL_NAME_LENGTH
    {
        report.push(Violation::InvalidFullName);
    }

    // Length only; no format check on purpose.
    if submission.email.chars().count() > MAX_EMAIL_LENGTH {
        report.push(Violation::EmailTooLong);
    }

    if !Mobile::is_valid(submission.mobile) {
        report.push(Violation::InvalidMobile);
    }

    if submission.addresses.is_empty() {
        report.push(Violation::NoAddresses);
    } else if submission.addresses.len() > MAX_ADDRESSES {
        report.push(Violation::TooManyAddresses);
    }

    for (index, address) in submission.addresses.iter().enumerate() {
        if !address.is_complete() {
            report.push(Violation::IncompleteAddress { index });
        }
    }

    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn complete_address() -> Address {
        Address {
            address_line1: "12 MG Road".to_string(),
            address_line2: String::new(),
            postcode: "411001".to_string(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
        }
    }

    fn check(
        pan: &str,
        full_name: &str,
        email: &str,
        mobile: &str,
        addresses: &[Address],
    ) -> ValidationReport {
        let refs: Vec<&Address> = addresses.iter().collect();
        validate(&Submission {
            pan,
            full_name,
            email,
            mobile,
            addresses: &refs,
        })
    }

    #[test]
    fn test_valid_submission() {
        let report = check(
            "ABCDE1234Z",
            "Asha Rao",
            "asha@example.com",
            "+919876543210",
            &[complete_address()],
        );
        assert!(report.is_empty());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_short_mobile_fails_with_mobile_message() {
        let report = check(
            "ABCDE1234Z",
            "Asha Rao",
            "",
            "+9112345",
            &[complete_address()],
        );
        assert_eq!(report.violations(), &[Violation::InvalidMobile]);
        assert!(report.message().contains("+91XXXXXXXXXX"));
    }

    #[test]
    fn test_collects_every_violation() {
        let mut incomplete = complete_address();
        incomplete.city = " ".to_string();
        let report = check(
            "SHORT",
            "   ",
            &"e".repeat(256),
            "+91",
            &[complete_address(), incomplete],
        );
        assert_eq!(
            report.violations(),
            &[
                Violation::InvalidPan,
                Violation::InvalidFullName,
                Violation::EmailTooLong,
                Violation::InvalidMobile,
                Violation::IncompleteAddress { index: 1 },
            ]
        );
        assert_eq!(report.message().lines().count(), 5);
    }

    #[test]
    fn test_full_name_length_boundary() {
        let at_limit = "a".repeat(140);
        let over_limit = "a".repeat(141);
        let ok = check(
            "ABCDE1234Z",
            &at_limit,
            "",
            "+919876543210",
            &[complete_address()],
        );
        assert!(ok.is_empty());
        let too_long = check(
            "ABCDE1234Z",
            &over_limit,
            "",
            "+919876543210",
            &[complete_address()],
        );
        assert!(too_long.contains(&Violation::InvalidFullName));
    }

    #[test]
    fn test_email_format_is_not_checked() {
        let report = check(
            "ABCDE1234Z",
            "Asha Rao",
            "not an email",
            "+919876543210",
            &[complete_address()],
        );
        assert!(report.is_empty());
    }

    #[test]
    fn test_address_count_bounds() {
        let none = check("ABCDE1234Z", "Asha Rao", "", "+919876543210", &[]);
        assert_eq!(none.violations(), &[Violation::NoAddresses]);

        let eleven = vec![complete_address(); 11];
        let many = check("ABCDE1234Z", "Asha Rao", "", "+919876543210", &eleven);
        assert_eq!(many.violations(), &[Violation::TooManyAddresses]);
    }

    #[test]
    fn test_report_display_matches_message() {
        let report = check("", "", "", "", &[complete_address()]);
        assert_eq!(report.to_string(), report.message());
    }
}
