//! Indian mobile number type.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `+91` country code followed by exactly ten digits.
#[allow(clippy::unwrap_used)] // literal pattern
static MOBILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+91[0-9]{10}$").unwrap());

/// Errors that can occur when parsing a [`Mobile`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("mobile number must look like +91XXXXXXXXXX (got {0:?})")]
pub struct MobileError(pub String);

/// A mobile number in `+91XXXXXXXXXX` form.
///
/// ## Examples
///
/// ```
/// use customer_registry_core::Mobile;
///
/// assert!(Mobile::parse("+919876543210").is_ok());
/// assert!(Mobile::parse("9876543210").is_err());
/// assert!(Mobile::parse("+9112345").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Mobile(String);

impl Mobile {
    /// Country code every number starts with.
    pub const COUNTRY_PREFIX: &'static str = "+91";

    /// Parse a `Mobile` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`MobileError`] if the input is not `+91` followed by ten digits.
    pub fn parse(s: &str) -> Result<Self, MobileError> {
        if MOBILE_PATTERN.is_match(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(MobileError(s.to_owned()))
        }
    }

    /// Returns `true` if `s` is a well-formed mobile number.
    #[must_use]
    pub fn is_valid(s: &str) -> bool {
        MOBILE_PATTERN.is_match(s)
    }

    /// Returns the number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Mobile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Mobile {
    type Err = MobileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Mobile {
    type Error = MobileError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Mobile> for String {
    fn from(mobile: Mobile) -> Self {
        mobile.0
    }
}
