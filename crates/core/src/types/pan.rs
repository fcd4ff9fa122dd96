//! Permanent Account Number (PAN) type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Pan`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PanError {
    /// The input is not exactly [`Pan::LENGTH`] characters.
    #[error("PAN must be exactly {expected} characters (got {actual})")]
    WrongLength {
        /// Required length.
        expected: usize,
        /// Length of the rejected input.
        actual: usize,
    },
}

/// A PAN identity number.
///
/// Only the length is enforced. The identity lookup service is the authority
/// on whether a PAN actually exists, so no checksum or pattern is applied here.
///
/// ## Examples
///
/// ```
/// use customer_registry_core::Pan;
///
/// assert!(Pan::parse("ABCDE1234Z").is_ok());
/// assert!(Pan::parse("ABCDE1234").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Pan(String);

impl Pan {
    /// Required length in characters.
    pub const LENGTH: usize = 10;

    /// Parse a `Pan` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`PanError::WrongLength`] unless the input is exactly ten
    /// characters long.
    pub fn parse(s: &str) -> Result<Self, PanError> {
        let actual = s.chars().count();
        if actual != Self::LENGTH {
            return Err(PanError::WrongLength {
                expected: Self::LENGTH,
                actual,
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the PAN as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Pan {
    type Err = PanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Pan {
    type Error = PanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Pan> for String {
    fn from(pan: Pan) -> Self {
        pan.0
    }
}

impl AsRef<str> for Pan {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
