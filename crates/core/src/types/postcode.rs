//! Postal code accepted by the postcode lookup.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Postcode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PostcodeError {
    /// The input is not exactly [`Postcode::LENGTH`] characters.
    #[error("postcode must be exactly {expected} characters (got {actual})")]
    WrongLength {
        /// Required length.
        expected: usize,
        /// Length of the rejected input.
        actual: usize,
    },
}

/// A six-character postal code, the only shape the lookup is called with.
///
/// Stored addresses keep their postcode as free text; this type only exists
/// at the lookup boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Postcode(String);

impl Postcode {
    /// Required length in characters.
    pub const LENGTH: usize = 6;

    /// Parse a `Postcode` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::WrongLength`] unless the input is exactly six
    /// characters long.
    pub fn parse(s: &str) -> Result<Self, PostcodeError> {
        let actual = s.chars().count();
        if actual != Self::LENGTH {
            return Err(PostcodeError::WrongLength {
                expected: Self::LENGTH,
                actual,
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the postcode as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Postcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Postcode {
    type Err = PostcodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Postcode {
    type Error = PostcodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Postcode> for String {
    fn from(postcode: Postcode) -> Self {
        postcode.0
    }
}
