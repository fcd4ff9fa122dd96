//! Remote lookup collaborators.
//!
//! The registry never talks to the lookup services directly from domain code.
//! It goes through these traits so the HTTP client can be swapped for a fake
//! in tests.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Pan, Postcode};

/// Errors returned by a lookup collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("lookup service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("could not decode lookup response: {0}")]
    Decode(String),
}

/// Result of verifying a PAN.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanVerification {
    pub is_valid: bool,
    #[serde(default)]
    pub full_name: String,
}

/// A named place in a postcode response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedPlace {
    pub name: String,
}

/// Cities and states served by a postcode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostcodeDetails {
    #[serde(default)]
    pub city: Vec<NamedPlace>,
    #[serde(default)]
    pub state: Vec<NamedPlace>,
}

impl PostcodeDetails {
    /// Name of the first city, or an empty string.
    #[must_use]
    pub fn first_city(&self) -> &str {
        self.city.first().map_or("", |place| place.name.as_str())
    }

    /// Name of the first state, or an empty string.
    #[must_use]
    pub fn first_state(&self) -> &str {
        self.state.first().map_or("", |place| place.name.as_str())
    }
}

/// Resolves a PAN to the holder's name.
pub trait IdentityLookup: Send + Sync {
    /// Ask the service whether `pan` is valid and who holds it.
    fn verify_pan(
        &self,
        pan: &Pan,
    ) -> impl Future<Output = Result<PanVerification, LookupError>> + Send;
}

/// Resolves a postcode to city and state names.
pub trait PostcodeLookup: Send + Sync {
    /// Fetch the places served by `postcode`.
    fn postcode_details(
        &self,
        postcode: &Postcode,
    ) -> impl Future<Output = Result<PostcodeDetails, LookupError>> + Send;
}
