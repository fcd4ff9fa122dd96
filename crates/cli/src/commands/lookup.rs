//! Lookup commands, for checking the remote services by hand.
//!
//! # Usage
//!
//! ```bash
//! registry-cli lookup pan ABCDE1234Z
//! registry-cli lookup postcode 411001
//! ```
//!
//! # Environment Variables
//!
//! - `PAN_LOOKUP_URL` - PAN verification endpoint
//! - `POSTCODE_LOOKUP_URL` - Postcode details endpoint

use customer_registry_core::{
    IdentityLookup, LookupError, Pan, PanError, PanVerification, Postcode, PostcodeDetails,
    PostcodeError, PostcodeLookup,
};
use customer_registry_web::config::{ConfigError, RegistryConfig};
use customer_registry_web::lookup::LookupClient;
use thiserror::Error;

/// Errors that can occur during lookup commands.
#[derive(Debug, Error)]
pub enum LookupCommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The PAN argument has the wrong length.
    #[error("Invalid PAN: {0}")]
    InvalidPan(#[from] PanError),

    /// The postcode argument has the wrong length.
    #[error("Invalid postcode: {0}")]
    InvalidPostcode(#[from] PostcodeError),

    /// The service call failed.
    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),
}

/// Build the client the web app uses.
pub fn client() -> Result<LookupClient, LookupCommandError> {
    let config = RegistryConfig::from_env()?;
    Ok(LookupClient::new(&config.lookup)?)
}

/// Verify a PAN.
pub async fn pan<L: IdentityLookup>(
    lookup: &L,
    raw: &str,
) -> Result<PanVerification, LookupCommandError> {
    let pan = Pan::parse(raw)?;
    Ok(lookup.verify_pan(&pan).await?)
}

/// Fetch city and state for a postcode.
pub async fn postcode<L: PostcodeLookup>(
    lookup: &L,
    raw: &str,
) -> Result<PostcodeDetails, LookupCommandError> {
    let postcode = Postcode::parse(raw)?;
    Ok(lookup.postcode_details(&postcode).await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use customer_registry_core::lookup::NamedPlace;

    struct FixedLookup;

    impl IdentityLookup for FixedLookup {
        async fn verify_pan(&self, pan: &Pan) -> Result<PanVerification, LookupError> {
            Ok(PanVerification {
                is_valid: pan.as_str().ends_with('Z'),
                full_name: "Asha Rao".to_string(),
            })
        }
    }

    impl PostcodeLookup for FixedLookup {
        async fn postcode_details(&self, _: &Postcode) -> Result<PostcodeDetails, LookupError> {
            Ok(PostcodeDetails {
                city: vec![NamedPlace {
                    name: "Pune".to_string(),
                }],
                state: Vec::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_pan_lookup() {
        let result = pan(&FixedLookup, "ABCDE1234Z").await.unwrap();
        assert!(result.is_valid);
        assert_eq!(result.full_name, "Asha Rao");
    }

    #[tokio::test]
    async fn test_short_pan_is_rejected_before_lookup() {
        assert!(matches!(
            pan(&FixedLookup, "ABC").await,
            Err(LookupCommandError::InvalidPan(_))
        ));
    }

    #[tokio::test]
    async fn test_postcode_lookup() {
        let details = postcode(&FixedLookup, "411001").await.unwrap();
        assert_eq!(details.first_city(), "Pune");
        assert_eq!(details.first_state(), "");
    }

    #[tokio::test]
    async fn test_long_postcode_is_rejected() {
        assert!(matches!(
            postcode(&FixedLookup, "4110011").await,
            Err(LookupCommandError::InvalidPostcode(_))
        ));
    }
}
