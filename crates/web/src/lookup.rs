//! HTTP client for the PAN and postcode lookup services.
//!
//! Both endpoints take a small JSON body over POST and answer with JSON.
//! Requests carry no timeout and are never retried; a later keystroke simply
//! supersedes a slow request.

use customer_registry_core::{
    IdentityLookup, LookupError, Pan, PanVerification, Postcode, PostcodeDetails, PostcodeLookup,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::LookupConfig;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PanRequest<'a> {
    pan_number: &'a str,
}

#[derive(Serialize)]
struct PostcodeRequest<'a> {
    postcode: &'a str,
}

/// Client for both lookup endpoints.
#[derive(Debug, Clone)]
pub struct LookupClient {
    client: reqwest::Client,
    pan_url: Url,
    postcode_url: Url,
}

impl LookupClient {
    /// Create a client for the configured endpoints.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            pan_url: config.pan_url.clone(),
            postcode_url: config.postcode_url.clone(),
        })
    }

    async fn post<B, T>(&self, url: &Url, body: &B) -> Result<T, LookupError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LookupError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))
    }
}

impl IdentityLookup for LookupClient {
    #[tracing::instrument(skip_all, fields(pan = %pan))]
    async fn verify_pan(&self, pan: &Pan) -> Result<PanVerification, LookupError> {
        let verification: PanVerification = self
            .post(
                &self.pan_url,
                &PanRequest {
                    pan_number: pan.as_str(),
                },
            )
            .await?;
        tracing::debug!(is_valid = verification.is_valid, "PAN verified");
        Ok(verification)
    }
}

impl PostcodeLookup for LookupClient {
    #[tracing::instrument(skip_all, fields(postcode = %postcode))]
    async fn postcode_details(&self, postcode: &Postcode) -> Result<PostcodeDetails, LookupError> {
        self.post(
            &self.postcode_url,
            &PostcodeRequest {
                postcode: postcode.as_str(),
            },
        )
        .await
    }
}
