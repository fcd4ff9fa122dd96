//! Fixtures shared by the unit tests.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use crate::customer::{Address, Customer};
use crate::lookup::{
    IdentityLookup, LookupError, NamedPlace, PanVerification, PostcodeDetails, PostcodeLookup,
};
use crate::types::{CustomerId, Mobile, Pan, Postcode};

/// A complete, valid customer with the given PAN.
pub fn customer(pan: &str) -> Customer {
    Customer {
        id: CustomerId::generate(),
        pan: Pan::parse(pan).unwrap(),
        full_name: format!("Holder of {pan}"),
        email: format!("{}@example.com", pan.to_lowercase()),
        mobile: Mobile::parse("+919876543210").unwrap(),
        addresses: vec![Address {
            address_line1: "12 MG Road".to_string(),
            address_line2: String::new(),
            postcode: "411001".to_string(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
        }],
        created_at: None,
        updated_at: None,
    }
}

/// Lookup fake that records every request and returns canned responses.
pub struct RecordingLookup {
    pan_response: Result<PanVerification, LookupError>,
    postcode_response: Result<PostcodeDetails, LookupError>,
    pan_requests: Mutex<Vec<String>>,
    postcode_requests: Mutex<Vec<String>>,
}

impl Default for RecordingLookup {
    fn default() -> Self {
        Self {
            pan_response: Ok(PanVerification {
                is_valid: true,
                full_name: "Asha Rao".to_string(),
            }),
            postcode_response: Ok(Self::pune()),
            pan_requests: Mutex::new(Vec::new()),
            postcode_requests: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingLookup {
    pub fn pune() -> PostcodeDetails {
        PostcodeDetails {
            city: vec![NamedPlace {
                name: "Pune".to_string(),
            }],
            state: vec![NamedPlace {
                name: "Maharashtra".to_string(),
            }],
        }
    }

    pub fn with_pan_response(mut self, response: Result<PanVerification, LookupError>) -> Self {
        self.pan_response = response;
        self
    }

    pub fn with_postcode_response(
        mut self,
        response: Result<PostcodeDetails, LookupError>,
    ) -> Self {
        self.postcode_response = response;
        self
    }

    pub fn pan_requests(&self) -> Vec<String> {
        self.pan_requests.lock().unwrap().clone()
    }

    pub fn postcode_requests(&self) -> Vec<String> {
        self.postcode_requests.lock().unwrap().clone()
    }
}

impl IdentityLookup for RecordingLookup {
    async fn verify_pan(&self, pan: &Pan) -> Result<PanVerification, LookupError> {
        self.pan_requests.lock().unwrap().push(pan.to_string());
        self.pan_response.clone()
    }
}

impl PostcodeLookup for RecordingLookup {
    async fn postcode_details(&self, postcode: &Postcode) -> Result<PostcodeDetails, LookupError> {
        self.postcode_requests
            .lock()
            .unwrap()
            .push(postcode.to_string());
        self.postcode_response.clone()
    }
}
