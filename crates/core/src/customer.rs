//! Customer and address records as they are persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CustomerId, Mobile, Pan};

/// Maximum number of addresses a customer may have.
pub const MAX_ADDRESSES: usize = 10;

/// Maximum length of the display name, in characters.
pub const MAX_FULL_NAME_LENGTH: usize = 140;

/// Maximum length of the email field, in characters.
pub const MAX_EMAIL_LENGTH: usize = 255;

/// A stored customer record.
///
/// The JSON shape is camelCase so stores written by earlier versions of the
/// registry (which had no `id` or timestamps) still deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default = "CustomerId::generate")]
    pub id: CustomerId,
    pub pan: Pan,
    pub full_name: String,
    pub email: String,
    pub mobile: Mobile,
    pub addresses: Vec<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A postal address. `city` and `state` come from the postcode lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
}

impl Address {
    /// Returns `true` when every mandatory field is non-blank.
    ///
    /// Line 2 is optional; everything else must contain something other than
    /// whitespace.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [
            &self.address_line1,
            &self.postcode,
            &self.city,
            &self.state,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}

impl Customer {
    /// Returns `"City, State"` of the first address, if both are known.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        let address = self.addresses.first()?;
        match (address.city.is_empty(), address.state.is_empty()) {
            (false, false) => Some(format!("{}, {}", address.city, address.state)),
            (false, true) => Some(address.city.clone()),
            (true, false) => Some(address.state.clone()),
            (true, true) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address() -> Address {
        Address {
            address_line1: "12 MG Road".to_string(),
            address_line2: String::new(),
            postcode: "411001".to_string(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
        }
    }

    #[test]
    fn test_is_complete() {
        assert!(address().is_complete());

        let mut blank_line = address();
        blank_line.address_line1 = "   ".to_string();
        assert!(!blank_line.is_complete());

        let mut no_city = address();
        no_city.city.clear();
        assert!(!no_city.is_complete());
    }

    #[test]
    fn test_line2_is_optional() {
        let mut a = address();
        a.address_line2.clear();
        assert!(a.is_complete());
    }

    #[test]
    fn test_deserialize_record_without_id() {
        let json = r#"{
            "pan": "ABCDE1234Z",
            "fullName": "Asha Rao",
            "email": "asha@example.com",
            "mobile": "+919876543210",
            "addresses": [{
                "addressLine1": "12 MG Road",
                "addressLine2": "",
                "postcode": "411001",
                "city": "Pune",
                "state": "Maharashtra"
            }]
        }"#;
        let customer: Customer = serde_json::from_str(json).unwrap();
        assert_eq!(customer.pan.as_str(), "ABCDE1234Z");
        assert_eq!(customer.full_name, "Asha Rao");
        assert_eq!(customer.addresses, vec![address()]);
        assert!(customer.created_at.is_none());
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let customer = Customer {
            id: CustomerId::generate(),
            pan: Pan::parse("ABCDE1234Z").unwrap(),
            full_name: "Asha Rao".to_string(),
            email: String::new(),
            mobile: Mobile::parse("+919876543210").unwrap(),
            addresses: vec![address()],
            created_at: None,
            updated_at: None,
        };
        let value = serde_json::to_value(&customer).unwrap();
        assert_eq!(value["fullName"], "Asha Rao");
        assert_eq!(value["addresses"][0]["addressLine1"], "12 MG Road");
        assert!(value.get("createdAt").is_none());
    }

    #[test]
    fn test_location() {
        let mut customer = Customer {
            id: CustomerId::generate(),
            pan: Pan::parse("ABCDE1234Z").unwrap(),
            full_name: "Asha Rao".to_string(),
            email: String::new(),
            mobile: Mobile::parse("+919876543210").unwrap(),
            addresses: vec![address()],
            created_at: None,
            updated_at: None,
        };
        assert_eq!(customer.location().as_deref(), Some("Pune, Maharashtra"));

        customer.addresses[0].state.clear();
        assert_eq!(customer.location().as_deref(), Some("Pune"));

        customer.addresses.clear();
        assert_eq!(customer.location(), None);
    }
}
