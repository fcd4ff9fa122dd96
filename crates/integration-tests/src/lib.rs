//! Integration tests for the customer registry.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p customer-registry-integration-tests
//! ```
//!
//! Nothing external is needed: each [`TestContext`] gets its own temporary
//! data directory and a wiremock server standing in for both lookup
//! services, and requests go straight into the router.
//!
//! # Test Categories
//!
//! - `list_view` - List page and delete
//! - `form_flow` - Add/edit drafts, lookups, validation and submit

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use customer_registry_core::{Address, Customer, CustomerId, CustomerStore, Mobile, Pan};
use customer_registry_web::config::{LookupConfig, RegistryConfig};
use customer_registry_web::state::AppState;
use customer_registry_web::storage::JsonFileStore;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the PAN mock answers on.
pub const PAN_PATH: &str = "/api/verify-pan.php";

/// Path the postcode mock answers on.
pub const POSTCODE_PATH: &str = "/api/get-postcode-details.php";

/// A response from the router, with the body read into a string.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Value of a header, if present and ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// One isolated registry instance.
pub struct TestContext {
    pub lookups: MockServer,
    pub state: AppState,
    data_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        let lookups = MockServer::start().await;
        let data_dir = tempfile::tempdir().unwrap();

        let config = RegistryConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            data_dir: data_dir.path().to_path_buf(),
            lookup: LookupConfig {
                pan_url: Url::parse(&format!("{}{PAN_PATH}", lookups.uri())).unwrap(),
                postcode_url: Url::parse(&format!("{}{POSTCODE_PATH}", lookups.uri())).unwrap(),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        Self {
            lookups,
            state: AppState::new(config).unwrap(),
            data_dir,
        }
    }

    /// A router sharing this context's state.
    #[must_use]
    pub fn app(&self) -> Router {
        customer_registry_web::app(self.state.clone())
    }

    /// A second handle on the store the app writes to.
    #[must_use]
    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(self.data_dir.path())
    }

    /// Everything currently stored.
    pub async fn stored(&self) -> Vec<Customer> {
        self.store().load().await
    }

    /// Replace the stored collection.
    pub async fn seed(&self, customers: &[Customer]) {
        self.store().save(customers).await.unwrap();
    }

    /// Write raw text as the stored value.
    pub fn seed_raw(&self, json: &str) {
        std::fs::write(self.store().path(), json).unwrap();
    }

    // -------------------------------------------------------------------------
    // Lookup mocks
    // -------------------------------------------------------------------------

    /// Answer PAN lookups for `pan`; `expected_calls` is verified on drop.
    pub async fn mock_pan(&self, pan: &str, full_name: &str, is_valid: bool, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(PAN_PATH))
            .and(body_json(serde_json::json!({ "panNumber": pan })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "Success",
                "statusCode": 200,
                "isValid": is_valid,
                "fullName": full_name,
            })))
            .expect(expected_calls)
            .mount(&self.lookups)
            .await;
    }

    /// Fail every PAN lookup with `status`.
    pub async fn mock_pan_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(PAN_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.lookups)
            .await;
    }

    /// Answer postcode lookups for `postcode`.
    pub async fn mock_postcode(&self, postcode: &str, city: &str, state: &str) {
        Mock::given(method("POST"))
            .and(path(POSTCODE_PATH))
            .and(body_json(serde_json::json!({ "postcode": postcode })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "Success",
                "city": [{ "id": 1, "name": city }],
                "state": [{ "id": 1, "name": state }],
            })))
            .mount(&self.lookups)
            .await;
    }

    /// Fail every postcode lookup with `status`.
    pub async fn mock_postcode_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(POSTCODE_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.lookups)
            .await;
    }

    /// Number of requests the lookup mocks have seen on `route`.
    pub async fn lookup_calls(&self, route: &str) -> usize {
        self.lookups
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == route)
            .count()
    }

    // -------------------------------------------------------------------------
    // Requests
    // -------------------------------------------------------------------------

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    /// POST an urlencoded form, the way htmx sends a single input.
    pub async fn post(&self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header("HX-Request", "true")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    /// Open the add page and return the draft base path (`/drafts/<id>`).
    pub async fn open_add(&self) -> String {
        let page = self.get("/add").await;
        assert_eq!(page.status, StatusCode::OK);
        draft_path(&page.body).unwrap()
    }
}

/// Extract `/drafts/<id>` from a rendered form.
#[must_use]
pub fn draft_path(html: &str) -> Option<String> {
    const MARKER: &str = "hx-post=\"/drafts/";
    let start = html.find(MARKER)? + "hx-post=\"".len();
    let rest = html.get(start..)?;
    let end = rest.get("/drafts/".len()..)?.find('/')? + "/drafts/".len();
    rest.get(..end).map(str::to_owned)
}

/// A complete, valid customer.
#[must_use]
pub fn customer(pan: &str, full_name: &str) -> Customer {
    Customer {
        id: CustomerId::generate(),
        pan: Pan::parse(pan).unwrap(),
        full_name: full_name.to_string(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_path_extraction() {
        let html = r#"<input hx-post="/drafts/0b7c3c52-4c0e-4f55-9a8e-1d2f5a9c6e11/pan">"#;
        assert_eq!(
            draft_path(html).as_deref(),
            Some("/drafts/0b7c3c52-4c0e-4f55-9a8e-1d2f5a9c6e11")
        );
        assert_eq!(draft_path("<p>no form</p>"), None);
    }
}
