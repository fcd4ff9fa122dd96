//! Request ID middleware for request tracing and correlation.
//!
//! Every request gets an ID that shows up in three places: the `request_id`
//! field of the request span (so each draft edit and lookup log line can be
//! tied back to the keystroke that caused it), the Sentry scope, and the
//! `x-request-id` response header.
//!
//! An ID sent by an upstream proxy is reused when it is short printable
//! ASCII; anything else is replaced with a fresh UUID v4.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream ID that is passed through unchanged.
pub const MAX_REQUEST_ID_LEN: usize = 128;

/// The upstream request ID, if it is usable as-is.
fn incoming_request_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .filter(|id| id.bytes().all(|b| b.is_ascii_graphic()))
}

/// Middleware that ensures every request has a request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = incoming_request_id(request.headers())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", &request_id);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn headers_with(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(id).unwrap());
        headers
    }

    #[test]
    fn test_upstream_id_is_reused() {
        let headers = headers_with("cf-8c1d2e");
        assert_eq!(incoming_request_id(&headers), Some("cf-8c1d2e"));
    }

    #[test]
    fn test_missing_or_empty_id_is_ignored() {
        assert_eq!(incoming_request_id(&HeaderMap::new()), None);
        assert_eq!(incoming_request_id(&headers_with("")), None);
    }

    #[test]
    fn test_unusable_ids_are_ignored() {
        let long = "a".repeat(MAX_REQUEST_ID_LEN + 1);
        assert_eq!(incoming_request_id(&headers_with(&long)), None);
        assert_eq!(incoming_request_id(&headers_with("has space")), None);

        let exact = "b".repeat(MAX_REQUEST_ID_LEN);
        assert_eq!(incoming_request_id(&headers_with(&exact)), Some(exact.as_str()));
    }
}
