//! Customer Registry web application.
//!
//! This crate provides the registry server as a library, allowing it to be
//! tested in-process and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod drafts;
pub mod error;
pub mod lookup;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod storage;

use std::path::Path;

use axum::{Router, middleware::from_fn, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the full application router.
///
/// Sentry layers are added by the binary, since they only matter once a
/// client is initialised.
pub fn app(state: AppState) -> Router {
    let static_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("static");

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
