//! HTTP route handlers for the registry.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                       - Customer list
//! GET  /health                                 - Health check
//! POST /customers/{id}/delete                  - Delete, redirect to list
//!
//! # Form pages
//! GET  /add                                    - New customer form
//! GET  /edit/{id}                              - Edit customer form
//!
//! # Draft fields (HTMX)
//! POST /drafts/{draft}/pan                     - PAN keystroke, returns the full name block
//! POST /drafts/{draft}/contact                 - Email/mobile change (204)
//! POST /drafts/{draft}/addresses               - Add address, returns the form
//! POST /drafts/{draft}/addresses/{i}           - Address line change (204)
//! POST /drafts/{draft}/addresses/{i}/postcode  - Postcode keystroke, returns city/state block
//! POST /drafts/{draft}/addresses/{i}/remove    - Remove address, returns the form
//! POST /drafts/{draft}/submit                  - Validate and save (HX-Redirect to /)
//! ```

pub mod customers;
pub mod form;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the draft routes router.
pub fn draft_routes() -> Router<AppState> {
    Router::new()
        .route("/{draft}/pan", post(form::change_pan))
        .route("/{draft}/contact", post(form::change_contact))
        .route("/{draft}/addresses", post(form::add_address))
        .route("/{draft}/addresses/{index}", post(form::change_address))
        .route(
            "/{draft}/addresses/{index}/postcode",
            post(form::change_postcode),
        )
        .route(
            "/{draft}/addresses/{index}/remove",
            post(form::remove_address),
        )
        .route("/{draft}/submit", post(form::submit))
}

/// Create all routes for the registry.
pub fn routes() -> Router<AppState> {
    Router::new()
        // List view
        .route("/", get(customers::index))
        .route("/customers/{id}/delete", post(customers::delete))
        // Form view
        .route("/add", get(form::add))
        .route("/edit/{id}", get(form::edit))
        .nest("/drafts", draft_routes())
}
