//! List view route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::Redirect,
};
use customer_registry_core::list::{ADD_PATH, edit_path};
use customer_registry_core::{Customer, CustomerId, CustomerList};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// One row of the customer table.
#[derive(Clone)]
pub struct CustomerRowView {
    pub id: String,
    pub pan: String,
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub location: Option<String>,
    pub edit_path: String,
    pub delete_path: String,
}

impl From<&Customer> for CustomerRowView {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id.to_string(),
            pan: customer.pan.to_string(),
            full_name: customer.full_name.clone(),
            email: customer.email.clone(),
            mobile: customer.mobile.to_string(),
            location: customer.location(),
            edit_path: edit_path(customer.id),
            delete_path: format!("/customers/{}/delete", customer.id),
        }
    }
}

/// Customer list page template.
#[derive(Template, WebTemplate)]
#[template(path = "customers/index.html")]
pub struct IndexTemplate {
    pub customers: Vec<CustomerRowView>,
    pub add_path: &'static str,
}

/// Parse a customer ID from a path segment; anything unparsable is unknown.
pub(crate) fn parse_customer_id(raw: &str) -> Result<CustomerId> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("customer {raw}")))
}

/// Display the customer list.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> IndexTemplate {
    let list = CustomerList::mount(state.store()).await;

    IndexTemplate {
        customers: list.customers().iter().map(CustomerRowView::from).collect(),
        add_path: ADD_PATH,
    }
}

/// Delete a customer and return to the list.
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect> {
    let id = parse_customer_id(&id)?;
    let mut list = CustomerList::mount(state.store()).await;
    list.delete(state.store(), id).await?;

    Ok(Redirect::to("/"))
}
