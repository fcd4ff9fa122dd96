//! Create/edit form route handlers.
//!
//! The add and edit pages open a draft and render the full page. Every
//! control on the page then posts only its own value to a draft endpoint.
//! What comes back depends on the control:
//!
//! - email, mobile and address lines: `204 No Content`, nothing is swapped
//! - PAN: the `#pan-details` block (full name and its loading indicator)
//! - postcode: that address's city/state block
//! - add, remove and submit: the whole `#customer-form` fragment, where the
//!   editable inputs carry `hx-preserve` so in-progress typing survives
//!
//! Lookups run with the draft unlocked, so a slow response never blocks the
//! next keystroke; the form's sequence tickets decide which response lands.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Response},
};
use customer_registry_core::form::AddressDraft;
use customer_registry_core::{
    AddressField, CustomerForm, FormError, IdentityLookup, PostcodeLookup, SubmitError, Violation,
};
use serde::Deserialize;
use tracing::instrument;

use crate::drafts::{self, DraftId, SharedForm};
use crate::error::{AppError, Result};
use crate::routes::customers::parse_customer_id;
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// A blocking notification shown over the form.
#[derive(Clone)]
pub struct DialogView {
    pub title: String,
    pub messages: Vec<String>,
}

impl DialogView {
    fn new(title: &str, messages: Vec<String>) -> Self {
        Self {
            title: title.to_string(),
            messages,
        }
    }
}

/// One address block of the form.
#[derive(Clone)]
pub struct AddressView {
    pub key: u64,
    pub number: usize,
    pub base_path: String,
    pub address_line1: String,
    pub address_line2: String,
    pub postcode: String,
    pub city: String,
    pub state: String,
    pub loading: bool,
}

impl AddressView {
    fn new(draft_id: DraftId, index: usize, draft: &AddressDraft) -> Self {
        let address = draft.address();
        Self {
            key: draft.key(),
            number: index + 1,
            base_path: format!("/drafts/{draft_id}/addresses/{index}"),
            address_line1: address.address_line1.clone(),
            address_line2: address.address_line2.clone(),
            postcode: address.postcode.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            loading: draft.is_loading(),
        }
    }
}

/// Form display data for templates.
#[derive(Clone)]
pub struct FormView {
    pub base_path: String,
    pub is_edit: bool,
    pub pan: String,
    pub pan_loading: bool,
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub addresses: Vec<AddressView>,
    pub can_add_address: bool,
    pub dialog: Option<DialogView>,
}

impl FormView {
    fn new(draft_id: DraftId, form: &CustomerForm) -> Self {
        Self {
            base_path: format!("/drafts/{draft_id}"),
            is_edit: form.is_edit(),
            pan: form.pan().to_string(),
            pan_loading: form.is_pan_loading(),
            full_name: form.full_name().to_string(),
            email: form.email().to_string(),
            mobile: form.mobile().to_string(),
            addresses: form
                .addresses()
                .iter()
                .enumerate()
                .map(|(index, draft)| AddressView::new(draft_id, index, draft))
                .collect(),
            can_add_address: form.can_add_address(),
            dialog: None,
        }
    }

    /// Snapshot a shared draft without holding its lock afterwards.
    fn snapshot(draft_id: DraftId, form: &SharedForm) -> Self {
        Self::new(draft_id, &drafts::lock(form))
    }

    fn with_dialog(mut self, dialog: DialogView) -> Self {
        self.dialog = Some(dialog);
        self
    }
}

/// Full form page.
#[derive(Template, WebTemplate)]
#[template(path = "customers/form.html")]
pub struct FormPageTemplate {
    pub form: FormView,
}

/// The form fragment swapped in by htmx.
#[derive(Template, WebTemplate)]
#[template(path = "partials/customer_form.html")]
pub struct FormFragment {
    pub form: FormView,
}

/// Full name and PAN loading indicator.
#[derive(Template, WebTemplate)]
#[template(path = "partials/pan_details.html")]
pub struct PanDetailsFragment {
    pub form: FormView,
}

/// City and state of one address.
#[derive(Template, WebTemplate)]
#[template(path = "partials/address_details.html")]
pub struct AddressDetailsFragment {
    pub address: AddressView,
}

// =============================================================================
// Form Inputs
// =============================================================================

/// PAN keystroke.
#[derive(Debug, Deserialize)]
pub struct PanInput {
    #[serde(default)]
    pub pan: String,
}

/// Email or mobile change; only the field that changed is sent.
#[derive(Debug, Deserialize)]
pub struct ContactInput {
    pub email: Option<String>,
    pub mobile: Option<String>,
}

/// Address line change; only the field that changed is sent.
#[derive(Debug, Deserialize)]
pub struct AddressLinesInput {
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
}

/// Postcode keystroke.
#[derive(Debug, Deserialize)]
pub struct PostcodeInput {
    #[serde(default)]
    pub postcode: String,
}

// =============================================================================
// Draft Helpers
// =============================================================================

/// Resolve a draft from its path segment.
async fn find_draft(state: &AppState, raw: &str) -> Result<(DraftId, SharedForm)> {
    let not_found = || AppError::NotFound(format!("draft {raw}"));
    let id: DraftId = raw.parse().map_err(|_| not_found())?;
    let form = state.drafts().get(id).await.ok_or_else(not_found)?;
    Ok((id, form))
}

// =============================================================================
// Pages
// =============================================================================

/// Open a create-mode draft.
#[instrument(skip(state))]
pub async fn add(State(state): State<AppState>) -> FormPageTemplate {
    let form = CustomerForm::create();
    let view_source = form.clone();
    let draft_id = state.drafts().open(form).await;

    FormPageTemplate {
        form: FormView::new(draft_id, &view_source),
    }
}

/// Open an edit-mode draft for an existing customer.
#[instrument(skip(state))]
pub async fn edit(State(state): State<AppState>, Path(id): Path<String>) -> Result<FormPageTemplate> {
    let id = parse_customer_id(&id)?;
    let form = CustomerForm::edit(state.store(), id).await?;
    let view_source = form.clone();
    let draft_id = state.drafts().open(form).await;

    Ok(FormPageTemplate {
        form: FormView::new(draft_id, &view_source),
    })
}

// =============================================================================
// Field Handlers (HTMX)
// =============================================================================

/// Record a PAN keystroke, looking the holder up once it is complete.
#[instrument(skip(state, input))]
pub async fn change_pan(
    State(state): State<AppState>,
    Path(draft): Path<String>,
    Form(input): Form<PanInput>,
) -> Result<PanDetailsFragment> {
    let (draft_id, form) = find_draft(&state, &draft).await?;

    let ticket = drafts::lock(&form).set_pan(&input.pan);
    if let Some(ticket) = ticket {
        let result = state.lookup().verify_pan(ticket.pan()).await;
        drafts::lock(&form).apply_pan_lookup(&ticket, result);
    }

    Ok(PanDetailsFragment {
        form: FormView::snapshot(draft_id, &form),
    })
}

/// Update email and/or mobile.
#[instrument(skip(state, input))]
pub async fn change_contact(
    State(state): State<AppState>,
    Path(draft): Path<String>,
    Form(input): Form<ContactInput>,
) -> Result<StatusCode> {
    let (_, form) = find_draft(&state, &draft).await?;

    {
        let mut form = drafts::lock(&form);
        if let Some(email) = &input.email {
            form.set_email(email);
        }
        if let Some(mobile) = &input.mobile {
            form.set_mobile(mobile);
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Append a blank address; a no-op once the limit is reached.
#[instrument(skip(state))]
pub async fn add_address(
    State(state): State<AppState>,
    Path(draft): Path<String>,
) -> Result<FormFragment> {
    let (draft_id, form) = find_draft(&state, &draft).await?;

    if !drafts::lock(&form).add_address() {
        tracing::debug!(draft_id = %draft_id, "Address limit reached");
    }

    Ok(FormFragment {
        form: FormView::snapshot(draft_id, &form),
    })
}

/// Update the free-text lines of one address.
#[instrument(skip(state, input))]
pub async fn change_address(
    State(state): State<AppState>,
    Path((draft, index)): Path<(String, usize)>,
    Form(input): Form<AddressLinesInput>,
) -> Result<StatusCode> {
    let (_, form) = find_draft(&state, &draft).await?;

    {
        let mut form = drafts::lock(&form);
        if let Some(line1) = &input.address_line1 {
            form.set_address_field(index, AddressField::Line1, line1)?;
        }
        if let Some(line2) = &input.address_line2 {
            form.set_address_field(index, AddressField::Line2, line2)?;
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Record a postcode keystroke, filling city and state once it is complete.
#[instrument(skip(state, input))]
pub async fn change_postcode(
    State(state): State<AppState>,
    Path((draft, index)): Path<(String, usize)>,
    Form(input): Form<PostcodeInput>,
) -> Result<AddressDetailsFragment> {
    let (draft_id, form) = find_draft(&state, &draft).await?;

    let (key, ticket) = {
        let mut form = drafts::lock(&form);
        let ticket = form.set_postcode(index, &input.postcode)?;
        let key = form.addresses().get(index).map(AddressDraft::key);
        (key, ticket)
    };
    if let Some(ticket) = ticket {
        let result = state.lookup().postcode_details(ticket.postcode()).await;
        drafts::lock(&form).apply_postcode_lookup(&ticket, result);
    }

    // The row may have moved while the lookup ran; follow it by key.
    let address = drafts::lock(&form)
        .addresses()
        .iter()
        .enumerate()
        .find(|(_, draft)| Some(draft.key()) == key)
        .map(|(position, draft)| AddressView::new(draft_id, position, draft))
        .ok_or(FormError::NoSuchAddress(index))?;

    Ok(AddressDetailsFragment { address })
}

/// Remove one address. Removing the only address shows a notification.
#[instrument(skip(state))]
pub async fn remove_address(
    State(state): State<AppState>,
    Path((draft, index)): Path<(String, usize)>,
) -> Result<FormFragment> {
    let (draft_id, form) = find_draft(&state, &draft).await?;

    let removed = drafts::lock(&form).remove_address(index);
    let view = FormView::snapshot(draft_id, &form);

    match removed {
        Ok(()) => Ok(FormFragment { form: view }),
        Err(err @ FormError::LastAddress) => Ok(FormFragment {
            form: view.with_dialog(DialogView::new("Cannot remove address", vec![err.to_string()])),
        }),
        Err(err) => Err(err.into()),
    }
}

// =============================================================================
// Submit
// =============================================================================

/// Validate and save, then send the browser back to the list.
///
/// Validation failures come back as the form fragment with every violated
/// rule listed in a dialog; nothing is written.
#[instrument(skip(state))]
pub async fn submit(State(state): State<AppState>, Path(draft): Path<String>) -> Result<Response> {
    let (draft_id, form) = find_draft(&state, &draft).await?;

    let snapshot = drafts::lock(&form).clone();
    match snapshot.submit(state.store()).await {
        Ok(customer) => {
            state.drafts().discard(draft_id).await;
            tracing::info!(customer_id = %customer.id, "Customer form submitted");
            Ok((StatusCode::OK, AppendHeaders([("HX-Redirect", "/")])).into_response())
        }
        Err(SubmitError::Invalid(report)) => {
            let messages = report.violations().iter().map(Violation::message).collect();
            let view = FormView::new(draft_id, &snapshot)
                .with_dialog(DialogView::new("Please fix the following", messages));
            Ok(FormFragment { form: view }.into_response())
        }
        Err(SubmitError::NotFound(id)) => {
            tracing::warn!(customer_id = %id, "Edited customer was deleted before submit");
            let view = FormView::new(draft_id, &snapshot).with_dialog(DialogView::new(
                "Customer no longer exists",
                vec!["This customer was deleted while you were editing.".to_string()],
            ));
            Ok(FormFragment { form: view }.into_response())
        }
        Err(err @ SubmitError::Store(_)) => Err(err.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_form_view_of_blank_form() {
        let draft_id = DraftId::generate();
        let view = FormView::new(draft_id, &CustomerForm::create());

        assert_eq!(view.base_path, format!("/drafts/{draft_id}"));
        assert!(!view.is_edit);
        assert_eq!(view.mobile, "+91");
        assert_eq!(view.addresses.len(), 1);
        assert_eq!(view.addresses[0].number, 1);
        assert_eq!(
            view.addresses[0].base_path,
            format!("/drafts/{draft_id}/addresses/0")
        );
        assert!(view.can_add_address);
        assert!(view.dialog.is_none());
    }

    #[test]
    fn test_fragment_renders_dialog_messages() {
        let view = FormView::new(DraftId::generate(), &CustomerForm::create()).with_dialog(
            DialogView::new("Please fix the following", vec!["Invalid PAN format.".to_string()]),
        );
        let html = FormFragment { form: view }.render().unwrap();

        assert!(html.contains("<dialog open"));
        assert!(html.contains("Invalid PAN format."));
        assert!(html.contains("id=\"customer-form\""));
    }

    #[test]
    fn test_fragment_hides_add_button_at_limit() {
        let mut form = CustomerForm::create();
        while form.add_address() {}
        let html = FormFragment {
            form: FormView::new(DraftId::generate(), &form),
        }
        .render()
        .unwrap();

        assert!(!html.contains("Add address"));
        assert!(html.contains("Address 10"));
    }

    #[test]
    fn test_pan_details_carry_no_editable_inputs() {
        let mut form = CustomerForm::create();
        form.set_email("typed@example.com");
        let html = PanDetailsFragment {
            form: FormView::new(DraftId::generate(), &form),
        }
        .render()
        .unwrap();

        assert!(html.contains("id=\"pan-details\""));
        assert!(html.contains("id=\"full_name\""));
        assert!(!html.contains("id=\"customer-form\""));
        assert!(!html.contains("id=\"email\""));
        assert!(!html.contains("typed@example.com"));
        assert!(!html.contains("hx-post"));
    }

    #[test]
    fn test_pending_lookups_render_active_indicators() {
        let mut form = CustomerForm::create();
        let _pan = form.set_pan("ABCDE1234Z").unwrap();
        let _postcode = form.set_postcode(0, "411001").unwrap().unwrap();
        let view = FormView::new(DraftId::generate(), &form);

        let pan = PanDetailsFragment { form: view.clone() }.render().unwrap();
        let address = AddressDetailsFragment {
            address: view.addresses[0].clone(),
        }
        .render()
        .unwrap();

        assert!(pan.contains("htmx-indicator active"));
        assert!(address.contains("htmx-indicator active"));
    }

    #[test]
    fn test_idle_form_indicators_wait_for_requests() {
        let html = FormFragment {
            form: FormView::new(DraftId::generate(), &CustomerForm::create()),
        }
        .render()
        .unwrap();

        assert!(html.contains("hx-indicator=\"#pan-details .loading\""));
        assert!(html.contains("class=\"loading htmx-indicator\""));
        assert!(!html.contains("htmx-indicator active"));
    }

    #[test]
    fn test_address_ids_follow_row_key() {
        let mut form = CustomerForm::create();
        form.add_address();
        form.set_address_field(1, AddressField::Line1, "Second Street")
            .unwrap();
        form.remove_address(0).unwrap();

        let html = FormFragment {
            form: FormView::new(DraftId::generate(), &form),
        }
        .render()
        .unwrap();

        assert!(html.contains("Address 1"));
        assert!(html.contains("id=\"address-1-line1\""));
        assert!(html.contains("id=\"address-1-details\""));
        assert!(!html.contains("id=\"address-0-line1\""));
        assert!(html.contains("hx-preserve"));
    }

    #[test]
    fn test_page_title_follows_mode() {
        let html = FormPageTemplate {
            form: FormView::new(DraftId::generate(), &CustomerForm::create()),
        }
        .render()
        .unwrap();
        assert!(html.contains("Add Customer"));
    }
}
