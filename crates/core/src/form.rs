//! Create/edit form state machine.
//!
//! A [`CustomerForm`] holds the raw field values while the operator types.
//! Lookups are split in two halves so that no lock or borrow has to be held
//! while a request is in flight:
//!
//! 1. a setter (`set_pan`, `set_postcode`) records the keystroke and, when the
//!    value has the right length, hands back a ticket;
//! 2. the caller runs the lookup and passes the ticket and result to
//!    `apply_pan_lookup` / `apply_postcode_lookup`.
//!
//! Every keystroke bumps the field's sequence number, so a response only lands
//! if no newer keystroke happened to that field since its ticket was issued.
//! `change_pan` and `change_postcode` run both halves in one call.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::customer::{Address, Customer, MAX_ADDRESSES};
use crate::lookup::{
    IdentityLookup, LookupError, PanVerification, PostcodeDetails, PostcodeLookup,
};
use crate::store::{CustomerStore, StoreError};
use crate::types::{CustomerId, Mobile, Pan, Postcode};
use crate::validation::{self, Submission, ValidationReport};

/// Whether the form creates a new record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(CustomerId),
}

/// Free-text address fields the operator can edit directly.
///
/// Postcode goes through [`CustomerForm::set_postcode`]; city and state are
/// only ever written by the postcode lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    Line1,
    Line2,
}

/// Errors from form operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    /// The record to edit does not exist.
    #[error("customer {0} not found")]
    NotFound(CustomerId),

    /// Removing the only address is not allowed.
    #[error("You need to add at least one address!")]
    LastAddress,

    /// No address at this index.
    #[error("no address at position {0}")]
    NoSuchAddress(usize),
}

/// Errors from submitting a form.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// One or more fields failed validation. Nothing was saved.
    #[error("{0}")]
    Invalid(#[from] ValidationReport),

    /// The record being edited was removed from the store in the meantime.
    #[error("customer {0} not found")]
    NotFound(CustomerId),

    /// Saving failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Token for one outstanding PAN lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanLookupTicket {
    seq: u64,
    pan: Pan,
}

impl PanLookupTicket {
    /// The PAN to look up.
    #[must_use]
    pub const fn pan(&self) -> &Pan {
        &self.pan
    }
}

/// Token for one outstanding postcode lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostcodeLookupTicket {
    address_key: u64,
    seq: u64,
    postcode: Postcode,
}

impl PostcodeLookupTicket {
    /// The postcode to look up.
    #[must_use]
    pub const fn postcode(&self) -> &Postcode {
        &self.postcode
    }
}

/// One address row of the form.
#[derive(Debug, Clone)]
pub struct AddressDraft {
    key: u64,
    address: Address,
    lookup_seq: u64,
    loading: bool,
}

impl AddressDraft {
    fn new(key: u64, address: Address) -> Self {
        Self {
            key,
            address,
            lookup_seq: 0,
            loading: false,
        }
    }

    /// Identifier of this row, unchanged when rows before it are removed.
    #[must_use]
    pub const fn key(&self) -> u64 {
        self.key
    }

    /// Current field values.
    #[must_use]
    pub const fn address(&self) -> &Address {
        &self.address
    }

    /// Whether a postcode lookup for this row is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }
}

/// State of the create/edit form.
#[derive(Debug, Clone)]
pub struct CustomerForm {
    mode: FormMode,
    pan: String,
    full_name: String,
    email: String,
    mobile: String,
    addresses: Vec<AddressDraft>,
    pan_seq: u64,
    pan_loading: bool,
    next_address_key: u64,
    created_at: Option<DateTime<Utc>>,
}

impl CustomerForm {
    /// A blank form for a new customer.
    ///
    /// Mobile starts with the `+91` prefix and there is one empty address.
    #[must_use]
    pub fn create() -> Self {
        let mut form = Self {
            mode: FormMode::Create,
            pan: String::new(),
            full_name: String::new(),
            email: String::new(),
            mobile: Mobile::COUNTRY_PREFIX.to_string(),
            addresses: Vec::new(),
            pan_seq: 0,
            pan_loading: false,
            next_address_key: 0,
            created_at: None,
        };
        form.push_address(Address::default());
        form
    }

    /// A form pre-filled from the stored customer with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NotFound`] if no stored customer has this ID.
    pub async fn edit<S: CustomerStore>(store: &S, id: CustomerId) -> Result<Self, FormError> {
        let customers = store.load().await;
        let customer = customers
            .iter()
            .find(|customer| customer.id == id)
            .ok_or(FormError::NotFound(id))?;
        Ok(Self::from_customer(customer))
    }

    /// An edit-mode form pre-filled from `customer`.
    ///
    /// Every stored address is kept, even past the limit, so that submitting
    /// the form cannot silently drop any; validation reports the excess.
    #[must_use]
    pub fn from_customer(customer: &Customer) -> Self {
        let mut form = Self {
            mode: FormMode::Edit(customer.id),
            pan: customer.pan.to_string(),
            full_name: customer.full_name.clone(),
            email: customer.email.clone(),
            mobile: customer.mobile.to_string(),
            addresses: Vec::new(),
            pan_seq: 0,
            pan_loading: false,
            next_address_key: 0,
            created_at: customer.created_at,
        };
        if customer.addresses.len() > MAX_ADDRESSES {
            tracing::warn!(
                customer_id = %customer.id,
                addresses = customer.addresses.len(),
                "Stored customer has more addresses than the form allows"
            );
        }
        for address in &customer.addresses {
            form.push_address(address.clone());
        }
        if form.addresses.is_empty() {
            form.push_address(Address::default());
        }
        form
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub const fn mode(&self) -> FormMode {
        self.mode
    }

    #[must_use]
    pub const fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    #[must_use]
    pub fn pan(&self) -> &str {
        &self.pan
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn mobile(&self) -> &str {
        &self.mobile
    }

    #[must_use]
    pub fn addresses(&self) -> &[AddressDraft] {
        &self.addresses
    }

    /// Whether another address may be added.
    #[must_use]
    pub fn can_add_address(&self) -> bool {
        self.addresses.len() < MAX_ADDRESSES
    }

    #[must_use]
    pub const fn is_pan_loading(&self) -> bool {
        self.pan_loading
    }

    /// Whether any postcode lookup is in flight.
    #[must_use]
    pub fn is_postcode_loading(&self) -> bool {
        self.addresses.iter().any(AddressDraft::is_loading)
    }

    // -------------------------------------------------------------------------
    // Contact fields
    // -------------------------------------------------------------------------

    pub fn set_email(&mut self, value: &str) {
        value.clone_into(&mut self.email);
    }

    pub fn set_mobile(&mut self, value: &str) {
        value.clone_into(&mut self.mobile);
    }

    // -------------------------------------------------------------------------
    // PAN
    // -------------------------------------------------------------------------

    /// Record a PAN keystroke.
    ///
    /// Anything but exactly ten characters clears the display name and
    /// returns `None`. Ten characters start a lookup: the loading flag is set
    /// and the returned ticket must be passed to [`Self::apply_pan_lookup`].
    pub fn set_pan(&mut self, value: &str) -> Option<PanLookupTicket> {
        value.clone_into(&mut self.pan);
        self.pan_seq += 1;

        if let Ok(pan) = Pan::parse(value) {
            self.pan_loading = true;
            Some(PanLookupTicket {
                seq: self.pan_seq,
                pan,
            })
        } else {
            self.full_name.clear();
            self.pan_loading = false;
            None
        }
    }

    /// Apply the outcome of a PAN lookup.
    ///
    /// Returns `false` and changes nothing if a newer keystroke superseded the
    /// ticket. A failed lookup leaves the display name as it was.
    pub fn apply_pan_lookup(
        &mut self,
        ticket: &PanLookupTicket,
        result: Result<PanVerification, LookupError>,
    ) -> bool {
        if ticket.seq != self.pan_seq {
            tracing::debug!(pan = %ticket.pan, "Discarding stale PAN lookup response");
            return false;
        }
        self.pan_loading = false;

        match result {
            Ok(verification) if verification.is_valid => {
                self.full_name = verification.full_name;
            }
            Ok(_) => self.full_name.clear(),
            Err(e) => {
                tracing::warn!(pan = %ticket.pan, error = %e, "PAN lookup failed");
            }
        }
        true
    }

    /// Record a PAN keystroke and, if it is complete, look it up.
    pub async fn change_pan<L: IdentityLookup>(&mut self, value: &str, lookup: &L) {
        if let Some(ticket) = self.set_pan(value) {
            let result = lookup.verify_pan(ticket.pan()).await;
            self.apply_pan_lookup(&ticket, result);
        }
    }

    // -------------------------------------------------------------------------
    // Addresses
    // -------------------------------------------------------------------------

    fn push_address(&mut self, address: Address) {
        let key = self.next_address_key;
        self.next_address_key += 1;
        self.addresses.push(AddressDraft::new(key, address));
    }

    fn address_mut(&mut self, index: usize) -> Result<&mut AddressDraft, FormError> {
        self.addresses
            .get_mut(index)
            .ok_or(FormError::NoSuchAddress(index))
    }

    /// Append a blank address. Returns `false` (and does nothing) at the limit.
    pub fn add_address(&mut self) -> bool {
        if !self.can_add_address() {
            return false;
        }
        self.push_address(Address::default());
        true
    }

    /// Remove the address at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::LastAddress`] if it is the only address and
    /// [`FormError::NoSuchAddress`] if `index` is out of range.
    pub fn remove_address(&mut self, index: usize) -> Result<(), FormError> {
        if index >= self.addresses.len() {
            return Err(FormError::NoSuchAddress(index));
        }
        if self.addresses.len() <= 1 {
            return Err(FormError::LastAddress);
        }
        self.addresses.remove(index);
        Ok(())
    }

    /// Set one free-text field of the address at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NoSuchAddress`] if `index` is out of range.
    pub fn set_address_field(
        &mut self,
        index: usize,
        field: AddressField,
        value: &str,
    ) -> Result<(), FormError> {
        let address = &mut self.address_mut(index)?.address;
        let target = match field {
            AddressField::Line1 => &mut address.address_line1,
            AddressField::Line2 => &mut address.address_line2,
        };
        value.clone_into(target);
        Ok(())
    }

    /// Record a postcode keystroke for the address at `index`.
    ///
    /// City and state are left alone unless a lookup succeeds. Returns a
    /// ticket when the postcode is exactly six characters.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NoSuchAddress`] if `index` is out of range.
    pub fn set_postcode(
        &mut self,
        index: usize,
        value: &str,
    ) -> Result<Option<PostcodeLookupTicket>, FormError> {
        let draft = self.address_mut(index)?;
        value.clone_into(&mut draft.address.postcode);
        draft.lookup_seq += 1;

        if let Ok(postcode) = Postcode::parse(value) {
            draft.loading = true;
            Ok(Some(PostcodeLookupTicket {
                address_key: draft.key,
                seq: draft.lookup_seq,
                postcode,
            }))
        } else {
            draft.loading = false;
            Ok(None)
        }
    }

    /// Apply the outcome of a postcode lookup.
    ///
    /// Returns `false` if the address was removed or a newer keystroke
    /// superseded the ticket. A failed lookup leaves city and state as they
    /// were.
    pub fn apply_postcode_lookup(
        &mut self,
        ticket: &PostcodeLookupTicket,
        result: Result<PostcodeDetails, LookupError>,
    ) -> bool {
        let Some(draft) = self
            .addresses
            .iter_mut()
            .find(|draft| draft.key == ticket.address_key)
        else {
            tracing::debug!(postcode = %ticket.postcode, "Address removed before postcode lookup returned");
            return false;
        };
        if draft.lookup_seq != ticket.seq {
            tracing::debug!(postcode = %ticket.postcode, "Discarding stale postcode lookup response");
            return false;
        }
        draft.loading = false;

        match result {
            Ok(details) => {
                details.first_city().clone_into(&mut draft.address.city);
                details.first_state().clone_into(&mut draft.address.state);
            }
            Err(e) => {
                tracing::warn!(postcode = %ticket.postcode, error = %e, "Postcode lookup failed");
            }
        }
        true
    }

    /// Record a postcode keystroke and, if it is complete, look it up.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NoSuchAddress`] if `index` is out of range.
    pub async fn change_postcode<L: PostcodeLookup>(
        &mut self,
        index: usize,
        value: &str,
        lookup: &L,
    ) -> Result<(), FormError> {
        if let Some(ticket) = self.set_postcode(index, value)? {
            let result = lookup.postcode_details(ticket.postcode()).await;
            self.apply_postcode_lookup(&ticket, result);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Validation and submit
    // -------------------------------------------------------------------------

    /// Check every rule against the current values.
    ///
    /// # Errors
    ///
    /// Returns the report listing every violated rule.
    pub fn validate(&self) -> Result<(), ValidationReport> {
        let addresses: Vec<&Address> = self.addresses.iter().map(AddressDraft::address).collect();
        validation::validate(&Submission {
            pan: &self.pan,
            full_name: &self.full_name,
            email: &self.email,
            mobile: &self.mobile,
            addresses: &addresses,
        })
        .into_result()
    }

    /// Validate and build the record this form would save.
    ///
    /// # Errors
    ///
    /// Returns the validation report if any rule is violated.
    pub fn build(&self, now: DateTime<Utc>) -> Result<Customer, ValidationReport> {
        self.validate()?;

        let (pan, mobile) = match (Pan::parse(&self.pan), Mobile::parse(&self.mobile)) {
            (Ok(pan), Ok(mobile)) => (pan, mobile),
            // validate() already rejected both of these
            _ => return Err(ValidationReport::default()),
        };
        let (id, created_at) = match self.mode {
            FormMode::Create => (CustomerId::generate(), Some(now)),
            FormMode::Edit(id) => (id, self.created_at),
        };

        Ok(Customer {
            id,
            pan,
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            mobile,
            addresses: self
                .addresses
                .iter()
                .map(|draft| draft.address.clone())
                .collect(),
            created_at,
            updated_at: Some(now),
        })
    }

    /// Validate, then append or replace the record in `store`.
    ///
    /// # Errors
    ///
    /// See [`SubmitError`].
    pub async fn submit<S: CustomerStore>(&self, store: &S) -> Result<Customer, SubmitError> {
        let customer = self.build(Utc::now())?;
        persist(store, self.mode, customer).await
    }
}

/// Write `customer` into the stored collection.
///
/// The collection is re-read at call time. Create appends; edit replaces the
/// record with the same ID in place.
///
/// # Errors
///
/// Returns [`SubmitError::NotFound`] when editing a record that is no longer
/// stored and [`SubmitError::Store`] if saving fails.
pub async fn persist<S: CustomerStore>(
    store: &S,
    mode: FormMode,
    customer: Customer,
) -> Result<Customer, SubmitError> {
    let mut customers = store.load().await;

    match mode {
        FormMode::Create => customers.push(customer.clone()),
        FormMode::Edit(id) => {
            let slot = customers
                .iter_mut()
                .find(|stored| stored.id == id)
                .ok_or(SubmitError::NotFound(id))?;
            *slot = customer.clone();
        }
    }

    store.save(&customers).await?;
    tracing::info!(customer_id = %customer.id, mode = ?mode, "Customer saved");
    Ok(customer)
}
