//! Customer Registry Core - Domain library.
//!
//! This crate provides everything the registry front ends share:
//! - `web` - Server-rendered list and form views
//! - `cli` - Command-line tools against the same store
//!
//! # Architecture
//!
//! The core crate contains types, state machines and traits - no filesystem
//! access and no HTTP clients. Storage and the remote lookups are reached
//! through [`CustomerStore`], [`IdentityLookup`] and [`PostcodeLookup`];
//! concrete implementations live in the web crate.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, PAN, mobile numbers and postcodes
//! - [`customer`] - The persisted customer and address records
//! - [`validation`] - Submit-time rules and the aggregated report
//! - [`form`] - Create/edit form state machine
//! - [`list`] - List view model
//! - [`store`] - Storage contract and in-memory store
//! - [`lookup`] - Remote lookup contracts and response shapes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod customer;
pub mod form;
pub mod list;
pub mod lookup;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use customer::{Address, Customer, MAX_ADDRESSES};
pub use form::{AddressField, CustomerForm, FormError, FormMode, SubmitError};
pub use list::{CustomerList, ListError};
pub use lookup::{IdentityLookup, LookupError, PanVerification, PostcodeDetails, PostcodeLookup};
pub use store::{CUSTOMERS_KEY, CustomerStore, MemoryStore, StoreError};
pub use types::*;
pub use validation::{ValidationReport, Violation};
