//! Core types for the customer registry.
//!
//! This module provides type-safe wrappers for the validated fields of a
//! customer record.

pub mod id;
pub mod mobile;
pub mod pan;
pub mod postcode;

pub use id::{CustomerId, IdError};
pub use mobile::{Mobile, MobileError};
pub use pan::{Pan, PanError};
pub use postcode::{Postcode, PostcodeError};
