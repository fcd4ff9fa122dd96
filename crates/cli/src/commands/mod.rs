//! Subcommand implementations.
//!
//! Each command takes its collaborators as arguments so it can run against
//! the in-memory store and fake lookups in tests.

pub mod customers;
pub mod lookup;
