//! # Venue Store
//!
//! This crate looks up Resy venues and the active API key in the MySQL
//! database shared with the operator's tooling.

/// Database client for venue and credential lookups.
pub mod database;
pub use database::*;

/// SQL used by the database client.
pub mod queries;
