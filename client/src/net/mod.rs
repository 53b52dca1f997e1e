//! Networking for the report service REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` is the gateway every request goes through, and `types` defines the
//! wire schema.

pub mod api;
pub mod types;
