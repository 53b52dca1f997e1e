//! Client-side state containers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` tracks who is logged in and owns the persisted token's
//! lifecycle; `report` holds the transient dashboard interaction.

pub mod report;
pub mod session;
