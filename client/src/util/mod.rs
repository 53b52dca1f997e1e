//! Helpers shared by the gateway and session layers.
//!
//! SYSTEM CONTEXT
//! ==============
//! These modules isolate environment concerns (disk storage, navigation) from
//! the request and state logic so both can be swapped in tests.

pub mod nav;
pub mod token_store;
