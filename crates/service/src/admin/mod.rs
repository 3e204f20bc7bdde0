//! Trait seams for admin-managed state.

pub mod key_store;
pub mod override_store;
