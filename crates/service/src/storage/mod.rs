//! Storage abstractions for service layer
//!
//! Reusable file-backed stores shared by the override registry and the
//! admin key store.

pub mod json_map_store;
