pub mod admin_key_store;
pub mod override_store;
