//! Service layer on top of the pure `media` crate.
//! - File-backed stores for overrides and admin keys.
//! - Asset listings from Cloudinary or a local manifest.
//! - The resolution facade used by the HTTP handlers.

pub mod errors;
pub mod observability;
pub mod storage;
pub mod admin;
pub mod file;
pub mod cloudinary;
pub mod assets;
pub mod site_structure;
pub mod media_service;
#[cfg(test)]
pub mod test_support;
