//! Cloudinary Admin API access.

pub mod client;

pub use client::CloudinaryClient;
