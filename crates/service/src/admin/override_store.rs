use crate::errors::ServiceError;
use async_trait::async_trait;

use crate::file::override_store::{MediaOverride, MediaOverrideInput};

/// Trait abstraction for the manual remap registry (legacy id -> public id).
#[async_trait]
pub trait OverrideRepository: Send + Sync {
    async fn list(&self) -> Vec<MediaOverride>;
    async fn get(&self, legacy_id: &str) -> Option<MediaOverride>;
    /// Returns the stored record and whether it was newly created.
    async fn upsert(&self, input: MediaOverrideInput) -> Result<(MediaOverride, bool), ServiceError>;
    async fn delete(&self, legacy_id: &str) -> Result<bool, ServiceError>;
    /// Canonical public id for an exact legacy id match.
    async fn lookup(&self, legacy_id: &str) -> Option<String>;
}
