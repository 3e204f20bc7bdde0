use crate::errors::ServiceError;
use async_trait::async_trait;

/// A stored admin key with only a short hint of the secret.
#[derive(Clone, Debug, serde::Serialize, PartialEq, Eq)]
pub struct AdminKeyRecord {
    pub label: String,
    pub key_hint: String,
}

/// Trait abstraction for admin API key storage.
/// Implementations can be file-backed, database-backed, or remote KV.
#[async_trait]
pub trait AdminKeyRepository: Send + Sync {
    async fn list(&self) -> Vec<AdminKeyRecord>;
    async fn set(&self, label: String, api_key: String) -> Result<(), ServiceError>;
    async fn delete(&self, label: &str) -> Result<bool, ServiceError>;
    async fn verify(&self, api_key: &str) -> bool;
}
