use std::sync::Arc;

use chrono::{DateTime, Utc};
use media::{IdScheme, Resolver};
use serde::{Deserialize, Serialize};

use crate::admin::override_store::OverrideRepository;
use crate::errors::ServiceError;
use crate::storage::json_map_store::JsonMapStore;

/// Manual remap of one legacy id to a canonical public id.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MediaOverride {
    pub legacy_id: String,
    pub public_id: String,
    #[serde(default)]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update input; timestamps are set server side.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MediaOverrideInput {
    pub legacy_id: String,
    pub public_id: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl MediaOverrideInput {
    /// The target must already be canonical and the legacy id must not be.
    pub fn validate(&self, resolver: &Resolver) -> Result<(), ServiceError> {
        let legacy = self.legacy_id.trim();
        let target = self.public_id.trim();
        if legacy.is_empty() {
            return Err(ServiceError::Validation("legacy_id must not be empty".into()));
        }
        if target.is_empty() {
            return Err(ServiceError::Validation("public_id must not be empty".into()));
        }
        let resolved = resolver.resolve(target)?;
        if resolved.scheme != IdScheme::Canonical || resolved.public_id != target {
            return Err(ServiceError::Validation(format!(
                "public_id '{target}' must be a normalized path under '{}'",
                resolver.rules().root_prefix()
            )));
        }
        if legacy == target {
            return Err(ServiceError::Validation("legacy_id and public_id are identical".into()));
        }
        // Canonical ids must keep resolving to themselves.
        if resolver.resolve(legacy)?.scheme == IdScheme::Canonical {
            return Err(ServiceError::Validation(format!(
                "legacy_id '{legacy}' is already a canonical id and cannot be remapped"
            )));
        }
        Ok(())
    }
}

/// File-backed override registry keyed by legacy id.
pub struct OverrideStore {
    store: Arc<JsonMapStore<String, MediaOverride>>,
    resolver: Resolver,
}

impl OverrideStore {
    /// Initialize the store, creating an empty file if missing.
    pub async fn new<P: Into<std::path::PathBuf>>(path: P, resolver: Resolver) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::<String, MediaOverride>::new(path).await?;
        Ok(Arc::new(Self { store, resolver }))
    }

    pub async fn list(&self) -> Vec<MediaOverride> {
        self.store.list().await.into_iter().map(|(_, v)| v).collect()
    }

    pub async fn get(&self, legacy_id: &str) -> Option<MediaOverride> {
        self.store.get(&legacy_id.trim().to_string()).await
    }

    pub async fn upsert(&self, input: MediaOverrideInput) -> Result<(MediaOverride, bool), ServiceError> {
        input.validate(&self.resolver)?;
        let legacy_id = input.legacy_id.trim().to_string();
        let public_id = input.public_id.trim().to_string();
        let note = input.note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        let now = Utc::now();
        self.store
            .update_map(|map| {
                if let Some(other) = map.values().find(|o| o.public_id == legacy_id) {
                    return Err(ServiceError::Validation(format!(
                        "'{legacy_id}' is the target of the override for '{}'; overrides cannot chain",
                        other.legacy_id
                    )));
                }
                if map.contains_key(&public_id) {
                    return Err(ServiceError::Validation(format!(
                        "'{public_id}' is itself overridden; overrides cannot chain"
                    )));
                }
                let created = !map.contains_key(&legacy_id);
                let record = map
                    .entry(legacy_id.clone())
                    .and_modify(|rec| {
                        rec.public_id = public_id.clone();
                        rec.note = note.clone();
                        rec.updated_at = now;
                    })
                    .or_insert_with(|| MediaOverride {
                        legacy_id: legacy_id.clone(),
                        public_id: public_id.clone(),
                        note: note.clone(),
                        created_at: now,
                        updated_at: now,
                    })
                    .clone();
                Ok((record, created))
            })
            .await
    }

    pub async fn delete(&self, legacy_id: &str) -> Result<bool, ServiceError> {
        self.store.remove(&legacy_id.trim().to_string()).await
    }

    pub async fn lookup(&self, legacy_id: &str) -> Option<String> {
        self.get(legacy_id).await.map(|o| o.public_id)
    }
}

#[async_trait::async_trait]
impl OverrideRepository for OverrideStore {
    async fn list(&self) -> Vec<MediaOverride> { self.list().await }
    async fn get(&self, legacy_id: &str) -> Option<MediaOverride> { self.get(legacy_id).await }
    async fn upsert(&self, input: MediaOverrideInput) -> Result<(MediaOverride, bool), ServiceError> { self.upsert(input).await }
    async fn delete(&self, legacy_id: &str) -> Result<bool, ServiceError> { self.delete(legacy_id).await }
    async fn lookup(&self, legacy_id: &str) -> Option<String> { self.lookup(legacy_id).await }
}
