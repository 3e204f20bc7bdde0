use std::sync::Arc;

use tracing::info;

use crate::admin::key_store::{AdminKeyRecord, AdminKeyRepository};
use crate::errors::ServiceError;
use crate::storage::json_map_store::JsonMapStore;

pub const BOOTSTRAP_LABEL: &str = "bootstrap";
const MIN_KEY_LEN: usize = 8;

/// File-backed store for admin API keys, persisted as `label -> key` JSON.
pub struct AdminKeyStore {
    store: Arc<JsonMapStore<String, String>>,
}

fn hint(key: &str) -> String {
    let shown: String = key.chars().take(4).collect();
    format!("{shown}…")
}

impl AdminKeyStore {
    /// Initialize the store from the given file path. Creates the file if missing.
    pub async fn new<P: Into<std::path::PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::<String, String>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }

    /// Store the configured bootstrap key under a fixed label.
    pub async fn seed_bootstrap(&self, key: &str) -> Result<(), ServiceError> {
        self.set(BOOTSTRAP_LABEL.to_string(), key.to_string()).await?;
        info!(label = BOOTSTRAP_LABEL, "bootstrap admin key installed");
        Ok(())
    }

    pub async fn list(&self) -> Vec<AdminKeyRecord> {
        self.store
            .list()
            .await
            .into_iter()
            .map(|(label, key)| AdminKeyRecord { key_hint: hint(&key), label })
            .collect()
    }

    /// Upsert the key for a label and persist.
    pub async fn set(&self, label: String, api_key: String) -> Result<(), ServiceError> {
        let label = label.trim().to_string();
        let api_key = api_key.trim().to_string();
        if label.is_empty() {
            return Err(ServiceError::Validation("label must not be empty".into()));
        }
        if api_key.len() < MIN_KEY_LEN {
            return Err(ServiceError::Validation(format!("api key must be at least {MIN_KEY_LEN} characters")));
        }
        self.store.insert(label, api_key).await.map(|_| ())
    }

    /// Delete the key for a label; returns whether an entry existed.
    pub async fn delete(&self, label: &str) -> Result<bool, ServiceError> {
        self.store.remove(&label.to_string()).await
    }

    /// Whether the presented key matches any stored key.
    pub async fn verify(&self, api_key: &str) -> bool {
        let api_key = api_key.trim();
        !api_key.is_empty() && self.store.any_value(|v| v == api_key).await
    }
}

#[async_trait::async_trait]
impl AdminKeyRepository for AdminKeyStore {
    async fn list(&self) -> Vec<AdminKeyRecord> { self.list().await }
    async fn set(&self, label: String, api_key: String) -> Result<(), ServiceError> { self.set(label, api_key).await }
    async fn delete(&self, label: &str) -> Result<bool, ServiceError> { self.delete(label).await }
    async fn verify(&self, api_key: &str) -> bool { self.verify(api_key).await }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_path;

    #[tokio::test]
    async fn admin_key_store_basic_crud() -> Result<(), anyhow::Error> {
        let tmp = temp_path("svc_admin_keys");
        let store = AdminKeyStore::new(&tmp).await?;
        assert!(store.list().await.is_empty());

        store.set("alice".into(), "alice-key-1".into()).await?;
        store.set(" bob ".into(), "bob-key-22".into()).await?;
        let list = store.list().await;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], AdminKeyRecord { label: "alice".into(), key_hint: "alic…".into() });
        assert_eq!(list[1].label, "bob");
        assert!(store.verify("alice-key-1").await);
        assert!(!store.verify("").await);
        assert!(!store.verify("nope-nope").await);

        assert!(store.delete("alice").await?);
        assert!(!store.verify("alice-key-1").await);

        let store2 = AdminKeyStore::new(&tmp).await?;
        assert!(store2.verify("bob-key-22").await);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn rejects_short_keys_and_blank_labels() -> Result<(), anyhow::Error> {
        let tmp = temp_path("svc_admin_keys_invalid");
        let store = AdminKeyStore::new(&tmp).await?;
        assert!(matches!(store.set("x".into(), "short".into()).await, Err(ServiceError::Validation(_))));
        assert!(matches!(store.set("  ".into(), "long-enough-key".into()).await, Err(ServiceError::Validation(_))));
        store.seed_bootstrap("bootstrap-secret").await?;
        assert!(store.verify("bootstrap-secret").await);
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
