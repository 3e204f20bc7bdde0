use std::{collections::BTreeMap, path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};
use tracing::warn;

use crate::errors::ServiceError;

fn storage_err(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::Storage(e.to_string())
}

/// Generic JSON file-backed ordered map store.
///
/// Persists a `BTreeMap<K, V>` to a JSON file after every mutation. Writes go
/// to a sibling `.tmp` file that is renamed over the original.
pub struct JsonMapStore<K, V> {
    inner: RwLock<BTreeMap<K, V>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Ord + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. Creates the file with an empty map if missing;
    /// an unreadable file is logged and treated as empty.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(storage_err)?;
            }
        }

        let map: BTreeMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %file_path.display(), error = %e, "store file is not valid JSON; starting empty");
                BTreeMap::new()
            }),
            Err(_) => {
                let empty: BTreeMap<K, V> = BTreeMap::new();
                fs::write(&file_path, serde_json::to_vec(&empty).map_err(storage_err)?)
                    .await
                    .map_err(storage_err)?;
                empty
            }
        };

        Ok(Arc::new(Self { inner: RwLock::new(map), file_path }))
    }

    async fn save(&self, map: &BTreeMap<K, V>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(map).map_err(storage_err)?;
        let mut tmp = self.file_path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, data).await.map_err(storage_err)?;
        fs::rename(&tmp, &self.file_path).await.map_err(storage_err)?;
        Ok(())
    }

    /// All entries in key order.
    pub async fn list(&self) -> Vec<(K, V)> {
        let map = self.inner.read().await;
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Insert or replace and persist; returns the previous value.
    pub async fn insert(&self, key: K, value: V) -> Result<Option<V>, ServiceError> {
        let mut map = self.inner.write().await;
        let previous = map.insert(key, value);
        self.save(&map).await?;
        Ok(previous)
    }

    /// Remove a key and persist; returns whether it existed.
    pub async fn remove(&self, key: &K) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        let existed = map.remove(key).is_some();
        if existed {
            self.save(&map).await?;
        }
        Ok(existed)
    }

    /// Whether any value satisfies the predicate.
    pub async fn any_value<F>(&self, f: F) -> bool
    where
        F: Fn(&V) -> bool,
    {
        let map = self.inner.read().await;
        map.values().any(f)
    }

    /// Apply a mutation under the write lock and persist the result.
    /// Nothing is written when `f` fails.
    pub async fn update_map<F, T>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut BTreeMap<K, V>) -> Result<T, ServiceError>,
    {
        let mut map = self.inner.write().await;
        let mut draft = map.clone();
        let out = f(&mut draft)?;
        self.save(&draft).await?;
        *map = draft;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_path;

    #[tokio::test]
    async fn json_map_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = temp_path("json_map_store");
        let store = JsonMapStore::<String, String>::new(&tmp).await?;
        assert_eq!(store.len().await, 0);

        store.insert("b".into(), "2".into()).await?;
        store.insert("a".into(), "1".into()).await?;
        assert!(store.any_value(|v| v == "1").await);
        let keys: Vec<_> = store.list().await.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);

        store
            .update_map(|m| {
                if let Some(v) = m.get_mut("a") { *v = "10".into(); }
                Ok(())
            })
            .await?;
        assert_eq!(store.get(&"a".into()).await.as_deref(), Some("10"));

        assert!(store.remove(&"b".into()).await?);
        assert!(!store.remove(&"b".into()).await?);

        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        assert_eq!(reloaded.len().await, 1);
        assert_eq!(reloaded.get(&"a".into()).await.as_deref(), Some("10"));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_update_leaves_map_untouched() -> Result<(), anyhow::Error> {
        let tmp = temp_path("json_map_store_fail");
        let store = JsonMapStore::<String, u32>::new(&tmp).await?;
        store.insert("n".into(), 1).await?;
        let res = store
            .update_map(|m| {
                m.insert("n".into(), 2);
                Err::<(), _>(ServiceError::Validation("nope".into()))
            })
            .await;
        assert!(res.is_err());
        assert_eq!(store.get(&"n".into()).await, Some(1));
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_starts_empty() -> Result<(), anyhow::Error> {
        let tmp = temp_path("json_map_store_corrupt");
        tokio::fs::write(&tmp, b"{not json").await?;
        let store = JsonMapStore::<String, String>::new(&tmp).await?;
        assert_eq!(store.len().await, 0);
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
