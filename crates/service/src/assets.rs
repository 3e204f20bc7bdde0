//! Where the site-structure tree gets its list of public ids from.

use std::path::PathBuf;

use async_trait::async_trait;
use media::{AssetEntry, ResourceType};
use serde::Deserialize;
use tracing::warn;

use crate::cloudinary::CloudinaryClient;
use crate::errors::ServiceError;

#[async_trait]
pub trait AssetSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn list_assets(&self, prefix: &str) -> Result<Vec<AssetEntry>, ServiceError>;
}

#[async_trait]
impl AssetSource for CloudinaryClient {
    fn name(&self) -> &'static str {
        "cloudinary"
    }

    async fn list_assets(&self, prefix: &str) -> Result<Vec<AssetEntry>, ServiceError> {
        let mut all = self.list_resources(ResourceType::Image, prefix).await?;
        all.extend(self.list_resources(ResourceType::Video, prefix).await?);
        Ok(all)
    }
}

/// Manifest files are either a bare array or a Cloudinary-style `{"resources": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestFile {
    List(Vec<AssetEntry>),
    Wrapped { resources: Vec<AssetEntry> },
}

/// Asset listing read from a local JSON manifest on every call.
pub struct ManifestSource {
    path: PathBuf,
}

impl ManifestSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AssetSource for ManifestSource {
    fn name(&self) -> &'static str {
        "manifest"
    }

    async fn list_assets(&self, prefix: &str) -> Result<Vec<AssetEntry>, ServiceError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "asset manifest not found; site structure is empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(ServiceError::Storage(format!("{}: {e}", self.path.display()))),
        };
        let manifest: ManifestFile = serde_json::from_slice(&bytes)
            .map_err(|e| ServiceError::Storage(format!("{}: {e}", self.path.display())))?;
        let entries = match manifest {
            ManifestFile::List(v) => v,
            ManifestFile::Wrapped { resources } => resources,
        };
        Ok(entries.into_iter().filter(|a| a.public_id.starts_with(prefix)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_path;

    #[tokio::test]
    async fn reads_both_manifest_shapes() -> Result<(), anyhow::Error> {
        let tmp = temp_path("assets_manifest");
        tokio::fs::write(&tmp, r#"[{"public_id": "website/a"}, {"public_id": "other/b"}]"#).await?;
        let src = ManifestSource::new(&tmp);
        let list = src.list_assets("website/").await?;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].resource_type, ResourceType::Image);

        tokio::fs::write(&tmp, r#"{"resources": [{"public_id": "website/v", "resource_type": "video"}]}"#).await?;
        let list = src.list_assets("website/").await?;
        assert_eq!(list[0].resource_type, ResourceType::Video);
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn missing_manifest_is_empty_and_garbage_is_error() -> Result<(), anyhow::Error> {
        let tmp = temp_path("assets_manifest_missing");
        let src = ManifestSource::new(&tmp);
        assert!(src.list_assets("").await?.is_empty());
        tokio::fs::write(&tmp, "nope").await?;
        assert!(matches!(src.list_assets("").await, Err(ServiceError::Storage(_))));
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
