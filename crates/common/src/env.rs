//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories and files exist at startup.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the data directory exists; warn when an optional file is missing.
pub async fn ensure_env(data_dir: &str, optional_files: &[&str]) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    for file in optional_files {
        if tokio::fs::metadata(file).await.is_err() {
            warn!(%file, "optional file not found; it will be created or treated as empty");
        }
    }
    info!(%data_dir, "runtime environment ready");
    Ok(())
}

/// Join a file name onto the data directory unless it is already a path.
pub fn data_path(data_dir: &str, file: &str) -> String {
    let p = Path::new(file);
    if p.is_absolute() || file.contains('/') {
        file.to_string()
    } else {
        Path::new(data_dir).join(file).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_path_joins_bare_names_only() {
        assert_eq!(data_path("data", "overrides.json"), "data/overrides.json");
        assert_eq!(data_path("data", "/tmp/x.json"), "/tmp/x.json");
        assert_eq!(data_path("data", "other/x.json"), "other/x.json");
    }

    #[tokio::test]
    async fn ensure_env_creates_data_dir() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("media_env_{}", uuid::Uuid::new_v4()));
        let dir_str = dir.to_string_lossy().into_owned();
        ensure_env(&dir_str, &["missing.json"]).await?;
        assert!(tokio::fs::metadata(&dir).await?.is_dir());
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
