use std::sync::Arc;
use std::time::Duration;

use media::SiteTree;
use moka::future::Cache;
use tracing::info;

use crate::assets::AssetSource;
use crate::errors::ServiceError;
use crate::observability::{SITE_STRUCTURE_CACHE_HITS, SITE_STRUCTURE_CACHE_MISSES};

/// Folder tree of everything under the root folder, cached with a TTL.
pub struct SiteStructureService {
    source: Arc<dyn AssetSource>,
    root: String,
    cache: Cache<String, Arc<SiteTree>>,
}

impl SiteStructureService {
    pub fn new(source: Arc<dyn AssetSource>, root: impl Into<String>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(8).time_to_live(ttl).build();
        Self { source, root: root.into(), cache }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Cached tree, rebuilt when missing, expired or `refresh` is set.
    pub async fn get(&self, refresh: bool) -> Result<Arc<SiteTree>, ServiceError> {
        if !refresh {
            if let Some(tree) = self.cache.get(&self.root).await {
                SITE_STRUCTURE_CACHE_HITS.inc();
                return Ok(tree);
            }
        }
        SITE_STRUCTURE_CACHE_MISSES.inc();

        let prefix = format!("{}/", self.root);
        let assets = self.source.list_assets(&prefix).await?;
        let tree = Arc::new(SiteTree::build(&self.root, &assets));
        info!(
            source = self.source.name(),
            total = tree.total_assets,
            skipped = tree.skipped,
            "site structure rebuilt"
        );
        self.cache.insert(self.root.clone(), Arc::clone(&tree)).await;
        Ok(tree)
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate(&self.root).await;
    }
}
