use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use common::env::data_path;
use configs::{AppConfig, AssetSourceKind};
use media::{DeliveryUrlBuilder, Resolver};
use service::{
    assets::{AssetSource, ManifestSource},
    cloudinary::CloudinaryClient,
    file::{admin_key_store::AdminKeyStore, override_store::OverrideStore},
    media_service::MediaService,
    site_structure::SiteStructureService,
};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

/// Wire stores, resolver and asset source from an already validated config.
pub async fn build_state(cfg: &AppConfig) -> Result<ServerState, StartupError> {
    let data_dir = cfg.storage.data_dir.as_str();
    let rules = cfg.media.rule_set()?;
    let presets = cfg.media.parsed_presets()?;

    let root = rules.root().to_string();
    let mut resolver = Resolver::new(rules);
    if let Some(host) = &cfg.cloudinary.cdn_host {
        resolver = resolver.with_delivery_host(host.clone());
    }

    let overrides = OverrideStore::new(data_path(data_dir, &cfg.storage.overrides_file), resolver.clone()).await?;
    let admin_keys = AdminKeyStore::new(data_path(data_dir, &cfg.storage.admin_keys_file)).await?;
    match cfg.admin.bootstrap_key.as_deref() {
        Some(key) => admin_keys.seed_bootstrap(key).await?,
        None if admin_keys.list().await.is_empty() => {
            warn!("no admin keys configured; admin routes will reject every request")
        }
        None => {}
    }

    let urls = DeliveryUrlBuilder::new(cfg.cloudinary.cloud_name.clone())
        .secure(cfg.cloudinary.secure)
        .cdn_host(cfg.cloudinary.cdn_host.clone());
    let media = MediaService::new(
        resolver,
        urls,
        presets,
        cfg.media.srcset_widths.clone(),
        overrides.clone(),
    );

    let source: Arc<dyn AssetSource> = match cfg.site_structure.source {
        AssetSourceKind::Cloudinary => Arc::new(CloudinaryClient::from_config(&cfg.cloudinary, &cfg.site_structure)?),
        AssetSourceKind::Manifest => Arc::new(ManifestSource::new(data_path(data_dir, &cfg.storage.manifest_file))),
    };
    let site = SiteStructureService::new(
        source,
        root.clone(),
        Duration::from_secs(cfg.site_structure.cache_ttl_secs),
    );
    info!(
        %root,
        source = site.source_name(),
        cloud = %cfg.cloudinary.cloud_name,
        "media services ready"
    );

    Ok(ServerState {
        media: Arc::new(media),
        site: Arc::new(site),
        overrides,
        admin_keys,
    })
}

pub fn build_app(state: ServerState) -> Router {
    routes::build_router(state, build_cors())
}

/// Serve until Ctrl+C. Logging and `.env` are the caller's job.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    serve(cfg, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl+C; serving until killed");
            std::future::pending::<()>().await;
        }
        info!("shutdown signal received");
    })
    .await
}

/// Prepare the data dir, build the app and serve until `shutdown` completes.
pub async fn serve<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let data_dir = cfg.storage.data_dir.as_str();
    let manifest = data_path(data_dir, &cfg.storage.manifest_file);
    let optional: Vec<&str> = match cfg.site_structure.source {
        AssetSourceKind::Manifest => vec![manifest.as_str()],
        AssetSourceKind::Cloudinary => vec![],
    };
    common::env::ensure_env(data_dir, &optional)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    let state = build_state(&cfg).await?;
    let app = build_app(state);

    let addr = bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "media server listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("media server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serve_stops_on_shutdown_signal() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("media-serve-{}", uuid::Uuid::new_v4()));
        let mut cfg = AppConfig::default();
        cfg.cloudinary.cloud_name = "demo".into();
        cfg.storage.data_dir = dir.to_string_lossy().into_owned();
        cfg.normalize_and_validate()?;
        cfg.server.port = 0;

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(serve(cfg, async {
            let _ = rx.await;
        }));
        let _ = tx.send(());
        tokio::time::timeout(Duration::from_secs(5), handle).await???;
        assert!(tokio::fs::metadata(&dir).await?.is_dir());
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
