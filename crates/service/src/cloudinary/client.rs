use std::time::Duration;

use configs::{CloudinaryConfig, SiteStructureConfig};
use media::{AssetEntry, ResourceType};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::ServiceError;
use crate::observability::UPSTREAM_ERRORS_TOTAL;

const BODY_SNIPPET: usize = 200;

#[derive(Debug, Deserialize)]
struct ResourcePage {
    #[serde(default)]
    resources: Vec<CloudinaryResource>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CloudinaryResource {
    public_id: String,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    resource_type: Option<ResourceType>,
    #[serde(default)]
    bytes: Option<u64>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

impl CloudinaryResource {
    fn into_entry(self, listed_as: ResourceType) -> AssetEntry {
        AssetEntry {
            public_id: self.public_id,
            resource_type: self.resource_type.unwrap_or(listed_as),
            format: self.format,
            bytes: self.bytes,
            width: self.width,
            height: self.height,
        }
    }
}

/// Lists uploaded resources through the Cloudinary Admin API.
#[derive(Clone)]
pub struct CloudinaryClient {
    http: reqwest::Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    max_results: u32,
    max_pages: u32,
}

impl CloudinaryClient {
    pub fn from_config(cfg: &CloudinaryConfig, site: &SiteStructureConfig) -> Result<Self, ServiceError> {
        let (api_key, api_secret) = match (&cfg.api_key, &cfg.api_secret) {
            (Some(k), Some(s)) if !k.trim().is_empty() && !s.trim().is_empty() => (k.clone(), s.clone()),
            _ => return Err(ServiceError::Config("Cloudinary API credentials are not configured".into())),
        };
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Config(format!("http client: {e}")))?;
        Ok(Self {
            http,
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            cloud_name: cfg.cloud_name.clone(),
            api_key,
            api_secret,
            max_results: site.max_results,
            max_pages: site.max_pages,
        })
    }

    /// Every resource of one type under `prefix`, following `next_cursor`.
    pub async fn list_resources(&self, resource_type: ResourceType, prefix: &str) -> Result<Vec<AssetEntry>, ServiceError> {
        let mut out = Vec::new();
        let mut cursor: Option<String> = None;
        for page_no in 0..self.max_pages {
            let page = self.fetch_page(resource_type, prefix, cursor.as_deref()).await?;
            debug!(page = page_no, count = page.resources.len(), %resource_type, "cloudinary resources page");
            out.extend(page.resources.into_iter().map(|r| r.into_entry(resource_type)));
            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => return Ok(out),
            }
        }
        warn!(max_pages = self.max_pages, %resource_type, prefix, "cloudinary listing truncated at page cap");
        Ok(out)
    }

    async fn fetch_page(&self, resource_type: ResourceType, prefix: &str, cursor: Option<&str>) -> Result<ResourcePage, ServiceError> {
        let url = format!("{}/{}/resources/{}/upload", self.api_base, self.cloud_name, resource_type);
        let mut query: Vec<(&str, String)> = vec![
            ("prefix", prefix.to_string()),
            ("max_results", self.max_results.to_string()),
        ];
        if let Some(c) = cursor {
            query.push(("next_cursor", c.to_string()));
        }

        let resp = self
            .http
            .get(&url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .query(&query)
            .send()
            .await
            .map_err(|e| upstream(format!("GET {url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(BODY_SNIPPET).collect();
            return Err(upstream(format!("GET {url}: {status}: {snippet}")));
        }
        resp.json::<ResourcePage>()
            .await
            .map_err(|e| upstream(format!("GET {url}: invalid body: {e}")))
    }
}

fn upstream(msg: String) -> ServiceError {
    UPSTREAM_ERRORS_TOTAL.inc();
    ServiceError::Upstream(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::{HeaderMap, StatusCode}, routing::get, Json, Router};
    use std::collections::HashMap;

    fn configs(api_base: String) -> (CloudinaryConfig, SiteStructureConfig) {
        let cfg = CloudinaryConfig {
            cloud_name: "demo".into(),
            api_key: Some("key".into()),
            api_secret: Some("secret".into()),
            api_base,
            ..Default::default()
        };
        let site = SiteStructureConfig { max_results: 2, ..Default::default() };
        (cfg, site)
    }

    async fn fake_admin_api(headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Result<Json<serde_json::Value>, StatusCode> {
        // "key:secret" base64-encoded
        if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Basic a2V5OnNlY3JldA==") {
            return Err(StatusCode::UNAUTHORIZED);
        }
        let body = match q.get("next_cursor").map(String::as_str) {
            None => serde_json::json!({
                "resources": [
                    {"public_id": "website/pages/a", "format": "jpg", "bytes": 10, "width": 4, "height": 3},
                    {"public_id": "website/pages/b", "format": "png"}
                ],
                "next_cursor": "c1"
            }),
            Some("c1") => serde_json::json!({
                "resources": [{"public_id": "website/components/c"}]
            }),
            Some(_) => return Err(StatusCode::BAD_REQUEST),
        };
        Ok(Json(body))
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn follows_cursor_across_pages() -> Result<(), anyhow::Error> {
        let base = spawn(Router::new().route("/demo/resources/image/upload", get(fake_admin_api))).await;
        let (cfg, site) = configs(base);
        let client = CloudinaryClient::from_config(&cfg, &site)?;
        let list = client.list_resources(ResourceType::Image, "website/").await?;
        let ids: Vec<_> = list.iter().map(|a| a.public_id.as_str()).collect();
        assert_eq!(ids, ["website/pages/a", "website/pages/b", "website/components/c"]);
        assert_eq!(list[0].bytes, Some(10));
        assert_eq!(list[2].resource_type, ResourceType::Image);
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_is_upstream_error() -> Result<(), anyhow::Error> {
        let base = spawn(Router::new().route(
            "/demo/resources/video/upload",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited") }),
        ))
        .await;
        let (cfg, site) = configs(base);
        let client = CloudinaryClient::from_config(&cfg, &site)?;
        let err = client.list_resources(ResourceType::Video, "website/").await.unwrap_err();
        match err {
            ServiceError::Upstream(msg) => assert!(msg.contains("429") && msg.contains("rate limited")),
            other => panic!("unexpected error {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn missing_credentials_is_config_error() {
        let (mut cfg, site) = configs("http://localhost".into());
        cfg.api_secret = None;
        assert!(matches!(CloudinaryClient::from_config(&cfg, &site), Err(ServiceError::Config(_))));
    }
}
