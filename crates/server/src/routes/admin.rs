use axum::{
    extract::{Path, Query, Request, State},
    http::{StatusCode, Uri},
    middleware::Next,
    response::Response,
    Json,
};
use serde::Deserialize;
use service::admin::key_store::AdminKeyRecord;
use tracing::{info, warn};

use crate::errors::JsonApiError;
use crate::state::ServerState;

#[derive(Deserialize, Debug)]
pub struct SetApiKeyRequest {
    pub label: String,
    pub api_key: String,
}

#[utoipa::path(get, path = "/admin/api-keys", tag = "admin", responses((status = 200, description = "Labels with key hints"), (status = 401, description = "Unauthorized")))]
pub async fn list_api_keys(State(state): State<ServerState>) -> Json<Vec<AdminKeyRecord>> {
    Json(state.admin_keys.list().await)
}

#[utoipa::path(post, path = "/admin/api-keys", tag = "admin", request_body = crate::openapi::ApiKeyRecordDoc, responses((status = 200, description = "OK"), (status = 400, description = "Bad Request")))]
pub async fn set_api_key(
    State(state): State<ServerState>,
    Json(payload): Json<SetApiKeyRequest>,
) -> Result<Json<serde_json::Value>, JsonApiError> {
    let label = payload.label.trim().to_string();
    state.admin_keys.set(label.clone(), payload.api_key).await?;
    info!(%label, "admin key stored");
    Ok(Json(serde_json::json!({"ok": true})))
}

#[utoipa::path(delete, path = "/admin/api-keys/{label}", tag = "admin", params(("label" = String, Path,)), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete_api_key(
    State(state): State<ServerState>,
    Path(label): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    match state.admin_keys.delete(&label).await? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(format!("no key labelled '{label}'")))),
    }
}

/// Middleware: require a stored admin key in `X-API-Key` (or query `api_key`).
pub async fn require_api_key(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let key = req
        .headers()
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .or_else(|| query_api_key(req.uri()));

    let key = match key {
        Some(k) if !k.trim().is_empty() => k,
        _ => return Err(JsonApiError::unauthorized()),
    };

    if !state.admin_keys.verify(&key).await {
        warn!(path = %req.uri().path(), "rejected admin request with unknown key");
        return Err(JsonApiError::unauthorized());
    }

    Ok(next.run(req).await)
}

#[derive(Deserialize)]
struct ApiKeyQuery {
    api_key: Option<String>,
}

/// `api_key` from the query string, percent-decoded.
fn query_api_key(uri: &Uri) -> Option<String> {
    Query::<ApiKeyQuery>::try_from_uri(uri).ok()?.0.api_key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_from_query_string() {
        let key = |q: &str| query_api_key(&q.parse::<Uri>().expect("uri"));
        assert_eq!(key("/admin/api-keys?id=x&api_key=secret123").as_deref(), Some("secret123"));
        assert_eq!(key("/admin/api-keys?api_key=ab%2Bc%26d%25e").as_deref(), Some("ab+c&d%e"));
        assert_eq!(key("/admin/api-keys?id=x"), None);
        assert_eq!(key("/admin/api-keys"), None);
    }
}
