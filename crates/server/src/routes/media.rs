use axum::{
    extract::{Query, State},
    Json,
};
use media::{ResolvedMedia, TransformParams};
use serde::Deserialize;
use service::media_service::{BatchItem, DeliveredMedia, SrcsetMedia};

use crate::errors::JsonApiError;
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchItem>,
}

/// `id` plus the transformation query keys (`w`, `h`, `c`, `g`, `q`, `f`, `dpr`).
#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub preset: Option<String>,
    /// Comma-separated, srcset only.
    #[serde(default)]
    pub widths: Option<String>,
    #[serde(flatten)]
    pub params: TransformParams,
}

#[utoipa::path(
    get,
    path = "/api/media/resolve",
    tag = "media",
    params(("id" = String, Query, description = "Legacy, canonical or delivery-URL identifier")),
    responses((status = 200, description = "Resolved", body = crate::openapi::ResolvedMediaDoc), (status = 400, description = "Empty id"))
)]
pub async fn resolve_one(
    State(state): State<ServerState>,
    Query(q): Query<ResolveQuery>,
) -> Result<Json<ResolvedMedia>, JsonApiError> {
    Ok(Json(state.media.resolve(&q.id).await?))
}

#[utoipa::path(
    post,
    path = "/api/media/resolve",
    tag = "media",
    request_body = crate::openapi::BatchRequestDoc,
    responses((status = 200, description = "Per-id results in request order"), (status = 400, description = "Batch too large"))
)]
pub async fn resolve_batch(
    State(state): State<ServerState>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, JsonApiError> {
    let results = state.media.resolve_batch(&req.ids).await?;
    Ok(Json(BatchResponse { results }))
}

#[utoipa::path(
    get,
    path = "/api/media/url",
    tag = "media",
    params(
        ("id" = String, Query, description = "Media identifier"),
        ("preset" = Option<String>, Query, description = "Named transformation preset"),
        ("w" = Option<String>, Query,), ("h" = Option<String>, Query,), ("c" = Option<String>, Query,),
        ("g" = Option<String>, Query,), ("q" = Option<String>, Query,), ("f" = Option<String>, Query,),
        ("dpr" = Option<String>, Query,)
    ),
    responses((status = 200, description = "Delivery URL"), (status = 400, description = "Invalid id or transformation"))
)]
pub async fn delivery_url(
    State(state): State<ServerState>,
    Query(q): Query<UrlQuery>,
) -> Result<Json<DeliveredMedia>, JsonApiError> {
    let out = state.media.delivery_url(&q.id, &q.params, q.preset.as_deref()).await?;
    Ok(Json(out))
}

#[utoipa::path(
    get,
    path = "/api/media/srcset",
    tag = "media",
    params(
        ("id" = String, Query, description = "Media identifier"),
        ("widths" = Option<String>, Query, description = "Comma-separated widths, defaults to the configured list")
    ),
    responses((status = 200, description = "srcset attribute value"), (status = 400, description = "Invalid input"))
)]
pub async fn srcset(
    State(state): State<ServerState>,
    Query(q): Query<UrlQuery>,
) -> Result<Json<SrcsetMedia>, JsonApiError> {
    let widths = q.widths.as_deref().map(parse_widths).transpose()?;
    let out = state.media.srcset(&q.id, &q.params, q.preset.as_deref(), widths).await?;
    Ok(Json(out))
}

#[utoipa::path(
    get,
    path = "/api/media/poster",
    tag = "media",
    params(("id" = String, Query, description = "Video identifier")),
    responses((status = 200, description = "Poster image URL"), (status = 400, description = "Not a video"))
)]
pub async fn poster(
    State(state): State<ServerState>,
    Query(q): Query<UrlQuery>,
) -> Result<Json<DeliveredMedia>, JsonApiError> {
    let out = state.media.poster(&q.id, &q.params, q.preset.as_deref()).await?;
    Ok(Json(out))
}

fn parse_widths(raw: &str) -> Result<Vec<u32>, JsonApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map_err(|_| JsonApiError::bad_request(format!("invalid width '{s}'")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_are_comma_separated() {
        assert_eq!(parse_widths("320, 640,,960").ok(), Some(vec![320, 640, 960]));
        assert!(parse_widths("320,wide").is_err());
    }
}
