use axum::{
    extract::{Query, State},
    Json,
};
use media::SiteTree;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::errors::JsonApiError;
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct SiteStructureQuery {
    #[serde(default, deserialize_with = "flag")]
    pub refresh: bool,
}

/// Query flag: bare `?refresh`, `1`, `true`, `yes` and `on` all mean true.
fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(d)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(de::Error::custom(format!("invalid flag value '{other}'"))),
    }
}

#[derive(Debug, Serialize)]
pub struct SiteStructureResponse {
    pub source: &'static str,
    #[serde(flatten)]
    pub tree: SiteTree,
}

#[utoipa::path(
    get,
    path = "/api/media/site-structure",
    tag = "media",
    params(("refresh" = Option<String>, Query, description = "Bypass the cache: bare flag, 1, true, yes or on")),
    responses((status = 200, description = "Folder tree under the root folder"), (status = 502, description = "Asset source failed"))
)]
pub async fn get_site_structure(
    State(state): State<ServerState>,
    Query(q): Query<SiteStructureQuery>,
) -> Result<Json<SiteStructureResponse>, JsonApiError> {
    let tree = state.site.get(q.refresh).await?;
    Ok(Json(SiteStructureResponse { source: state.site.source_name(), tree: tree.as_ref().clone() }))
}
