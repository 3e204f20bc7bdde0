use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use service::file::override_store::{MediaOverride, MediaOverrideInput};
use tracing::info;

use crate::errors::JsonApiError;
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct UpsertResponse {
    #[serde(rename = "override")]
    pub record: MediaOverride,
    pub created: bool,
}

#[utoipa::path(get, path = "/admin/media/overrides", tag = "admin", responses((status = 200, description = "All overrides"), (status = 401, description = "Unauthorized")))]
pub async fn list_overrides(State(state): State<ServerState>) -> Json<Vec<MediaOverride>> {
    Json(state.overrides.list().await)
}

#[utoipa::path(
    put,
    path = "/admin/media/overrides",
    tag = "admin",
    request_body = crate::openapi::MediaOverrideInputDoc,
    responses((status = 201, description = "Created"), (status = 200, description = "Updated"), (status = 400, description = "Bad Request"))
)]
pub async fn upsert_override(
    State(state): State<ServerState>,
    Json(input): Json<MediaOverrideInput>,
) -> Result<(StatusCode, Json<UpsertResponse>), JsonApiError> {
    let (record, created) = state.overrides.upsert(input).await?;
    info!(legacy_id = %record.legacy_id, public_id = %record.public_id, created, "media override saved");
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(UpsertResponse { record, created })))
}

#[utoipa::path(
    delete,
    path = "/admin/media/overrides",
    tag = "admin",
    params(("id" = String, Query, description = "Legacy id of the override")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_override(
    State(state): State<ServerState>,
    Query(q): Query<DeleteQuery>,
) -> Result<StatusCode, JsonApiError> {
    if q.id.trim().is_empty() {
        return Err(JsonApiError::bad_request("id is required"));
    }
    match state.overrides.delete(q.id.trim()).await? {
        true => {
            info!(legacy_id = %q.id, "media override deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        false => Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(format!("no override for '{}'", q.id)))),
    }
}
