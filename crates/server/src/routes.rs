pub mod admin;
pub mod media;
pub mod overrides;
pub mod site_structure;

use axum::{
    http::{header, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::errors::JsonApiError;
use crate::openapi::ApiDoc;
use crate::state::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

pub async fn metrics() -> Result<impl IntoResponse, JsonApiError> {
    let body = service::observability::encode_metrics().map_err(|e| {
        JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Metrics Unavailable", Some(e))
    })?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Public media routes, key-protected admin routes, tracing and CORS.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/api/media/resolve", get(media::resolve_one).post(media::resolve_batch))
        .route("/api/media/url", get(media::delivery_url))
        .route("/api/media/srcset", get(media::srcset))
        .route("/api/media/poster", get(media::poster))
        .route("/api/media/site-structure", get(site_structure::get_site_structure));

    let admin_routes = Router::new()
        .route(
            "/admin/media/overrides",
            get(overrides::list_overrides)
                .put(overrides::upsert_override)
                .delete(overrides::delete_override),
        )
        .route("/admin/api-keys", get(admin::list_api_keys).post(admin::set_api_key))
        .route("/admin/api-keys/:label", delete(admin::delete_api_key))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin::require_api_key));

    public
        .merge(admin_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
