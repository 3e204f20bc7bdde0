use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String, pub version: String }

#[derive(ToSchema)]
pub struct ResolvedMediaDoc {
    pub input: String,
    pub public_id: String,
    /// `image`, `video` or `raw`.
    pub resource_type: String,
    pub format: Option<String>,
    /// `override`, `delivery_url`, `canonical`, a legacy scheme, or `unknown`.
    pub scheme: String,
}

#[derive(ToSchema)]
pub struct BatchRequestDoc { pub ids: Vec<String> }

#[derive(ToSchema)]
pub struct MediaOverrideInputDoc { pub legacy_id: String, pub public_id: String, pub note: Option<String> }

#[derive(ToSchema)]
pub struct ApiKeyRecordDoc { pub label: String, pub api_key: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::media::resolve_one,
        crate::routes::media::resolve_batch,
        crate::routes::media::delivery_url,
        crate::routes::media::srcset,
        crate::routes::media::poster,
        crate::routes::site_structure::get_site_structure,
        crate::routes::overrides::list_overrides,
        crate::routes::overrides::upsert_override,
        crate::routes::overrides::delete_override,
        crate::routes::admin::list_api_keys,
        crate::routes::admin::set_api_key,
        crate::routes::admin::delete_api_key,
    ),
    components(
        schemas(
            HealthResponse,
            ResolvedMediaDoc,
            BatchRequestDoc,
            MediaOverrideInputDoc,
            ApiKeyRecordDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "media"),
        (name = "admin")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_media_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/api/media/resolve", "/api/media/url", "/admin/media/overrides", "/admin/api-keys/{label}"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
