use std::sync::Arc;

use service::{
    admin::{key_store::AdminKeyRepository, override_store::OverrideRepository},
    media_service::MediaService,
    site_structure::SiteStructureService,
};

/// Shared handler state; every field is cheap to clone.
#[derive(Clone)]
pub struct ServerState {
    pub media: Arc<MediaService>,
    pub site: Arc<SiteStructureService>,
    pub overrides: Arc<dyn OverrideRepository>,
    pub admin_keys: Arc<dyn AdminKeyRepository>,
}
