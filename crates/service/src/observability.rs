use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder,
};

// Prometheus metrics (default registry)
pub static RESOLUTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "media_resolutions_total",
        "Media ids resolved, by matching scheme",
        &["scheme"]
    )
    .expect("register media_resolutions_total")
});

pub static URLS_BUILT_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "media_urls_built_total",
        "Delivery URLs generated, by kind",
        &["kind"]
    )
    .expect("register media_urls_built_total")
});

pub static SITE_STRUCTURE_CACHE_HITS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "media_site_structure_cache_hits_total",
        "Site structure requests served from cache"
    )
    .expect("register site_structure_cache_hits")
});

pub static SITE_STRUCTURE_CACHE_MISSES: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "media_site_structure_cache_misses_total",
        "Site structure rebuilds"
    )
    .expect("register site_structure_cache_misses")
});

pub static UPSTREAM_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "media_upstream_errors_total",
        "Failed Cloudinary Admin API calls"
    )
    .expect("register upstream_errors_total")
});

/// Prometheus text exposition of the default registry.
pub fn encode_metrics() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("metrics encode error: {e}"))?;
    String::from_utf8(buffer).map_err(|e| format!("metrics encode error: {e}"))
}
