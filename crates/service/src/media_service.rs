//! Resolution facade: overrides, rule-based resolution, presets and URLs.

use std::collections::BTreeMap;
use std::sync::Arc;

use media::{
    DeliveryUrlBuilder, IdScheme, MediaError, ResolvedMedia, Resolver, TransformParams, Transformation,
};
use serde::Serialize;

use crate::admin::override_store::OverrideRepository;
use crate::errors::ServiceError;
use crate::observability::{RESOLUTIONS_TOTAL, URLS_BUILT_TOTAL};

pub const MAX_BATCH: usize = 200;

#[derive(Debug, Clone, Serialize)]
pub struct DeliveredMedia {
    #[serde(flatten)]
    pub media: ResolvedMedia,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SrcsetMedia {
    #[serde(flatten)]
    pub media: ResolvedMedia,
    pub srcset: String,
    /// Largest width, for the plain `src` attribute.
    pub src: String,
    pub widths: Vec<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResolvedMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct MediaService {
    resolver: Resolver,
    urls: DeliveryUrlBuilder,
    presets: BTreeMap<String, Transformation>,
    srcset_widths: Vec<u32>,
    overrides: Arc<dyn OverrideRepository>,
}

impl MediaService {
    pub fn new(
        resolver: Resolver,
        urls: DeliveryUrlBuilder,
        presets: BTreeMap<String, Transformation>,
        srcset_widths: Vec<u32>,
        overrides: Arc<dyn OverrideRepository>,
    ) -> Self {
        Self { resolver, urls, presets, srcset_widths, overrides }
    }

    /// Override registry for non-canonical ids, then the resolver's priority list.
    pub async fn resolve(&self, raw: &str) -> Result<ResolvedMedia, ServiceError> {
        if raw.trim().is_empty() {
            return Err(MediaError::EmptyId.into());
        }
        let by_rules = self.resolver.resolve(raw)?;
        // Canonical ids are never remapped.
        let lookup = match by_rules.scheme {
            IdScheme::Canonical => None,
            _ => self.overrides.lookup(raw.trim()).await,
        };
        let resolved = match lookup {
            Some(target) => {
                let mut r = self.resolver.resolve(&target)?;
                r.input = raw.to_string();
                r.scheme = IdScheme::Override;
                r
            }
            None => by_rules,
        };
        RESOLUTIONS_TOTAL.with_label_values(&[resolved.scheme.as_str()]).inc();
        Ok(resolved)
    }

    /// Order-preserving; a bad id fails only its own item.
    pub async fn resolve_batch(&self, ids: &[String]) -> Result<Vec<BatchItem>, ServiceError> {
        if ids.len() > MAX_BATCH {
            return Err(ServiceError::Validation(format!("at most {MAX_BATCH} ids per batch")));
        }
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let item = match self.resolve(id).await {
                Ok(r) => BatchItem { input: id.clone(), result: Some(r), error: None },
                Err(e) => BatchItem { input: id.clone(), result: None, error: Some(e.to_string()) },
            };
            out.push(item);
        }
        Ok(out)
    }

    /// Explicit params layered over an optional named preset.
    pub fn transformation(&self, params: &TransformParams, preset: Option<&str>) -> Result<Transformation, ServiceError> {
        let explicit = params.parse()?;
        let merged = match preset.map(str::trim).filter(|p| !p.is_empty()) {
            Some(name) => {
                let base = self
                    .presets
                    .get(name)
                    .ok_or_else(|| ServiceError::Validation(format!("unknown preset '{name}'")))?;
                explicit.merged_over(base)
            }
            None => explicit,
        };
        merged.validate()?;
        Ok(merged)
    }

    pub async fn delivery_url(&self, raw: &str, params: &TransformParams, preset: Option<&str>) -> Result<DeliveredMedia, ServiceError> {
        let tx = self.transformation(params, preset)?;
        let media = self.resolve(raw).await?;
        let url = self.urls.build(&media, &tx)?;
        URLS_BUILT_TOTAL.with_label_values(&["url"]).inc();
        Ok(DeliveredMedia { media, url })
    }

    pub async fn srcset(
        &self,
        raw: &str,
        params: &TransformParams,
        preset: Option<&str>,
        widths: Option<Vec<u32>>,
    ) -> Result<SrcsetMedia, ServiceError> {
        let tx = self.transformation(params, preset)?;
        let media = self.resolve(raw).await?;
        let mut widths = widths.filter(|w| !w.is_empty()).unwrap_or_else(|| self.srcset_widths.clone());
        widths.sort_unstable();
        widths.dedup();
        let srcset = self.urls.srcset(&media, &tx, &widths)?;
        let largest = widths.last().copied().ok_or_else(|| ServiceError::Validation("no srcset widths".into()))?;
        let src = self.urls.build(&media, &Transformation { width: Some(largest), ..tx })?;
        URLS_BUILT_TOTAL.with_label_values(&["srcset"]).inc();
        Ok(SrcsetMedia { media, srcset, src, widths })
    }

    pub async fn poster(&self, raw: &str, params: &TransformParams, preset: Option<&str>) -> Result<DeliveredMedia, ServiceError> {
        let tx = self.transformation(params, preset)?;
        let media = self.resolve(raw).await?;
        let url = self.urls.poster(&media, &tx)?;
        URLS_BUILT_TOTAL.with_label_values(&["poster"]).inc();
        Ok(DeliveredMedia { media, url })
    }
}
