//! Placeholder id resolution.
//!
//! Pattern checks run in a fixed priority order and the first match wins:
//! delivery URL, canonical path, legacy prefix rules, then pass-through.

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::errors::MediaError;
use crate::kind::ResourceType;
use crate::normalize::{normalize_path, split_extension};
use crate::scheme::{IdScheme, RuleSet};

pub const DEFAULT_DELIVERY_HOST: &str = "res.cloudinary.com";

/// Transformation keys recognised when skipping segments of a delivery URL.
const TRANSFORM_KEYS: &[&str] = &[
    "a", "ac", "af", "ar", "b", "bo", "br", "c", "co", "d", "dl", "dn", "dpr", "du", "e", "eo",
    "f", "fl", "fn", "fps", "g", "h", "ki", "l", "o", "p", "pg", "q", "r", "so", "sp", "t", "u",
    "vc", "vs", "w", "x", "y", "z",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMedia {
    pub input: String,
    pub public_id: String,
    pub resource_type: ResourceType,
    /// Extension stripped from the input, if any.
    pub format: Option<String>,
    pub scheme: IdScheme,
}

#[derive(Debug, Clone)]
pub struct Resolver {
    rules: RuleSet,
    delivery_hosts: Vec<String>,
}

impl Resolver {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules, delivery_hosts: vec![DEFAULT_DELIVERY_HOST.to_string()] }
    }

    /// Accept delivery URLs served from an additional (private CDN) host.
    pub fn with_delivery_host(mut self, host: impl Into<String>) -> Self {
        let host = host.into().to_ascii_lowercase();
        if !host.is_empty() && !self.delivery_hosts.contains(&host) {
            self.delivery_hosts.push(host);
        }
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The canonical public id for `raw`.
    pub fn public_id(&self, raw: &str) -> Result<String, MediaError> {
        self.resolve(raw).map(|r| r.public_id)
    }

    pub fn resolve(&self, raw: &str) -> Result<ResolvedMedia, MediaError> {
        if raw.trim().is_empty() {
            return Err(MediaError::EmptyId);
        }

        let resolved = self
            .from_delivery_url(raw)
            .or_else(|| self.from_canonical(raw))
            .or_else(|| self.from_legacy(raw))
            .unwrap_or_else(|| ResolvedMedia {
                input: raw.to_string(),
                public_id: raw.to_string(),
                resource_type: ResourceType::infer(raw, split_extension(raw).1.as_deref(), None),
                format: None,
                scheme: IdScheme::Unknown,
            });

        debug!(
            input = %raw,
            public_id = %resolved.public_id,
            scheme = resolved.scheme.as_str(),
            "media id resolved"
        );
        Ok(resolved)
    }

    fn from_canonical(&self, raw: &str) -> Option<ResolvedMedia> {
        let normalized = normalize_path(raw);
        if !self.rules.is_canonical(&normalized) {
            return None;
        }
        let ext = split_extension(&normalized).1;
        Some(ResolvedMedia {
            input: raw.to_string(),
            resource_type: ResourceType::infer(&normalized, ext.as_deref(), None),
            public_id: normalized,
            format: None,
            scheme: IdScheme::Canonical,
        })
    }

    fn from_legacy(&self, raw: &str) -> Option<ResolvedMedia> {
        let normalized = normalize_path(raw);
        let (rule, rest) = self.rules.match_rule(&normalized)?;
        let rest = normalize_path(rest);
        let rest = rest.trim_start_matches('/');
        if rest.is_empty() {
            return None;
        }
        let (stem, ext) = split_extension(rest);
        let public_id = format!("{}{}", rule.canonical, stem);
        Some(ResolvedMedia {
            input: raw.to_string(),
            resource_type: ResourceType::infer(&public_id, ext.as_deref(), rule.resource_type),
            public_id,
            format: ext,
            scheme: rule.scheme,
        })
    }

    fn from_delivery_url(&self, raw: &str) -> Option<ResolvedMedia> {
        let trimmed = raw.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return None;
        }
        let url = Url::parse(trimmed).ok()?;
        let host = url.host_str()?.to_ascii_lowercase();
        if !self.delivery_hosts.contains(&host) {
            return None;
        }
        let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
        let upload = segments
            .windows(2)
            .position(|w| ResourceType::from_segment(w[0]).is_some() && w[1] == "upload")?;
        let resource_type = ResourceType::from_segment(segments[upload])?;
        let tail = &segments[upload + 2..];

        let id_segments = match tail.iter().position(|s| is_version_segment(s)) {
            Some(v) if v + 1 < tail.len() => &tail[v + 1..],
            _ => {
                let skip = tail.iter().take_while(|s| is_transformation_segment(s)).count();
                &tail[skip..]
            }
        };
        if id_segments.is_empty() {
            return None;
        }

        let decoded = id_segments
            .iter()
            .map(|s| urlencoding::decode(s).map(|c| c.into_owned()).unwrap_or_else(|_| s.to_string()))
            .collect::<Vec<_>>()
            .join("/");
        let decoded = normalize_path(&decoded);
        let decoded = decoded.trim_start_matches('/');
        if decoded.is_empty() {
            return None;
        }

        // raw assets keep their extension as part of the public id
        let (public_id, format) = match resource_type {
            ResourceType::Raw => (decoded.to_string(), None),
            _ => {
                let (stem, ext) = split_extension(decoded);
                (stem.to_string(), ext)
            }
        };
        Some(ResolvedMedia {
            input: raw.to_string(),
            public_id,
            resource_type,
            format,
            scheme: IdScheme::DeliveryUrl,
        })
    }
}

fn is_version_segment(s: &str) -> bool {
    s.len() > 1 && s.starts_with('v') && s[1..].bytes().all(|b| b.is_ascii_digit())
}

fn is_transformation_segment(s: &str) -> bool {
    s.split(',').all(|piece| match piece.split_once('_') {
        Some((key, value)) => !value.is_empty() && TRANSFORM_KEYS.contains(&key),
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> Resolver {
        Resolver::new(RuleSet::default_for("website").unwrap())
    }

    #[test]
    fn page_placeholder_maps_to_pages_folder() {
        let r = resolver().resolve("page:services/hero.jpg").unwrap();
        assert_eq!(r.public_id, "website/pages/services/hero");
        assert_eq!(r.scheme, IdScheme::Page);
        assert_eq!(r.format.as_deref(), Some("jpg"));
        assert_eq!(r.resource_type, ResourceType::Image);
    }

    #[test]
    fn component_placeholder_maps_to_components_folder() {
        let r = resolver().resolve("component:navbar/logo.PNG").unwrap();
        assert_eq!(r.public_id, "website/components/navbar/logo");
        assert_eq!(r.scheme, IdScheme::Component);
        assert_eq!(r.format.as_deref(), Some("png"));
    }

    #[test]
    fn bare_paths_use_their_own_folders() {
        let r = resolver().resolve("/videos/clinic-tour.mp4").unwrap();
        assert_eq!(r.public_id, "website/videos/clinic-tour");
        assert_eq!(r.resource_type, ResourceType::Video);

        let r = resolver().resolve("/images//team/dr-smith.webp?w=300").unwrap();
        assert_eq!(r.public_id, "website/images/team/dr-smith");
        assert_eq!(r.scheme, IdScheme::BarePath);

        let r = resolver().resolve("/brand/logo.svg").unwrap();
        assert_eq!(r.public_id, "website/static/brand/logo");
    }

    #[test]
    fn canonical_is_returned_normalized_without_stripping() {
        let r = resolver().resolve(" website//pages/services/hero ").unwrap();
        assert_eq!(r.public_id, "website/pages/services/hero");
        assert_eq!(r.scheme, IdScheme::Canonical);
        assert_eq!(r.format, None);

        let r = resolver().resolve("website/videos/tour.mp4").unwrap();
        assert_eq!(r.public_id, "website/videos/tour.mp4");
        assert_eq!(r.resource_type, ResourceType::Video);
    }

    #[test]
    fn unknown_passes_through_unchanged() {
        for raw in ["hero-banner", "  spaced id ", "legacy:thing", "cms/asset.jpg"] {
            let r = resolver().resolve(raw).unwrap();
            assert_eq!(r.public_id, raw);
            assert_eq!(r.scheme, IdScheme::Unknown);
        }
    }

    #[test]
    fn empty_remainder_falls_through() {
        let r = resolver().resolve("page:").unwrap();
        assert_eq!(r.scheme, IdScheme::Unknown);
        assert_eq!(r.public_id, "page:");
    }

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(resolver().resolve("   "), Err(MediaError::EmptyId));
    }

    #[test]
    fn delivery_url_with_version_and_transformations() {
        let r = resolver()
            .resolve("https://res.cloudinary.com/demo/image/upload/c_fill,w_400/v1712345678/website/pages/about/team.jpg")
            .unwrap();
        assert_eq!(r.public_id, "website/pages/about/team");
        assert_eq!(r.scheme, IdScheme::DeliveryUrl);
        assert_eq!(r.format.as_deref(), Some("jpg"));
    }

    #[test]
    fn delivery_url_without_version_skips_transformations() {
        let r = resolver()
            .resolve("https://res.cloudinary.com/demo/video/upload/q_auto/f_auto/website/videos/My%20Clip.mp4")
            .unwrap();
        assert_eq!(r.public_id, "website/videos/My Clip");
        assert_eq!(r.resource_type, ResourceType::Video);
    }

    #[test]
    fn raw_delivery_url_keeps_extension() {
        let r = resolver()
            .resolve("https://res.cloudinary.com/demo/raw/upload/v1/website/docs/menu.pdf")
            .unwrap();
        assert_eq!(r.public_id, "website/docs/menu.pdf");
        assert_eq!(r.resource_type, ResourceType::Raw);
    }

    #[test]
    fn foreign_urls_are_unknown() {
        let raw = "https://example.com/image/upload/website/a.jpg";
        let r = resolver().resolve(raw).unwrap();
        assert_eq!(r.scheme, IdScheme::Unknown);
        assert_eq!(r.public_id, raw);
    }

    #[test]
    fn custom_cdn_host_is_recognised() {
        let r = resolver()
            .with_delivery_host("Media.Example.com")
            .resolve("https://media.example.com/image/upload/v5/website/images/a.png")
            .unwrap();
        assert_eq!(r.public_id, "website/images/a");
    }

    #[test]
    fn folder_that_looks_like_a_word_is_kept() {
        let r = resolver()
            .resolve("https://res.cloudinary.com/demo/image/upload/website/my_folder/a.jpg")
            .unwrap();
        assert_eq!(r.public_id, "website/my_folder/a");
    }
}
