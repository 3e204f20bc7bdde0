//! Delivery URL generation against Cloudinary's hosted transformation pipeline.

use crate::errors::MediaError;
use crate::kind::ResourceType;
use crate::normalize::split_extension;
use crate::resolver::{ResolvedMedia, DEFAULT_DELIVERY_HOST};
use crate::transform::{Format, Transformation};

#[derive(Debug, Clone)]
pub struct DeliveryUrlBuilder {
    cloud_name: String,
    secure: bool,
    cdn_host: Option<String>,
}

impl DeliveryUrlBuilder {
    pub fn new(cloud_name: impl Into<String>) -> Self {
        Self { cloud_name: cloud_name.into(), secure: true, cdn_host: None }
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Serve from a private CDN host; such hosts omit the cloud name.
    pub fn cdn_host(mut self, host: Option<String>) -> Self {
        self.cdn_host = host.filter(|h| !h.trim().is_empty());
        self
    }

    fn base(&self, resource_type: ResourceType) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        match &self.cdn_host {
            Some(host) => format!("{scheme}://{host}/{resource_type}/upload"),
            None => format!(
                "{scheme}://{DEFAULT_DELIVERY_HOST}/{}/{resource_type}/upload",
                self.cloud_name
            ),
        }
    }

    fn assemble(&self, resource_type: ResourceType, tx: &Transformation, public_id: &str, ext: Option<&str>) -> String {
        let mut url = self.base(resource_type);
        let component = tx.to_component();
        if !component.is_empty() {
            url.push('/');
            url.push_str(&component);
        }
        url.push('/');
        url.push_str(&encode_public_id(public_id));
        if let Some(ext) = ext {
            url.push('.');
            url.push_str(ext);
        }
        url
    }

    /// Full delivery URL. The captured extension is kept unless `f_` is set.
    pub fn build(&self, media: &ResolvedMedia, tx: &Transformation) -> Result<String, MediaError> {
        tx.validate()?;
        let (public_id, ext) = delivery_parts(media);
        let ext = if tx.format.is_none() { ext.as_deref() } else { None };
        Ok(self.assemble(media.resource_type, tx, public_id, ext))
    }

    /// `srcset` attribute value: one entry per distinct width, ascending.
    pub fn srcset(&self, media: &ResolvedMedia, base: &Transformation, widths: &[u32]) -> Result<String, MediaError> {
        if widths.is_empty() {
            return Err(MediaError::InvalidSrcset("at least one width is required".into()));
        }
        let mut widths = widths.to_vec();
        widths.sort_unstable();
        widths.dedup();
        let mut entries = Vec::with_capacity(widths.len());
        for w in widths {
            let tx = Transformation { width: Some(w), ..*base };
            entries.push(format!("{} {w}w", self.build(media, &tx)?));
        }
        Ok(entries.join(", "))
    }

    /// Still-frame URL for a video asset, delivered as an image format.
    pub fn poster(&self, media: &ResolvedMedia, tx: &Transformation) -> Result<String, MediaError> {
        if media.resource_type != ResourceType::Video {
            return Err(MediaError::NotAVideo(media.public_id.clone()));
        }
        tx.validate()?;
        let ext = match tx.format {
            Some(f) if f.is_still() => f.as_str(),
            Some(Format::Auto) | None => Format::Jpg.as_str(),
            Some(other) => {
                return Err(MediaError::InvalidTransformation(format!(
                    "poster format '{}' is not a still image format",
                    other.as_str()
                )))
            }
        };
        let frame = Transformation { format: None, ..*tx };
        let (public_id, _) = delivery_parts(media);
        Ok(self.assemble(ResourceType::Video, &frame, public_id, Some(ext)))
    }
}

/// Public id without a media extension, plus the extension to deliver.
/// Canonical ids may still carry their extension; raw ids keep theirs.
fn delivery_parts(media: &ResolvedMedia) -> (&str, Option<String>) {
    if media.resource_type == ResourceType::Raw || media.format.is_some() {
        return (media.public_id.as_str(), media.format.clone());
    }
    split_extension(&media.public_id)
}

fn encode_public_id(public_id: &str) -> String {
    public_id
        .split('/')
        .map(|s| urlencoding::encode(s).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
