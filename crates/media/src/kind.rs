use std::fmt;

use serde::{Deserialize, Serialize};

pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "avif", "svg", "bmp", "tiff", "ico", "heic",
];

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "m4v", "ogv", "avi", "mkv"];

/// Cloudinary delivery resource type (`/image/upload`, `/video/upload`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    #[default]
    Image,
    Video,
    Raw,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Image => "image",
            ResourceType::Video => "video",
            ResourceType::Raw => "raw",
        }
    }

    /// Parse the resource-type segment of a delivery URL path.
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "image" => Some(ResourceType::Image),
            "video" => Some(ResourceType::Video),
            "raw" => Some(ResourceType::Raw),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(ResourceType::Video)
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(ResourceType::Image)
        } else {
            None
        }
    }

    /// Extension, then rule hint, then a `videos` folder segment, then image.
    pub fn infer(public_id: &str, ext: Option<&str>, hint: Option<ResourceType>) -> Self {
        if let Some(rt) = ext.and_then(Self::from_extension) {
            return rt;
        }
        if let Some(rt) = hint {
            return rt;
        }
        let mut folders = public_id.split('/').rev().skip(1);
        if folders.any(|s| s.eq_ignore_ascii_case("videos")) {
            return ResourceType::Video;
        }
        ResourceType::Image
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_wins_over_hint() {
        assert_eq!(
            ResourceType::infer("website/images/clip", Some("MP4"), Some(ResourceType::Image)),
            ResourceType::Video
        );
    }

    #[test]
    fn hint_used_without_extension() {
        assert_eq!(
            ResourceType::infer("website/videos/intro", None, Some(ResourceType::Image)),
            ResourceType::Image
        );
    }

    #[test]
    fn videos_folder_implies_video() {
        assert_eq!(ResourceType::infer("website/videos/intro", None, None), ResourceType::Video);
        // the leaf name alone is not a folder
        assert_eq!(ResourceType::infer("website/pages/videos", None, None), ResourceType::Image);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ResourceType::Video).unwrap(), "\"video\"");
    }
}
