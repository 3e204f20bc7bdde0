//! Cloudinary transformation parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MediaError;

pub const MAX_DIMENSION: u32 = 5000;
pub const MIN_DPR: f32 = 1.0;
pub const MAX_DPR: f32 = 4.0;

fn invalid(msg: impl Into<String>) -> MediaError {
    MediaError::InvalidTransformation(msg.into())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Crop {
    Fill,
    Fit,
    Limit,
    Scale,
    Thumb,
    Pad,
    Crop,
}

impl Crop {
    pub fn as_str(&self) -> &'static str {
        match self {
            Crop::Fill => "fill",
            Crop::Fit => "fit",
            Crop::Limit => "limit",
            Crop::Scale => "scale",
            Crop::Thumb => "thumb",
            Crop::Pad => "pad",
            Crop::Crop => "crop",
        }
    }

    fn accepts_gravity(&self) -> bool {
        matches!(self, Crop::Fill | Crop::Thumb | Crop::Crop | Crop::Pad)
    }
}

impl FromStr for Crop {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fill" => Ok(Crop::Fill),
            "fit" => Ok(Crop::Fit),
            "limit" => Ok(Crop::Limit),
            "scale" => Ok(Crop::Scale),
            "thumb" => Ok(Crop::Thumb),
            "pad" => Ok(Crop::Pad),
            "crop" => Ok(Crop::Crop),
            other => Err(invalid(format!("unknown crop mode '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gravity {
    Auto,
    Face,
    Faces,
    Center,
    North,
    South,
    East,
    West,
}

impl Gravity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gravity::Auto => "auto",
            Gravity::Face => "face",
            Gravity::Faces => "faces",
            Gravity::Center => "center",
            Gravity::North => "north",
            Gravity::South => "south",
            Gravity::East => "east",
            Gravity::West => "west",
        }
    }
}

impl FromStr for Gravity {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Gravity::Auto),
            "face" => Ok(Gravity::Face),
            "faces" => Ok(Gravity::Faces),
            "center" => Ok(Gravity::Center),
            "north" => Ok(Gravity::North),
            "south" => Ok(Gravity::South),
            "east" => Ok(Gravity::East),
            "west" => Ok(Gravity::West),
            other => Err(invalid(format!("unknown gravity '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Auto,
    AutoLevel(AutoQuality),
    Fixed(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoQuality {
    Best,
    Good,
    Eco,
    Low,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Auto => f.write_str("auto"),
            Quality::AutoLevel(level) => {
                let s = match level {
                    AutoQuality::Best => "best",
                    AutoQuality::Good => "good",
                    AutoQuality::Eco => "eco",
                    AutoQuality::Low => "low",
                };
                write!(f, "auto:{s}")
            }
            Quality::Fixed(q) => write!(f, "{q}"),
        }
    }
}

impl FromStr for Quality {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "auto" => return Ok(Quality::Auto),
            "auto:best" => return Ok(Quality::AutoLevel(AutoQuality::Best)),
            "auto:good" => return Ok(Quality::AutoLevel(AutoQuality::Good)),
            "auto:eco" => return Ok(Quality::AutoLevel(AutoQuality::Eco)),
            "auto:low" => return Ok(Quality::AutoLevel(AutoQuality::Low)),
            _ => {}
        }
        match s.parse::<u8>() {
            Ok(q) if (1..=100).contains(&q) => Ok(Quality::Fixed(q)),
            _ => Err(invalid(format!("quality '{s}' must be auto, auto:<level> or 1..=100"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Auto,
    Jpg,
    Png,
    Webp,
    Avif,
    Gif,
    Mp4,
    Webm,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Auto => "auto",
            Format::Jpg => "jpg",
            Format::Png => "png",
            Format::Webp => "webp",
            Format::Avif => "avif",
            Format::Gif => "gif",
            Format::Mp4 => "mp4",
            Format::Webm => "webm",
        }
    }

    /// Formats usable for a single still frame.
    pub fn is_still(&self) -> bool {
        matches!(self, Format::Jpg | Format::Png | Format::Webp | Format::Avif)
    }
}

impl FromStr for Format {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Format::Auto),
            "jpg" | "jpeg" => Ok(Format::Jpg),
            "png" => Ok(Format::Png),
            "webp" => Ok(Format::Webp),
            "avif" => Ok(Format::Avif),
            "gif" => Ok(Format::Gif),
            "mp4" => Ok(Format::Mp4),
            "webm" => Ok(Format::Webm),
            other => Err(invalid(format!("unknown format '{other}'"))),
        }
    }
}

/// A single Cloudinary transformation component.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transformation {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub crop: Option<Crop>,
    pub gravity: Option<Gravity>,
    pub quality: Option<Quality>,
    pub format: Option<Format>,
    pub dpr: Option<f32>,
}

impl Transformation {
    pub fn is_empty(&self) -> bool {
        *self == Transformation::default()
    }

    pub fn validate(&self) -> Result<(), MediaError> {
        for (name, v) in [("width", self.width), ("height", self.height)] {
            if let Some(v) = v {
                if v == 0 || v > MAX_DIMENSION {
                    return Err(invalid(format!("{name} must be in 1..={MAX_DIMENSION}")));
                }
            }
        }
        if let Some(dpr) = self.dpr {
            if !(MIN_DPR..=MAX_DPR).contains(&dpr) {
                return Err(invalid(format!("dpr must be in {MIN_DPR:.1}..={MAX_DPR:.1}")));
            }
            let hundredths = dpr * 100.0;
            if (hundredths - hundredths.round()).abs() > 1e-3 {
                return Err(invalid(format!("dpr {dpr} has more than two decimal places")));
            }
        }
        if self.gravity.is_some() && !self.crop.map(|c| c.accepts_gravity()).unwrap_or(false) {
            return Err(invalid("gravity requires crop mode fill, thumb, crop or pad"));
        }
        Ok(())
    }

    /// Cloudinary syntax with keys in alphabetical order.
    pub fn to_component(&self) -> String {
        let mut parts = Vec::new();
        if let Some(c) = self.crop {
            parts.push(format!("c_{}", c.as_str()));
        }
        if let Some(dpr) = self.dpr {
            parts.push(format!("dpr_{}", format_dpr(dpr)));
        }
        if let Some(f) = self.format {
            parts.push(format!("f_{}", f.as_str()));
        }
        if let Some(g) = self.gravity {
            parts.push(format!("g_{}", g.as_str()));
        }
        if let Some(h) = self.height {
            parts.push(format!("h_{h}"));
        }
        if let Some(q) = self.quality {
            parts.push(format!("q_{q}"));
        }
        if let Some(w) = self.width {
            parts.push(format!("w_{w}"));
        }
        parts.join(",")
    }

    /// Fields set on `self` win; the rest come from `base`.
    pub fn merged_over(&self, base: &Transformation) -> Transformation {
        Transformation {
            width: self.width.or(base.width),
            height: self.height.or(base.height),
            crop: self.crop.or(base.crop),
            gravity: self.gravity.or(base.gravity),
            quality: self.quality.or(base.quality),
            format: self.format.or(base.format),
            dpr: self.dpr.or(base.dpr),
        }
    }
}

/// Two decimals at most, at least one: `2.0`, `1.5`, `1.25`.
fn format_dpr(dpr: f32) -> String {
    let mut s = format!("{dpr:.2}");
    if s.ends_with('0') && !s.ends_with(".0") {
        s.pop();
    }
    s
}

/// String-typed transformation as it arrives in a query string or config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformParams {
    #[serde(default, alias = "width")]
    pub w: Option<String>,
    #[serde(default, alias = "height")]
    pub h: Option<String>,
    #[serde(default, alias = "crop")]
    pub c: Option<String>,
    #[serde(default, alias = "gravity")]
    pub g: Option<String>,
    #[serde(default, alias = "quality")]
    pub q: Option<String>,
    #[serde(default, alias = "format")]
    pub f: Option<String>,
    #[serde(default)]
    pub dpr: Option<String>,
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_dimension(name: &str, v: &str) -> Result<u32, MediaError> {
    v.parse::<u32>().map_err(|_| invalid(format!("{name} '{v}' is not a positive integer")))
}

impl TransformParams {
    pub fn parse(&self) -> Result<Transformation, MediaError> {
        let tx = Transformation {
            width: non_blank(&self.w).map(|v| parse_dimension("width", v)).transpose()?,
            height: non_blank(&self.h).map(|v| parse_dimension("height", v)).transpose()?,
            crop: non_blank(&self.c).map(str::parse).transpose()?,
            gravity: non_blank(&self.g).map(str::parse).transpose()?,
            quality: non_blank(&self.q).map(str::parse).transpose()?,
            format: non_blank(&self.f).map(str::parse).transpose()?,
            dpr: non_blank(&self.dpr)
                .map(|v| v.parse::<f32>().map_err(|_| invalid(format!("dpr '{v}' is not a number"))))
                .transpose()?,
        };
        tx.validate()?;
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_keys_are_sorted() {
        let tx = Transformation {
            width: Some(400),
            height: Some(300),
            crop: Some(Crop::Fill),
            gravity: Some(Gravity::Auto),
            quality: Some(Quality::Auto),
            format: Some(Format::Auto),
            dpr: Some(2.0),
        };
        assert_eq!(tx.to_component(), "c_fill,dpr_2.0,f_auto,g_auto,h_300,q_auto,w_400");
    }

    #[test]
    fn empty_transformation_renders_nothing() {
        assert!(Transformation::default().is_empty());
        assert_eq!(Transformation::default().to_component(), "");
    }

    #[test]
    fn parses_query_form() {
        let p = TransformParams {
            w: Some("800".into()),
            c: Some("FIT".into()),
            q: Some("auto:eco".into()),
            f: Some("jpeg".into()),
            ..Default::default()
        };
        let tx = p.parse().unwrap();
        assert_eq!(tx.to_component(), "c_fit,f_jpg,q_auto:eco,w_800");
    }

    #[test]
    fn blank_values_are_ignored() {
        let p = TransformParams { w: Some("  ".into()), ..Default::default() };
        assert!(p.parse().unwrap().is_empty());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let p = TransformParams { w: Some("0".into()), ..Default::default() };
        assert!(p.parse().is_err());
        let p = TransformParams { h: Some("5001".into()), ..Default::default() };
        assert!(p.parse().is_err());
        let p = TransformParams { dpr: Some("5".into()), ..Default::default() };
        assert!(p.parse().is_err());
        let p = TransformParams { q: Some("101".into()), ..Default::default() };
        assert!(p.parse().is_err());
        let p = TransformParams { c: Some("stretch".into()), ..Default::default() };
        assert!(matches!(p.parse(), Err(MediaError::InvalidTransformation(_))));
    }

    #[test]
    fn dpr_keeps_two_decimals() {
        for (raw, component) in [("2", "dpr_2.0"), ("1.5", "dpr_1.5"), ("1.25", "dpr_1.25"), ("1.75", "dpr_1.75")] {
            let p = TransformParams { dpr: Some(raw.into()), ..Default::default() };
            assert_eq!(p.parse().unwrap().to_component(), component);
        }
        let p = TransformParams { dpr: Some("1.333".into()), ..Default::default() };
        assert!(matches!(p.parse(), Err(MediaError::InvalidTransformation(_))));
    }

    #[test]
    fn gravity_needs_compatible_crop() {
        let p = TransformParams { g: Some("face".into()), ..Default::default() };
        assert!(p.parse().is_err());
        let p = TransformParams { g: Some("face".into()), c: Some("scale".into()), ..Default::default() };
        assert!(p.parse().is_err());
        let p = TransformParams { g: Some("face".into()), c: Some("thumb".into()), ..Default::default() };
        assert_eq!(p.parse().unwrap().to_component(), "c_thumb,g_face");
    }

    #[test]
    fn explicit_values_win_over_preset() {
        let preset = Transformation {
            width: Some(1920),
            crop: Some(Crop::Fill),
            quality: Some(Quality::Auto),
            ..Default::default()
        };
        let explicit = Transformation { width: Some(640), ..Default::default() };
        let merged = explicit.merged_over(&preset);
        assert_eq!(merged.to_component(), "c_fill,q_auto,w_640");
    }
}
