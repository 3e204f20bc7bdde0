//! Media identifier resolution and Cloudinary delivery.
//!
//! Pure, synchronous building blocks: legacy placeholder ids are rewritten to
//! canonical Cloudinary public ids, transformations are rendered in
//! Cloudinary syntax and public ids are grouped into a site folder tree.
//! Nothing here touches the network or the filesystem.

pub mod errors;
pub mod kind;
pub mod normalize;
pub mod scheme;
pub mod resolver;
pub mod transform;
pub mod delivery;
pub mod tree;

pub use delivery::DeliveryUrlBuilder;
pub use errors::MediaError;
pub use kind::ResourceType;
pub use resolver::{ResolvedMedia, Resolver};
pub use scheme::{IdScheme, PrefixRule, RuleSet};
pub use transform::{Crop, Format, Gravity, Quality, TransformParams, Transformation};
pub use tree::{AssetEntry, AssetLeaf, SiteNode, SiteTree};
