//! Site-structure tree built from a flat list of public ids.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::kind::ResourceType;

/// One uploaded asset as reported by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub public_id: String,
    #[serde(default)]
    pub resource_type: ResourceType,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl AssetEntry {
    pub fn new(public_id: impl Into<String>, resource_type: ResourceType) -> Self {
        Self { public_id: public_id.into(), resource_type, format: None, bytes: None, width: None, height: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetLeaf {
    pub name: String,
    pub public_id: String,
    pub resource_type: ResourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteNode {
    pub name: String,
    /// Full folder path, e.g. `website/pages/services`.
    pub path: String,
    pub folders: Vec<SiteNode>,
    pub assets: Vec<AssetLeaf>,
    /// Assets in this folder and every sub-folder.
    pub asset_count: usize,
}

impl SiteNode {
    /// Sub-folder by path relative to this node (`pages/services`).
    pub fn find(&self, relative: &str) -> Option<&SiteNode> {
        relative
            .split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self, |node, name| node.folders.iter().find(|f| f.name == name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteTree {
    pub root: SiteNode,
    pub total_assets: usize,
    /// Entries outside the root folder.
    pub skipped: usize,
}

#[derive(Default)]
struct FolderBuilder {
    folders: BTreeMap<String, FolderBuilder>,
    assets: BTreeMap<String, AssetLeaf>,
}

impl FolderBuilder {
    fn insert(&mut self, segments: &[&str], entry: &AssetEntry) {
        match segments {
            [] => {}
            [name] => {
                self.assets.entry((*name).to_string()).or_insert_with(|| AssetLeaf {
                    name: (*name).to_string(),
                    public_id: entry.public_id.clone(),
                    resource_type: entry.resource_type,
                    format: entry.format.clone(),
                    bytes: entry.bytes,
                    width: entry.width,
                    height: entry.height,
                });
            }
            [folder, rest @ ..] => {
                self.folders.entry((*folder).to_string()).or_default().insert(rest, entry);
            }
        }
    }

    fn finish(self, name: String, path: String) -> SiteNode {
        let folders: Vec<SiteNode> = self
            .folders
            .into_iter()
            .map(|(child, builder)| {
                let child_path = format!("{path}/{child}");
                builder.finish(child, child_path)
            })
            .collect();
        let assets: Vec<AssetLeaf> = self.assets.into_values().collect();
        let asset_count = assets.len() + folders.iter().map(|f| f.asset_count).sum::<usize>();
        SiteNode { name, path, folders, assets, asset_count }
    }
}

impl SiteTree {
    pub fn build<'a, I>(root: &str, assets: I) -> SiteTree
    where
        I: IntoIterator<Item = &'a AssetEntry>,
    {
        let root = root.trim_matches('/');
        let prefix = format!("{root}/");
        let mut builder = FolderBuilder::default();
        let mut skipped = 0;

        for entry in assets {
            let Some(relative) = entry.public_id.strip_prefix(&prefix) else {
                skipped += 1;
                continue;
            };
            let segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();
            if segments.is_empty() {
                skipped += 1;
                continue;
            }
            builder.insert(&segments, entry);
        }

        let root_node = builder.finish(root.to_string(), root.to_string());
        SiteTree { total_assets: root_node.asset_count, root: root_node, skipped }
    }
}
