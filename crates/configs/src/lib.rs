use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use serde::Deserialize;

use media::{IdScheme, PrefixRule, ResourceType, RuleSet, TransformParams, Transformation};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cloudinary: CloudinaryConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub site_structure: SiteStructureConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudinaryConfig {
    #[serde(default)]
    pub cloud_name: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
    #[serde(default = "default_true")]
    pub secure: bool,
    #[serde(default)]
    pub cdn_host: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: None,
            api_secret: None,
            secure: true,
            cdn_host: None,
            api_base: default_api_base(),
            timeout_secs: default_timeout(),
        }
    }
}

/// A legacy prefix rule as written in `config.toml`; `folder` is relative to
/// the root folder.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    pub legacy: String,
    pub folder: String,
    pub scheme: IdScheme,
    #[serde(default)]
    pub resource_type: Option<ResourceType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_root_folder")]
    pub root_folder: String,
    /// `None` keeps the built-in table.
    #[serde(default)]
    pub rules: Option<Vec<RuleConfig>>,
    #[serde(default)]
    pub presets: BTreeMap<String, TransformParams>,
    #[serde(default = "default_srcset_widths")]
    pub srcset_widths: Vec<u32>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root_folder: default_root_folder(),
            rules: None,
            presets: BTreeMap::new(),
            srcset_widths: default_srcset_widths(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_overrides_file")]
    pub overrides_file: String,
    #[serde(default = "default_admin_keys_file")]
    pub admin_keys_file: String,
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            overrides_file: default_overrides_file(),
            admin_keys_file: default_admin_keys_file(),
            manifest_file: default_manifest_file(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetSourceKind {
    #[default]
    Manifest,
    Cloudinary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteStructureConfig {
    #[serde(default)]
    pub source: AssetSourceKind,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for SiteStructureConfig {
    fn default() -> Self {
        Self {
            source: AssetSourceKind::default(),
            cache_ttl_secs: default_cache_ttl(),
            max_results: default_max_results(),
            max_pages: default_max_pages(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminConfig {
    #[serde(default)]
    pub bootstrap_key: Option<String>,
}

fn default_true() -> bool { true }
fn default_api_base() -> String { "https://api.cloudinary.com/v1_1".into() }
fn default_timeout() -> u64 { 15 }
fn default_root_folder() -> String { "website".into() }
fn default_srcset_widths() -> Vec<u32> { vec![320, 640, 960, 1280, 1920] }
fn default_data_dir() -> String { "data".into() }
fn default_overrides_file() -> String { "media_overrides.json".into() }
fn default_admin_keys_file() -> String { "admin_keys.json".into() }
fn default_manifest_file() -> String { "assets.json".into() }
fn default_cache_ttl() -> u64 { 300 }
fn default_max_results() -> u32 { 500 }
fn default_max_pages() -> u32 { 20 }

pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// File if present, defaults otherwise; then env overrides and validation.
    pub fn load_and_validate() -> Result<Self> {
        let path = config_path();
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            AppConfig::default()
        };
        cfg.apply_env();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|k| std::env::var(k).ok());
    }

    /// Env overrides through a lookup function, so tests need not touch the
    /// process environment.
    pub fn apply_env_from<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = get("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(p) = get("SERVER_PORT").and_then(|v| v.parse::<u16>().ok()) {
            self.server.port = p;
        }
        if let Some(w) = get("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(v) = get("CLOUDINARY_CLOUD_NAME") {
            self.cloudinary.cloud_name = v;
        }
        if let Some(v) = get("CLOUDINARY_API_KEY") {
            self.cloudinary.api_key = Some(v);
        }
        if let Some(v) = get("CLOUDINARY_API_SECRET") {
            self.cloudinary.api_secret = Some(v);
        }
        if let Some(v) = get("ADMIN_API_KEY") {
            self.admin.bootstrap_key = Some(v);
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.cloudinary.validate(self.site_structure.source)?;
        self.media.normalize();
        self.media.rule_set()?;
        self.media.parsed_presets()?;
        self.site_structure.validate()?;
        if let Some(k) = &self.admin.bootstrap_key {
            if k.trim().is_empty() {
                self.admin.bootstrap_key = None;
            }
        }
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl CloudinaryConfig {
    fn validate(&self, source: AssetSourceKind) -> Result<()> {
        if self.cloud_name.trim().is_empty() {
            return Err(anyhow!(
                "cloudinary.cloud_name is empty; set it in config.toml or CLOUDINARY_CLOUD_NAME"
            ));
        }
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(anyhow!("cloudinary.api_base must start with http:// or https://"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("cloudinary.timeout_secs must be positive"));
        }
        if source == AssetSourceKind::Cloudinary && !self.has_credentials() {
            return Err(anyhow!(
                "site_structure.source = \"cloudinary\" needs CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET"
            ));
        }
        Ok(())
    }

    pub fn has_credentials(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false);
        present(&self.api_key) && present(&self.api_secret)
    }
}

impl MediaConfig {
    fn normalize(&mut self) {
        self.root_folder = self.root_folder.trim().trim_matches('/').to_string();
        self.srcset_widths.sort_unstable();
        self.srcset_widths.dedup();
    }

    /// Build the validated rule table for `root_folder`.
    pub fn rule_set(&self) -> Result<RuleSet> {
        let root = self.root_folder.as_str();
        let set = match &self.rules {
            None => RuleSet::default_for(root)?,
            Some(rules) => {
                let rules = rules
                    .iter()
                    .map(|r| {
                        let folder = r.folder.trim().trim_matches('/');
                        let canonical = if folder.is_empty() {
                            format!("{root}/")
                        } else {
                            format!("{root}/{folder}/")
                        };
                        PrefixRule { legacy: r.legacy.clone(), canonical, scheme: r.scheme, resource_type: r.resource_type }
                    })
                    .collect();
                RuleSet::new(root, rules)?
            }
        };
        Ok(set)
    }

    pub fn parsed_presets(&self) -> Result<BTreeMap<String, Transformation>> {
        self.presets
            .iter()
            .map(|(name, params)| {
                params
                    .parse()
                    .map(|tx| (name.clone(), tx))
                    .map_err(|e| anyhow!("media.presets.{name}: {e}"))
            })
            .collect()
    }
}

impl SiteStructureConfig {
    fn validate(&self) -> Result<()> {
        if self.max_results == 0 || self.max_results > 500 {
            return Err(anyhow!("site_structure.max_results must be in 1..=500"));
        }
        if self.max_pages == 0 {
            return Err(anyhow!("site_structure.max_pages must be positive"));
        }
        Ok(())
    }
}
