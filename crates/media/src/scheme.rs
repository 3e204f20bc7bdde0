//! Identifier schemes and the legacy prefix table.

use serde::{Deserialize, Serialize};

use crate::errors::MediaError;
use crate::kind::ResourceType;

/// Which pattern check produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdScheme {
    Override,
    DeliveryUrl,
    Canonical,
    Page,
    Component,
    BarePath,
    Unknown,
}

impl IdScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdScheme::Override => "override",
            IdScheme::DeliveryUrl => "delivery_url",
            IdScheme::Canonical => "canonical",
            IdScheme::Page => "page",
            IdScheme::Component => "component",
            IdScheme::BarePath => "bare_path",
            IdScheme::Unknown => "unknown",
        }
    }
}

/// One legacy prefix and the canonical folder it rewrites to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixRule {
    pub legacy: String,
    /// Absolute canonical folder, `{root}/.../` with a trailing slash.
    pub canonical: String,
    pub scheme: IdScheme,
    #[serde(default)]
    pub resource_type: Option<ResourceType>,
}

impl PrefixRule {
    pub fn new(legacy: impl Into<String>, canonical: impl Into<String>, scheme: IdScheme) -> Self {
        Self { legacy: legacy.into(), canonical: canonical.into(), scheme, resource_type: None }
    }

    pub fn with_resource_type(mut self, rt: ResourceType) -> Self {
        self.resource_type = Some(rt);
        self
    }
}

/// Validated, ordered prefix table under a single root folder.
#[derive(Debug, Clone)]
pub struct RuleSet {
    root: String,
    root_prefix: String,
    rules: Vec<PrefixRule>,
}

impl RuleSet {
    pub fn new(root: impl Into<String>, rules: Vec<PrefixRule>) -> Result<Self, MediaError> {
        let root = root.into();
        let root = root.trim().to_string();
        if root.is_empty() {
            return Err(MediaError::InvalidRule("root folder must not be empty".into()));
        }
        if root.starts_with('/') || root.ends_with('/') || root.contains("//") {
            return Err(MediaError::InvalidRule(format!(
                "root folder '{root}' must not start or end with '/'"
            )));
        }
        let root_prefix = format!("{root}/");

        for (i, rule) in rules.iter().enumerate() {
            if rule.legacy.is_empty() {
                return Err(MediaError::InvalidRule(format!("rule #{i} has an empty legacy prefix")));
            }
            if rule.legacy.starts_with(&root_prefix) {
                return Err(MediaError::InvalidRule(format!(
                    "legacy prefix '{}' lies under the canonical root",
                    rule.legacy
                )));
            }
            if !rule.canonical.starts_with(&root_prefix) || !rule.canonical.ends_with('/') {
                return Err(MediaError::InvalidRule(format!(
                    "canonical target '{}' must be a folder under '{root_prefix}'",
                    rule.canonical
                )));
            }
            if matches!(rule.scheme, IdScheme::Override | IdScheme::DeliveryUrl | IdScheme::Canonical | IdScheme::Unknown) {
                return Err(MediaError::InvalidRule(format!(
                    "rule '{}' uses non-legacy scheme {}",
                    rule.legacy,
                    rule.scheme.as_str()
                )));
            }
            for earlier in &rules[..i] {
                if rule.legacy.starts_with(&earlier.legacy) {
                    return Err(MediaError::InvalidRule(format!(
                        "legacy prefix '{}' is shadowed by earlier prefix '{}'",
                        rule.legacy, earlier.legacy
                    )));
                }
            }
            if let Some(other) = rules.iter().find(|r| rule.canonical.starts_with(&r.legacy)) {
                return Err(MediaError::InvalidRule(format!(
                    "canonical target '{}' matches legacy prefix '{}'",
                    rule.canonical, other.legacy
                )));
            }
        }

        Ok(Self { root, root_prefix, rules })
    }

    /// The built-in table: `page:`, `component:`, `/images/`, `/videos/`, `/`.
    pub fn default_rules(root: &str) -> Vec<PrefixRule> {
        vec![
            PrefixRule::new("page:", format!("{root}/pages/"), IdScheme::Page),
            PrefixRule::new("component:", format!("{root}/components/"), IdScheme::Component),
            PrefixRule::new("/images/", format!("{root}/images/"), IdScheme::BarePath)
                .with_resource_type(ResourceType::Image),
            PrefixRule::new("/videos/", format!("{root}/videos/"), IdScheme::BarePath)
                .with_resource_type(ResourceType::Video),
            PrefixRule::new("/", format!("{root}/static/"), IdScheme::BarePath),
        ]
    }

    pub fn default_for(root: &str) -> Result<Self, MediaError> {
        Self::new(root, Self::default_rules(root.trim()))
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn root_prefix(&self) -> &str {
        &self.root_prefix
    }

    pub fn rules(&self) -> &[PrefixRule] {
        &self.rules
    }

    pub fn is_canonical(&self, normalized: &str) -> bool {
        normalized.starts_with(&self.root_prefix)
    }

    /// First rule whose legacy prefix matches, with the remainder after it.
    pub fn match_rule<'a>(&self, normalized: &'a str) -> Option<(&PrefixRule, &'a str)> {
        self.rules
            .iter()
            .find(|r| normalized.starts_with(&r.legacy))
            .map(|r| (r, &normalized[r.legacy.len()..]))
    }
}
