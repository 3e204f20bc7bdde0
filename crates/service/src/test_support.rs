#![cfg(test)]
use std::path::PathBuf;

use media::{Resolver, RuleSet};

/// Unique temp file path per test so parallel tests never share a store.
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}_{}.json", name, uuid::Uuid::new_v4()))
}

pub fn resolver() -> Resolver {
    Resolver::new(RuleSet::default_for("website").expect("default rules"))
}
