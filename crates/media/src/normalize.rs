//! Path normalisation shared by every identifier scheme.

use crate::kind::{IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};

/// Trim, drop `?query`/`#fragment`, unify separators, collapse `//`, drop `.`
/// segments and a trailing `/`. A leading `/` is kept.
///
/// `normalize_path(normalize_path(s)) == normalize_path(s)` for every `s`.
pub fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim();
    let cut = match trimmed.find(|c| c == '?' || c == '#') {
        Some(i) => &trimmed[..i],
        None => trimmed,
    };
    let unified = cut.replace('\\', "/");
    let rooted = unified.starts_with('/');
    let body = unified
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect::<Vec<_>>()
        .join("/");
    if rooted {
        format!("/{body}")
    } else {
        body
    }
}

/// Split off the final segment's extension when it is a known media type.
/// The returned extension is lower-cased.
pub fn split_extension(path: &str) -> (&str, Option<String>) {
    let leaf_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let leaf = &path[leaf_start..];
    let Some(dot) = leaf.rfind('.') else {
        return (path, None);
    };
    if dot == 0 {
        return (path, None);
    }
    let ext = leaf[dot + 1..].to_ascii_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) || VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        (&path[..leaf_start + dot], Some(ext))
    } else {
        (path, None)
    }
}
