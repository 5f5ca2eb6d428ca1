//! Canonical path handling.
//!
//! A canonical path is repository-root-relative, starts with `/`, and has no
//! trailing slash (the root itself is `/`).

use crate::constants::{ACL_SUFFIX, METADATA_SUFFIX, PREFIXES, RESERVED_MARKER};

/// Strip the repository base URL (if present) and normalize slashes.
pub fn canonicalize(raw: &str, base_url: &str) -> String {
    let raw = raw.trim();
    let base = base_url.trim_end_matches('/');
    let rest = if has_base_prefix(raw, base) {
        &raw[base.len()..]
    } else if let Some(idx) = raw.find("://") {
        // Absolute URL on a host we don't recognize as the base: keep the path part.
        let after_scheme = &raw[idx + 3..];
        after_scheme.find('/').map_or("", |slash| &after_scheme[slash..])
    } else {
        raw
    };
    let trimmed = rest.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Whether `raw` is addressed to the repository at `base_url`.
/// Relative paths always are.
pub fn is_within_base(raw: &str, base_url: &str) -> bool {
    !raw.contains("://") || has_base_prefix(raw.trim(), base_url.trim_end_matches('/'))
}

fn has_base_prefix(raw: &str, base: &str) -> bool {
    !base.is_empty()
        && raw.starts_with(base)
        && matches!(raw.as_bytes().get(base.len()), None | Some(b'/'))
}

/// Whether the path addresses a reserved sub-resource (`.../fcr:metadata`,
/// `.../fcr:acl`, versions, tombstones).
pub fn is_reserved(path: &str) -> bool {
    path.contains(RESERVED_MARKER)
}

/// The owning root of a reserved sub-resource, or the path itself.
pub fn owning_root(path: &str) -> &str {
    match path.find(RESERVED_MARKER) {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => path,
    }
}

/// Whether the path is an access-control facet.
pub fn is_acl(path: &str) -> bool {
    path.ends_with(ACL_SUFFIX)
}

/// Whether the path is a binary's metadata companion.
pub fn is_metadata_companion(path: &str) -> bool {
    path.ends_with(METADATA_SUFFIX)
}

/// The metadata companion path for a binary.
pub fn metadata_companion(path: &str) -> String {
    format!("{}{METADATA_SUFFIX}", path.trim_end_matches('/'))
}

/// Whether `candidate` lies strictly below `parent` in the hierarchy.
pub fn is_descendant(candidate: &str, parent: &str) -> bool {
    if parent == "/" {
        return candidate != "/" && candidate.starts_with('/');
    }
    candidate.len() > parent.len()
        && candidate.starts_with(parent)
        && candidate.as_bytes()[parent.len()] == b'/'
}

/// Expand a compact IRI (`ldp:contains`) using the known prefixes.
/// Full IRIs and unknown prefixes are returned unchanged.
pub fn expand_iri(term: &str) -> String {
    if term.contains("://") {
        return term.to_string();
    }
    if let Some((prefix, local)) = term.split_once(':') {
        if let Some((_, ns)) = PREFIXES.iter().find(|(p, _)| *p == prefix) {
            return format!("{ns}{local}");
        }
    }
    term.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:8080/rest";

    #[test]
    fn canonicalize_strips_base_and_trailing_slash() {
        assert_eq!(canonicalize("http://localhost:8080/rest/a/b/", BASE), "/a/b");
        assert_eq!(canonicalize("http://localhost:8080/rest", BASE), "/");
        assert_eq!(canonicalize("a/b", BASE), "/a/b");
        assert_eq!(canonicalize("/a", BASE), "/a");
    }

    #[test]
    fn owning_root_of_reserved_paths() {
        assert_eq!(owning_root("/items/42/fcr:acl"), "/items/42");
        assert_eq!(owning_root("/items/42/fcr:metadata"), "/items/42");
        assert_eq!(owning_root("/items/42"), "/items/42");
        assert!(is_reserved("/items/42/fcr:versions/v1"));
        assert!(!is_reserved("/items/42"));
    }

    #[test]
    fn descendant_requires_segment_boundary() {
        assert!(is_descendant("/a/b", "/a"));
        assert!(!is_descendant("/ab", "/a"));
        assert!(!is_descendant("/a", "/a"));
        assert!(is_descendant("/x", "/"));
    }

    #[test]
    fn expand_known_prefixes() {
        assert_eq!(expand_iri("ldp:contains"), "http://www.w3.org/ns/ldp#contains");
        assert_eq!(expand_iri("pcdm:hasMember"), "http://pcdm.org/models#hasMember");
        assert_eq!(expand_iri("unknown:thing"), "unknown:thing");
        assert_eq!(expand_iri("http://x/y#z"), "http://x/y#z");
    }
}
