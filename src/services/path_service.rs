//! Path canonicalization.
//!
//! The single barrier between attacker-controlled path strings and the
//! filesystem. Ambiguous input is rejected, never silently corrected.

use crate::error::AppError;

/// Returns the canonical form of a user-supplied relative path: forward
/// slashes only, no leading or trailing slash, no `.`/`..` segments.
///
/// Empty input, `.`, `..` and `/` all canonicalize to the empty path
/// (the root). Any input whose normalization would have to alter a
/// surviving component fails with `InvalidPath`.
pub fn canonicalize(raw: &str) -> Result<String, AppError> {
    let decoded = urlencoding::decode(raw)
        .map_err(|_| AppError::InvalidPath(raw.to_string()))?;

    let normalized = normalize_posix(&decoded);
    let normalized = normalized.trim_start_matches('/');

    let mut parts: Vec<&str> = Vec::new();
    for part in normalized.split('/') {
        if part.is_empty() {
            continue;
        }
        // A backslash or a drive-letter prefix denotes a different
        // filesystem root. Hard fail, not a strip.
        if part.contains('\\') || has_drive_prefix(part) {
            return Err(AppError::InvalidPath(raw.to_string()));
        }
        // Normalization already resolved these; filter again before
        // reassembly rather than trust it.
        if part == "." || part == ".." {
            continue;
        }
        parts.push(part);
    }

    let clean = parts.join("/");
    if !clean.is_empty() && clean != normalized {
        return Err(AppError::InvalidPath(raw.to_string()));
    }
    Ok(clean)
}

/// Dirname of a canonical path; the root's parent is the root itself.
pub fn parent(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((head, _)) => head,
        None => "",
    }
}

/// Top-level segment of a canonical path (empty for the root).
pub fn top_segment(path: &str) -> &str {
    path.split('/').next().unwrap_or("")
}

fn has_drive_prefix(part: &str) -> bool {
    let bytes = part.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// POSIX-style path normalization: collapse repeated slashes, resolve `.`
/// and `..` segments. Purely lexical, same rules as `posixpath.normpath`.
fn normalize_posix(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    // Exactly two leading slashes are kept distinct per POSIX.
    let initial_slashes = if path.starts_with('/') {
        if path.starts_with("//") && !path.starts_with("///") {
            2
        } else {
            1
        }
    } else {
        0
    };

    let mut comps: Vec<&str> = Vec::new();
    for comp in path.split('/') {
        if comp.is_empty() || comp == "." {
            continue;
        }
        if comp != ".."
            || (initial_slashes == 0 && comps.is_empty())
            || comps.last().is_some_and(|c| *c == "..")
        {
            comps.push(comp);
        } else if !comps.is_empty() {
            comps.pop();
        }
    }

    let mut out = "/".repeat(initial_slashes);
    out.push_str(&comps.join("/"));
    if out.is_empty() {
        ".".to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_roots_to_empty() {
        assert_eq!(canonicalize("").unwrap(), "");
        assert_eq!(canonicalize(".").unwrap(), "");
        assert_eq!(canonicalize("..").unwrap(), "");
        assert_eq!(canonicalize("/").unwrap(), "");
    }

    #[test]
    fn strips_slashes() {
        assert_eq!(canonicalize("/foo").unwrap(), "foo");
        assert_eq!(canonicalize("/foo/").unwrap(), "foo");
        assert_eq!(canonicalize("/foo/bar").unwrap(), "foo/bar");
        assert_eq!(canonicalize("/foo/bar/").unwrap(), "foo/bar");
        assert_eq!(canonicalize("foo//bar").unwrap(), "foo/bar");
    }

    #[test]
    fn rejects_backslashes() {
        assert!(matches!(canonicalize("\\"), Err(AppError::InvalidPath(_))));
        assert!(matches!(canonicalize("\\foo"), Err(AppError::InvalidPath(_))));
        assert!(matches!(canonicalize("foo/ba\\r"), Err(AppError::InvalidPath(_))));
    }

    #[test]
    fn rejects_drive_prefixes() {
        assert!(matches!(canonicalize("c:/secret"), Err(AppError::InvalidPath(_))));
        assert!(matches!(canonicalize("foo/C:bar"), Err(AppError::InvalidPath(_))));
    }

    #[test]
    fn rejects_escaping_traversal() {
        assert!(matches!(canonicalize("../etc/passwd"), Err(AppError::InvalidPath(_))));
        assert!(matches!(canonicalize("../../x"), Err(AppError::InvalidPath(_))));
    }

    #[test]
    fn resolves_internal_traversal() {
        // Traversal that stays inside the root resolves lexically.
        assert_eq!(canonicalize("foo/../bar").unwrap(), "bar");
        assert_eq!(canonicalize("foo/./bar").unwrap(), "foo/bar");
    }

    #[test]
    fn percent_decodes_before_normalizing() {
        assert_eq!(canonicalize("foo%2Fbar").unwrap(), "foo/bar");
        assert!(matches!(
            canonicalize("%2e%2e/etc"),
            Err(AppError::InvalidPath(_))
        ));
        assert!(matches!(canonicalize("%5Cfoo"), Err(AppError::InvalidPath(_))));
    }

    #[test]
    fn idempotent_on_success() {
        for raw in ["", ".", "/", "/foo/", "foo//bar", "a/./b/../c", "%20x"] {
            let once = canonicalize(raw).unwrap();
            assert_eq!(canonicalize(&once).unwrap(), once, "input {:?}", raw);
        }
    }

    #[test]
    fn parent_and_top_segment() {
        assert_eq!(parent("foo/bar/baz.jpg"), "foo/bar");
        assert_eq!(parent("foo"), "");
        assert_eq!(parent(""), "");
        assert_eq!(top_segment("foo/bar"), "foo");
        assert_eq!(top_segment(""), "");
    }
}
