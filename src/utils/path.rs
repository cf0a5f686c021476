//! ## path
//!
//! Helpers for slash separated share paths

use glob::{MatchOptions, Pattern};

/// Split `path` at its first slash into (first segment, remainder)
pub fn split_first_segment(path: &str) -> (&str, &str) {
    path.split_once('/').unwrap_or((path, ""))
}

/// Non-empty segments of `path`
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Parent directory of `path`; empty for top-level entries
pub fn dirname(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit_once('/')
        .map(|(parent, _)| parent)
        .unwrap_or("")
}

/// Last segment of `path`
pub fn basename(path: &str) -> &str {
    let path = path.trim_end_matches('/');
    path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path)
}

/// Extension of the last segment, including the dot
pub fn extension(path: &str) -> Option<&str> {
    let name = basename(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx..]),
    }
}

/// Whether `pattern` contains shell wildcards
pub fn has_wildcards(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

/// Match a file name against a wildcard pattern, ignoring case as SMB servers do
pub fn matches_pattern(pattern: &str, name: &str) -> bool {
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    match Pattern::new(pattern) {
        Ok(pattern) => pattern.matches_with(name, options),
        Err(err) => {
            debug!("invalid pattern {}: {}; comparing literally", pattern, err);
            pattern.eq_ignore_ascii_case(name)
        }
    }
}
