//! Path-pattern matching.
//!
//! Patterns use `:name` segments for dynamic parameters, e.g.
//! `/api/motorcycles/:id/ratings`.

use std::collections::HashMap;

/// Parameters extracted from dynamic path segments.
pub type PathParams = HashMap<String, String>;

/// Match a concrete path against a pattern, extracting `:name` segments.
/// Returns `None` when the shapes differ.
pub fn match_path(pattern: &str, path: &str) -> Option<PathParams> {
    let pattern_parts: Vec<&str> = pattern.split('/').collect();
    let path_parts: Vec<&str> = path.split('/').collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();
    for (pattern_part, path_part) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(name) = pattern_part.strip_prefix(':') {
            if path_part.is_empty() {
                return None;
            }
            params.insert(name.to_string(), path_part.to_string());
        } else if pattern_part != path_part {
            return None;
        }
    }
    Some(params)
}
