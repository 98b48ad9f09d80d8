//! # Canonical Procedure Paths
//!
//! Every procedure path starts and ends with `/`, and segments are joined by
//! exactly one separator. The same function produces the router binding and
//! the spec entry, so the two never diverge.

const SEPARATOR: char = '/';

/// Join path segments into a canonical path.
///
/// Duplicate separators collapse, empty segments vanish, and the result
/// always begins and ends with `/`. Joining nothing yields `/`.
pub fn join_paths<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<String> = segments
        .into_iter()
        .flat_map(|segment| {
            segment
                .as_ref()
                .split(SEPARATOR)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect();

    if parts.is_empty() {
        return SEPARATOR.to_string();
    }
    format!("{SEPARATOR}{}{SEPARATOR}", parts.join("/"))
}

/// Normalize a single procedure name: `"list"` becomes `"/list/"`.
pub fn normalize_path(name: &str) -> String {
    join_paths([name])
}
