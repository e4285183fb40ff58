//! Assignment names are taken from the repository path handed to `submit`.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static ASSIGNMENT_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i).+/.+/.+/(.+)").ok());

/// Returns the final segment of `path` when at least three non-empty
/// components precede it, e.g. `~/cs50/psets/fuel` gives `fuel`.
///
/// Trailing separators are ignored. Shorter paths yield `None`.
pub fn assignment_name(path: &Path) -> Option<String> {
    let path = path.to_string_lossy();
    let trimmed = path.trim_end_matches('/');

    ASSIGNMENT_REGEX
        .as_ref()?
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
