//! Glob-style file lookup.
//!
//! A pattern is split at its first wildcard (`*` or `?`). The directory part
//! of the literal prefix becomes the search root, everything under the root is
//! listed, and the listing is filtered with [`glob::Pattern`]. A pattern
//! without wildcards degrades to an existence check.
//!
//! Matching follows shell rules: `*` and `?` never cross a path separator or
//! match a leading dot, the search root itself is never a result, and a
//! candidate matches if either its full path or its base name matches.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::{IoResultExt, Result, StagingError};
use crate::fsx::FileSystem;

const WILDCARDS: &[char] = &['*', '?'];
const SEPARATORS: &[char] = &['/', '\\'];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Byte index of the first `*` or `?`, whichever comes earlier.
pub fn first_wildcard_index(pattern: &str) -> Option<usize> {
    pattern.find(WILDCARDS)
}

/// The directory to enumerate for `pattern`, or `None` if it has no wildcard.
///
/// If the literal prefix ends with a separator it is used as-is; otherwise
/// its last segment is dropped. A prefix without any separator searches `.`.
pub fn search_root(pattern: &str) -> Option<PathBuf> {
    let prefix = &pattern[..first_wildcard_index(pattern)?];
    if prefix.ends_with(SEPARATORS) {
        return Some(PathBuf::from(prefix));
    }
    let root = match prefix.rfind(SEPARATORS) {
        None => ".",
        // "/foo*" searches "/", "C:\foo*" searches "C:\".
        Some(i) if i == 0 || prefix[..i].ends_with(':') => &prefix[..=i],
        Some(i) => &prefix[..i],
    };
    Some(PathBuf::from(root))
}

/// Resolves `pattern` to the list of matching paths.
///
/// Nothing matching is an empty list, not an error.
pub fn resolve(fs: &dyn FileSystem, pattern: &str) -> Result<Vec<PathBuf>> {
    tracing::debug!(pattern, "finding files matching input");

    let Some(root) = search_root(pattern) else {
        let literal = PathBuf::from(pattern);
        if fs.exists(&literal) {
            return Ok(vec![literal]);
        }
        tracing::debug!(pattern, "no matching files were found");
        return Ok(Vec::new());
    };

    tracing::debug!(pattern, root = %root.display(), "matching glob pattern");

    let matcher = Pattern::new(pattern).map_err(|source| StagingError::Pattern {
        source,
        pattern: pattern.to_string(),
    })?;

    let matches: Vec<PathBuf> = fs
        .find(&root)
        .at(&root)?
        .into_iter()
        .filter(|candidate| candidate.as_path() != root.as_path())
        .filter(|candidate| is_match(&matcher, candidate))
        .collect();

    if matches.is_empty() {
        tracing::debug!(pattern, "no matching files were found");
    }
    Ok(matches)
}

fn is_match(matcher: &Pattern, candidate: &Path) -> bool {
    if matcher.matches_path_with(candidate, MATCH_OPTIONS) {
        return true;
    }
    candidate
        .file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| matcher.matches_with(name, MATCH_OPTIONS))
}
