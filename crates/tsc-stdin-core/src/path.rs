//! Lexical path helpers.
//!
//! The engine identifies files by their path *string*, so the target path must be normalized the
//! same way on every side of the pipeline. All helpers here are purely lexical: they never touch
//! the filesystem and never resolve symlinks. `/` is the separator (POSIX rules).

use std::path::Path;

/// Normalize a path string.
///
/// - duplicate separators collapse into one
/// - `.` segments are dropped
/// - `..` removes the preceding segment; leading `..` is kept for relative paths and dropped
///   above the root for absolute ones
/// - a trailing separator is preserved
/// - an empty relative result becomes `"."` (or `"./"`)
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let is_absolute = path.starts_with('/');
    let trailing_separator = path.ends_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !is_absolute {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let mut out = segments.join("/");
    if out.is_empty() && !is_absolute {
        out.push('.');
    }
    if trailing_separator && (!out.is_empty() || !is_absolute) {
        out.push('/');
    }
    if is_absolute {
        out.insert(0, '/');
    }
    out
}

/// Returns `true` for rooted paths.
pub fn is_rooted(path: &str) -> bool {
    path.starts_with('/') || Path::new(path).is_absolute()
}

/// Join `relative` onto `base` (unless `relative` is already rooted) and normalize the result.
pub fn combine_paths(base: &str, relative: &str) -> String {
    if is_rooted(relative) || base.is_empty() {
        return normalize_path(relative);
    }
    normalize_path(&format!("{}/{}", base.trim_end_matches('/'), relative))
}

/// Make `path` absolute against `base_dir`, normalized and without a trailing separator.
pub fn to_absolute_path(base_dir: &Path, path: &str) -> String {
    let base = base_dir.to_string_lossy();
    let combined = combine_paths(&base, path);
    if combined.len() > 1 {
        combined.trim_end_matches('/').to_string()
    } else {
        combined
    }
}

/// The directory portion of a path string (`""` when there is none).
pub fn directory_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => "",
    }
}
