// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::{Path, PathBuf};

/// Resolve a resource path against the registry root.
///
/// Absolute paths are returned unchanged; relative paths are joined onto
/// `root`.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if the path does not live under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}
