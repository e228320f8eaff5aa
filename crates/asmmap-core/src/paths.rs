//! Path separator normalization.

use std::path::Path;

/// Convert backslash separators to forward slashes.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Render a filesystem path in normalized, forward-slash form.
pub fn normalize_path_buf(path: &Path) -> String {
    normalize_path(&path.to_string_lossy())
}

/// Parent directory of a normalized path, or `""` for a bare file name.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[..pos],
        None => "",
    }
}
