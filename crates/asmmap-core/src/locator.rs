//! Manifest and source file discovery.

use std::collections::HashSet;
use std::path::Path;

use walkdir::WalkDir;

use crate::paths::{normalize_path, normalize_path_buf};

/// Find every manifest file under the given roots, recursively.
///
/// Roots are resolved against `project_root` and missing roots are skipped.
/// Each path is returned in the root's own form (`Packages/com.acme/Acme.asmdef`
/// for root `Packages/com.acme`), with forward slashes. The order is stable for a
/// given tree: roots in configured order, then file-name order at every level.
pub fn locate_manifests(project_root: &Path, roots: &[String], extension: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut manifests = Vec::new();

    for root in roots {
        for path in collect_files(project_root, root, extension) {
            if seen.insert(path.clone()) {
                manifests.push(path);
            }
        }
    }

    manifests
}

/// Every source file beneath `dir`, including subtrees owned by nested manifests.
pub fn enumerate_sources(project_root: &Path, dir: &str, extension: &str) -> Vec<String> {
    collect_files(project_root, dir, extension)
}

fn collect_files(project_root: &Path, root: &str, extension: &str) -> Vec<String> {
    let root_display = normalize_path(root);
    let root_display = root_display.trim_end_matches('/');
    let abs_root = project_root.join(root_display);

    if !abs_root.is_dir() {
        log::debug!("skipping missing root {}", abs_root.display());
        return Vec::new();
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&abs_root)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                log::debug!("skipping unreadable entry under {root_display}: {err}");
                continue;
            }
        };

        if !entry.file_type().is_file() || !has_extension(entry.path(), extension) {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(&abs_root)
            .map(normalize_path_buf)
            .unwrap_or_else(|_| normalize_path_buf(entry.path()));

        let display = if root_display.is_empty() || root_display == "." {
            rel
        } else {
            format!("{root_display}/{rel}")
        };
        files.push(display);
    }

    files
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
