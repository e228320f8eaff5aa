//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use asmmap_core::config::{RootFolders, ScanConfig};
use asmmap_core::resolver::OwnershipResolver;
use asmmap_core::scanner::Scanner;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Fixture path resolution
// ---------------------------------------------------------------------------

/// Resolve `tests/fixtures/{name}` relative to the workspace root.
pub fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir)
        .join("../../tests/fixtures")
        .join(name)
        .canonicalize()
        .unwrap_or_else(|_| {
            Path::new(manifest_dir)
                .join("../../tests/fixtures")
                .join(name)
        })
}

// ---------------------------------------------------------------------------
// Scratch projects
// ---------------------------------------------------------------------------

/// A throwaway project tree on disk.
pub struct ScratchProject {
    pub dir: TempDir,
}

impl ScratchProject {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to a project-relative path, creating directories.
    pub fn write(&self, rel: &str, content: &str) -> &Self {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        self
    }

    /// Add a manifest named `name` at `rel`.
    pub fn manifest(&self, rel: &str, name: &str) -> &Self {
        self.write(rel, &format!("{{\n    \"name\": \"{name}\"\n}}\n"))
    }

    /// Add a source file declaring the given namespaces.
    pub fn source(&self, rel: &str, namespaces: &[&str]) -> &Self {
        let body: String = namespaces
            .iter()
            .map(|ns| format!("namespace {ns}\n{{\n}}\n"))
            .collect();
        self.write(rel, &body)
    }

    pub fn index_path(&self) -> PathBuf {
        self.root().join("Library/asmmap/index.json")
    }
}

// ---------------------------------------------------------------------------
// Scanner construction
// ---------------------------------------------------------------------------

pub fn roots(items: &[&str]) -> RootFolders {
    let mut r = RootFolders::new();
    for item in items {
        r.add(item);
    }
    r
}

/// A scanner over `project_root` that persists to `index_path`, starting empty.
pub fn fresh_scanner(project_root: &Path, index_path: &Path) -> Scanner {
    let config = ScanConfig {
        project_root: project_root.to_path_buf(),
        index_path: index_path.to_path_buf(),
        ..Default::default()
    };
    Scanner::new(config, OwnershipResolver::new())
}

/// A scanner that continues from whatever is persisted at `index_path`.
pub fn reopened_scanner(project_root: &Path, index_path: &Path) -> Scanner {
    let config = ScanConfig {
        project_root: project_root.to_path_buf(),
        index_path: index_path.to_path_buf(),
        ..Default::default()
    };
    Scanner::open(config).expect("Failed to open index")
}

/// Assembly owning `namespace` in the scanner's index.
pub fn owner_of<'a>(scanner: &'a Scanner, namespace: &str) -> &'a str {
    &scanner
        .index()
        .get(namespace)
        .unwrap_or_else(|| panic!("namespace {namespace} not indexed"))
        .assembly_name
}
