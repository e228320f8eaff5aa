//! Scan configuration and the root folder list.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paths::{normalize_path, normalize_path_buf};

/// Project-relative location of the persisted index.
pub const DEFAULT_INDEX_PATH: &str = "Assets/VirtuaLabs/Resources/AssemblyNamespaceIndex.json";

/// Folder whose subtrees hold vendored packages.
pub const DEFAULT_VENDORED_ROOT: &str = "Packages";

/// Project-local source folder.
pub const PROJECT_ASSETS_ROOT: &str = "Assets";

/// Package folders with this prefix are engine built-ins and never added in bulk.
const BUILTIN_PACKAGE_PREFIX: &str = "com.unity.";

/// Ordered list of folders to scan. Adding a folder that is already present is a no-op.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct RootFolders {
    folders: Vec<String>,
}

impl RootFolders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a folder, normalizing separators. Returns `false` for a duplicate.
    pub fn add(&mut self, folder: &str) -> bool {
        let folder = normalize_path(folder);
        if folder.is_empty() || self.folders.contains(&folder) {
            return false;
        }
        self.folders.push(folder);
        true
    }

    /// Add a folder given as an absolute path, rewriting it to `Assets/...` when it
    /// lies inside the project's assets folder.
    pub fn add_absolute(&mut self, project_root: &Path, folder: &Path) -> bool {
        let assets = project_root.join(PROJECT_ASSETS_ROOT);
        match folder.strip_prefix(&assets) {
            Ok(rest) if rest.as_os_str().is_empty() => self.add(PROJECT_ASSETS_ROOT),
            Ok(rest) => self.add(&format!("{PROJECT_ASSETS_ROOT}/{}", normalize_path_buf(rest))),
            Err(_) => self.add(&normalize_path_buf(folder)),
        }
    }

    /// Add every vendored package folder except engine built-ins.
    ///
    /// Returns how many folders were newly added. A missing vendored root adds nothing.
    pub fn add_all_packages(&mut self, project_root: &Path, vendored_root: &str) -> usize {
        let Ok(entries) = std::fs::read_dir(project_root.join(vendored_root)) else {
            return 0;
        };

        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| !name.starts_with(BUILTIN_PACKAGE_PREFIX))
            .collect();
        names.sort();

        let mut added = 0;
        for name in names {
            if self.add(&format!("{vendored_root}/{name}")) {
                added += 1;
            }
        }
        added
    }

    pub fn remove(&mut self, folder: &str) -> bool {
        let folder = normalize_path(folder);
        let before = self.folders.len();
        self.folders.retain(|f| *f != folder);
        self.folders.len() != before
    }

    pub fn as_slice(&self) -> &[String] {
        &self.folders
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

/// Configuration for a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_project_root")]
    pub project_root: PathBuf,
    #[serde(default)]
    pub roots: RootFolders,
    /// Index file location, relative to the project root unless absolute.
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,
    #[serde(default = "default_manifest_extension")]
    pub manifest_extension: String,
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
    #[serde(default = "default_vendored_root")]
    pub vendored_root: String,
}

fn default_project_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_index_path() -> PathBuf {
    PathBuf::from(DEFAULT_INDEX_PATH)
}
fn default_manifest_extension() -> String {
    "asmdef".to_string()
}
fn default_source_extension() -> String {
    "cs".to_string()
}
fn default_vendored_root() -> String {
    DEFAULT_VENDORED_ROOT.to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            project_root: default_project_root(),
            roots: RootFolders::default(),
            index_path: default_index_path(),
            manifest_extension: default_manifest_extension(),
            source_extension: default_source_extension(),
            vendored_root: default_vendored_root(),
        }
    }
}

impl ScanConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Index file path resolved against the project root.
    pub fn resolved_index_path(&self) -> PathBuf {
        self.project_root.join(&self.index_path)
    }
}
