//! Index persistence as pretty-printed JSON.
//!
//! Layout: `{ "mappings": { "<namespace>": { "assemblyName", "asmdefPath", "source" } } }`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::IndexError;
use crate::index::NamespaceIndex;

#[derive(Serialize)]
struct IndexFileRef<'a> {
    mappings: &'a NamespaceIndex,
}

#[derive(Deserialize)]
struct IndexFile {
    #[serde(default)]
    mappings: Option<NamespaceIndex>,
}

/// Reads and writes the namespace index at a fixed location.
#[derive(Debug, Clone)]
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store at the default project-relative location.
    pub fn default_location(project_root: &Path) -> Self {
        Self::new(project_root.join(crate::config::DEFAULT_INDEX_PATH))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `index`, creating parent directories as needed.
    pub fn save(&self, index: &NamespaceIndex) -> Result<(), IndexError> {
        write_index(&self.path, index)?;
        log::info!("saved {} namespaces to {}", index.len(), self.path.display());
        Ok(())
    }

    /// Load the persisted index. A missing file yields an empty index.
    pub fn load(&self) -> Result<NamespaceIndex, IndexError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no index at {}, starting empty", self.path.display());
                return Ok(NamespaceIndex::new());
            }
            Err(source) => {
                return Err(IndexError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        let file: Option<IndexFile> =
            serde_json::from_str(content).map_err(|source| IndexError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        Ok(file.and_then(|f| f.mappings).unwrap_or_default())
    }

    /// Write `index` to an arbitrary location in the same format.
    pub fn export_to(&self, path: &Path, index: &NamespaceIndex) -> Result<(), IndexError> {
        write_index(path, index)?;
        log::info!("exported {} namespaces to {}", index.len(), path.display());
        Ok(())
    }

    /// Persist an empty index and return how many mappings were dropped.
    ///
    /// An existing file that cannot be loaded is overwritten and counts as empty.
    pub fn clear(&self) -> Result<usize, IndexError> {
        let dropped = match self.load() {
            Ok(index) => index.len(),
            Err(e) => {
                log::warn!("{e}; replacing it with an empty index");
                0
            }
        };
        self.save(&NamespaceIndex::new())?;
        Ok(dropped)
    }
}

/// Render `index` in the persisted format.
pub fn to_json(index: &NamespaceIndex) -> Result<String, IndexError> {
    Ok(serde_json::to_string_pretty(&IndexFileRef { mappings: index })?)
}

fn write_index(path: &Path, index: &NamespaceIndex) -> Result<(), IndexError> {
    let io_err = |source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    let json = to_json(index)?;
    std::fs::write(path, json).map_err(io_err)
}
