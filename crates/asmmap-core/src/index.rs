//! Namespace ownership data model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::paths::normalize_path;

/// Where a manifest lives: a vendored dependency tree or the project's own sources.
///
/// Serialized with the tags of the persisted index format (`"Packages"` / `"Assets"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OwnershipOrigin {
    #[serde(rename = "Packages")]
    Vendored,
    #[serde(rename = "Assets")]
    ProjectLocal,
}

impl OwnershipOrigin {
    /// Classify a normalized manifest path by its leading root segment.
    ///
    /// `vendored_root` is a folder name such as `Packages`; a path is vendored when
    /// it starts with `<vendored_root>/`.
    pub fn classify(manifest_path: &str, vendored_root: &str) -> Self {
        let path = normalize_path(manifest_path);
        let root = vendored_root.trim_end_matches('/');
        match path.strip_prefix(root) {
            Some(rest) if rest.starts_with('/') => Self::Vendored,
            _ => Self::ProjectLocal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vendored => "Packages",
            Self::ProjectLocal => "Assets",
        }
    }
}

impl std::fmt::Display for OwnershipOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ownership record for one namespace string. The namespace itself is the index key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamespaceRecord {
    #[serde(rename = "assemblyName")]
    pub assembly_name: String,
    #[serde(rename = "asmdefPath")]
    pub manifest_path: String,
    #[serde(rename = "source")]
    pub origin: OwnershipOrigin,
}

/// Mapping from every namespace string (and prefix) to its single owner.
///
/// Keys are kept sorted so listings and persisted output are deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct NamespaceIndex {
    records: BTreeMap<String, NamespaceRecord>,
}

impl NamespaceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, namespace: &str) -> Option<&NamespaceRecord> {
        self.records.get(namespace)
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.records.contains_key(namespace)
    }

    /// Iterate `(namespace, record)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NamespaceRecord)> {
        self.records.iter().map(|(ns, rec)| (ns.as_str(), rec))
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Resolve the owner of a namespace.
    ///
    /// Tries the exact key first, then walks up the dotted prefixes
    /// (`Alpha.Widgets.Internal` → `Alpha.Widgets` → `Alpha`) and returns the
    /// longest one that is registered.
    pub fn resolve(&self, namespace: &str) -> Option<(&str, &NamespaceRecord)> {
        let mut candidate = namespace;
        loop {
            if let Some((key, record)) = self.records.get_key_value(candidate) {
                return Some((key.as_str(), record));
            }
            candidate = &candidate[..candidate.rfind('.')?];
        }
    }

    /// Entries whose namespace or assembly name contains `filter`, ignoring case.
    ///
    /// An empty filter matches everything. Results are ordered by namespace.
    pub fn filtered<'a>(
        &'a self,
        filter: &str,
    ) -> impl Iterator<Item = (&'a str, &'a NamespaceRecord)> + 'a {
        let needle = filter.to_lowercase();
        self.iter().filter(move |(ns, rec)| {
            needle.is_empty()
                || ns.to_lowercase().contains(&needle)
                || rec.assembly_name.to_lowercase().contains(&needle)
        })
    }

    /// Rewrite every stored manifest path to forward-slash form.
    pub fn normalize_paths(&mut self) {
        for record in self.records.values_mut() {
            if record.manifest_path.contains('\\') {
                record.manifest_path = normalize_path(&record.manifest_path);
            }
        }
    }

    pub(crate) fn insert(&mut self, namespace: String, record: NamespaceRecord) {
        self.records.insert(namespace, record);
    }
}
