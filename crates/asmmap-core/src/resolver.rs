//! Namespace ownership resolution.
//!
//! Every observation `(namespace, assembly, manifest, origin)` goes through
//! [`OwnershipResolver::register`], which decides deterministically whether the
//! observation takes over the namespace or the current owner keeps it:
//!
//! 1. an unowned namespace is always taken;
//! 2. a project-local observation takes a namespace owned by a vendored assembly;
//! 3. otherwise a strictly longer assembly name takes it;
//! 4. otherwise the current owner stays.
//!
//! Rule 3 uses name length as a stand-in for "more specific assembly". On a full
//! tie the first observation wins.

use crate::index::{NamespaceIndex, NamespaceRecord, OwnershipOrigin};
use crate::paths::normalize_path;

/// What a single registration did to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// Empty namespace, nothing recorded.
    Ignored,
    Inserted,
    Replaced,
    Retained,
}

/// Owns the authoritative namespace index and applies the tie-break policy.
#[derive(Debug, Default)]
pub struct OwnershipResolver {
    index: NamespaceIndex,
}

impl OwnershipResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue from a previously loaded index. Existing entries are refined by
    /// later observations but never removed.
    pub fn with_index(index: NamespaceIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &NamespaceIndex {
        &self.index
    }

    pub fn into_index(self) -> NamespaceIndex {
        self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.index.clear();
    }

    /// Record one observation of `namespace` being declared by `assembly_name`.
    pub fn register(
        &mut self,
        namespace: &str,
        assembly_name: &str,
        manifest_path: &str,
        origin: OwnershipOrigin,
    ) -> Registration {
        if namespace.is_empty() {
            return Registration::Ignored;
        }

        let candidate = NamespaceRecord {
            assembly_name: assembly_name.to_string(),
            manifest_path: normalize_path(manifest_path),
            origin,
        };

        let Some(existing) = self.index.get(namespace) else {
            self.index.insert(namespace.to_string(), candidate);
            return Registration::Inserted;
        };

        if takes_over(existing, &candidate) {
            log::debug!(
                "{namespace}: {} ({}) replaced by {} ({})",
                existing.assembly_name,
                existing.origin,
                candidate.assembly_name,
                candidate.origin
            );
            self.index.insert(namespace.to_string(), candidate);
            Registration::Replaced
        } else {
            Registration::Retained
        }
    }

    /// Normalize every stored manifest path.
    pub fn normalize_paths(&mut self) {
        self.index.normalize_paths();
    }
}

fn takes_over(existing: &NamespaceRecord, candidate: &NamespaceRecord) -> bool {
    if existing.origin == OwnershipOrigin::Vendored
        && candidate.origin == OwnershipOrigin::ProjectLocal
    {
        return true;
    }
    candidate.assembly_name.chars().count() > existing.assembly_name.chars().count()
}
