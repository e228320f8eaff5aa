//! Index persistence round-trips.

mod common;

use asmmap_core::error::IndexError;
use asmmap_core::index::{NamespaceIndex, OwnershipOrigin};
use asmmap_core::resolver::OwnershipResolver;
use asmmap_core::store::IndexStore;
use common::*;
use pretty_assertions::assert_eq;

fn populated_index() -> NamespaceIndex {
    let mut r = OwnershipResolver::new();
    for (ns, asm, path, origin) in [
        ("Alpha", "PkgB", "Assets/Scripts/PkgB.asmdef", OwnershipOrigin::ProjectLocal),
        ("Alpha.Widgets", "PkgB", "Assets/Scripts/PkgB.asmdef", OwnershipOrigin::ProjectLocal),
        ("UnityEngine", "UnityEngine.UI", r"Packages\com.unity.ugui\UI.asmdef", OwnershipOrigin::Vendored),
        ("Ünïcödé.Names", "Intl", "Assets/Intl/Intl.asmdef", OwnershipOrigin::ProjectLocal),
    ] {
        r.register(ns, asm, path, origin);
    }
    r.into_index()
}

#[test]
fn round_trip_populated_index() {
    let dir = tempfile::tempdir().unwrap();
    let store = IndexStore::new(dir.path().join("index.json"));
    let index = populated_index();

    store.save(&index).unwrap();
    assert_eq!(store.load().unwrap(), index);
}

#[test]
fn round_trip_empty_index() {
    let dir = tempfile::tempdir().unwrap();
    let store = IndexStore::new(dir.path().join("index.json"));

    store.save(&NamespaceIndex::new()).unwrap();
    assert_eq!(store.load().unwrap(), NamespaceIndex::new());
}

#[test]
fn load_then_save_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let store = IndexStore::new(dir.path().join("index.json"));
    store.save(&populated_index()).unwrap();
    let first = std::fs::read(store.path()).unwrap();

    let reloaded = store.load().unwrap();
    store.save(&reloaded).unwrap();
    assert_eq!(std::fs::read(store.path()).unwrap(), first);
}

#[test]
fn hand_written_file_in_any_key_order_loads() {
    let project = ScratchProject::new();
    project.write(
        "index.json",
        r#"{
  "mappings": {
    "Zeta": { "source": "Packages", "asmdefPath": "Packages/z/Z.asmdef", "assemblyName": "Z" },
    "Alpha": { "assemblyName": "A", "asmdefPath": "Assets/A.asmdef", "source": "Assets", "extra": 1 }
  }
}"#,
    );

    let index = IndexStore::new(project.root().join("index.json")).load().unwrap();
    assert_eq!(index.len(), 2);
    let keys: Vec<&str> = index.iter().map(|(ns, _)| ns).collect();
    assert_eq!(keys, vec!["Alpha", "Zeta"]);
    assert_eq!(index.get("Zeta").unwrap().origin, OwnershipOrigin::Vendored);
}

#[test]
fn truncated_file_is_corrupt() {
    let project = ScratchProject::new();
    project.write("index.json", "{\n  \"mappings\": {\n    \"Alpha\": {");

    let err = IndexStore::new(project.root().join("index.json"))
        .load()
        .unwrap_err();
    assert!(matches!(err, IndexError::Corrupt { .. }));
    assert!(err.to_string().contains("index.json"));
}

#[test]
fn stored_paths_use_forward_slashes() {
    let dir = tempfile::tempdir().unwrap();
    let store = IndexStore::new(dir.path().join("index.json"));
    store.save(&populated_index()).unwrap();

    let text = std::fs::read_to_string(store.path()).unwrap();
    assert!(text.contains("Packages/com.unity.ugui/UI.asmdef"));
    assert!(!text.contains("\\\\"));
}
