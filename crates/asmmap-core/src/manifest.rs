//! Assembly manifest (`.asmdef`) parser.
//!
//! Only the `name` field is consumed; everything else in the document is ignored.

use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::error::ManifestError;

/// Parsed assembly manifest.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AssemblyManifest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl AssemblyManifest {
    /// A manifest without a name takes no part in ownership at all.
    pub fn is_registrable(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Parse manifest JSON content. `display_path` is only used for error messages.
///
/// A leading byte-order mark is tolerated, and a `null` document parses as an
/// unnamed manifest.
pub fn parse_manifest(content: &str, display_path: &str) -> Result<AssemblyManifest, ManifestError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let parsed: Option<AssemblyManifest> =
        serde_json::from_str(content).map_err(|source| ManifestError::Parse {
            path: display_path.to_string(),
            source,
        })?;
    Ok(parsed.unwrap_or_default())
}

/// Read and parse the manifest at `path`.
pub fn read_manifest(path: &Path, display_path: &str) -> Result<AssemblyManifest, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: display_path.to_string(),
        source,
    })?;
    parse_manifest(&content, display_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ASMDEF: &str = r#"{
    "name": "Acme.Widgets",
    "rootNamespace": "Acme.Widgets",
    "references": ["Acme.Core"],
    "includePlatforms": [],
    "allowUnsafeCode": false
}"#;

    #[test]
    fn parse_name_and_ignore_other_fields() {
        let manifest = parse_manifest(SAMPLE_ASMDEF, "Acme.Widgets.asmdef").unwrap();
        assert_eq!(manifest.name, "Acme.Widgets");
        assert!(manifest.is_registrable());
    }

    #[test]
    fn missing_name_is_not_registrable() {
        let manifest = parse_manifest(r#"{ "references": [] }"#, "x.asmdef").unwrap();
        assert_eq!(manifest.name, "");
        assert!(!manifest.is_registrable());
    }

    #[test]
    fn empty_name_is_not_registrable() {
        let manifest = parse_manifest(r#"{ "name": "" }"#, "x.asmdef").unwrap();
        assert!(!manifest.is_registrable());
    }

    #[test]
    fn null_name_is_not_registrable() {
        let manifest = parse_manifest(r#"{ "name": null }"#, "x.asmdef").unwrap();
        assert!(!manifest.is_registrable());
    }

    #[test]
    fn null_document_is_unnamed() {
        let manifest = parse_manifest("null", "x.asmdef").unwrap();
        assert!(!manifest.is_registrable());
    }

    #[test]
    fn byte_order_mark_is_tolerated() {
        let manifest = parse_manifest("\u{feff}{\"name\":\"Game\"}", "x.asmdef").unwrap();
        assert_eq!(manifest.name, "Game");
    }

    #[test]
    fn malformed_json_reports_path() {
        let err = parse_manifest("{ name: ", "Assets/Broken.asmdef").unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
        assert!(err.to_string().contains("Assets/Broken.asmdef"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = read_manifest(Path::new("/nonexistent/x.asmdef"), "x.asmdef").unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }
}
