//! Lexical namespace extraction from C# source text.
//!
//! This is a best-effort textual scan, not a parse: declarations inside comments,
//! string literals or inactive `#if` regions are reported like any other.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::SourceError;

static NAMESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"namespace\s+([\w.]+)").unwrap());

/// Every namespace declared in `text`, each expanded into all of its dotted prefixes.
///
/// `namespace A.B.C` yields `A`, `A.B` and `A.B.C`.
pub fn extract_namespaces(text: &str) -> BTreeSet<String> {
    let mut result = BTreeSet::new();

    for cap in NAMESPACE_RE.captures_iter(text) {
        let full = &cap[1];
        let mut current = String::new();
        for part in full.split('.') {
            if !current.is_empty() {
                current.push('.');
            }
            current.push_str(part);
            if !current.is_empty() {
                result.insert(current.clone());
            }
        }
    }

    result
}

/// Read `path` and extract its namespaces.
///
/// Invalid UTF-8 sequences (legacy code-page comments and the like) are replaced
/// rather than rejected. Only I/O failures are errors.
pub fn extract_namespaces_from_file(
    path: &Path,
    display_path: &str,
) -> Result<BTreeSet<String>, SourceError> {
    let bytes = std::fs::read(path).map_err(|source| SourceError::Read {
        path: display_path.to_string(),
        source,
    })?;
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(&bytes);
    Ok(extract_namespaces(&String::from_utf8_lossy(bytes)))
}
