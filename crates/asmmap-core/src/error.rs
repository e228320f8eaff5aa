//! Error taxonomy for scanning and persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of an index store operation.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt index file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize index: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure reading or parsing a single manifest. Never aborts a scan.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("cannot read manifest {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse manifest {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure reading a single source file. Never aborts a scan.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("cannot read source file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure surfaced by the scan driver to its caller.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("a scan is already in progress")]
    AlreadyRunning,
    #[error("no root folders configured")]
    NoRoots,
    #[error("failed to persist index: {0}")]
    Persist(#[from] IndexError),
}

/// Failure loading a scan configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
