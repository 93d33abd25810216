//! Hub error types
//!
//! Each pipeline stage has its own error type; `HubError` wraps them so a
//! caller can tell which stage failed.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading or decoding the cached index
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("unable to read index file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to unmarshal index")]
    Decode(#[from] serde_json::Error),
}

/// Failure while retrieving the remote index
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url template '{0}': expected two '%s' placeholders (branch, path)")]
    InvalidTemplate(String),

    #[cfg(feature = "remote")]
    #[error("failed to create HTTP client")]
    Client(#[source] reqwest::Error),

    #[cfg(feature = "remote")]
    #[error("failed to download index from {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("bad http code {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("index download is not enabled. Rebuild with --features remote")]
    Disabled,
}

/// Failure of a whole synchronization pass
///
/// Per-item problems never produce this; they end up in the hub warnings.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("unable to read directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Carries the per-path warnings of the aborted pass
    #[error("no item could be evaluated ({failed} failures)")]
    NothingEvaluated { failed: usize, warnings: Vec<String> },
}

/// Failure while loading the hub configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    #[error("failed to read hub configuration {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse hub configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}

/// Errors surfaced by [`Hub`](super::Hub) construction and remote operations
#[derive(Error, Debug)]
pub enum HubError {
    #[error("no hub configuration found")]
    NoLocalConfig,

    /// Returned by every remote operation when no remote is configured.
    #[error("remote hub configuration is not provided")]
    NilRemote,

    #[error("failed to fetch hub index")]
    Fetch(#[from] FetchError),

    #[error("failed to write hub index {path}")]
    WriteIndex {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load index")]
    LoadIndex(#[from] IndexError),

    #[error("failed to sync items")]
    Sync(#[from] SyncError),
}

impl HubError {
    /// Whether the error only means "no remote configured"
    ///
    /// Callers use this to fall back to the cached index.
    pub fn is_nil_remote(&self) -> bool {
        matches!(self, HubError::NilRemote)
    }
}
