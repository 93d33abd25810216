//! Remote index retrieval and cache refresh
//!
//! The transport is hidden behind [`IndexSource`]. [`RemoteHubConfig`]
//! is the HTTP implementation; tests and mirrors can provide their own.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

use super::error::{FetchError, HubError};

/// Download timeout of the HTTP source
pub const FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Anything that can produce the raw bytes of the current index
pub trait IndexSource: std::fmt::Debug + Send + Sync {
    fn fetch_index(&self) -> Result<Vec<u8>, FetchError>;
}

/// Where the remote hub lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteHubConfig {
    /// Branch (or release channel) of the hub repository
    pub branch: String,

    /// URL with two `%s` placeholders: branch, then path
    pub url_template: String,

    /// Path of the index document relative to the hub root
    pub index_path: String,
}

impl RemoteHubConfig {
    /// Build the download URL of a hub-relative path
    pub fn url_to(&self, remote_path: &str) -> Result<String, FetchError> {
        let parts: Vec<&str> = self.url_template.splitn(3, "%s").collect();
        if parts.len() != 3 || parts[2].contains("%s") {
            return Err(FetchError::InvalidTemplate(self.url_template.clone()));
        }

        Ok(format!(
            "{}{}{}{}{}",
            parts[0], self.branch, parts[1], remote_path, parts[2]
        ))
    }
}

#[cfg(feature = "remote")]
impl IndexSource for RemoteHubConfig {
    fn fetch_index(&self) -> Result<Vec<u8>, FetchError> {
        let url = self.url_to(&self.index_path)?;
        tracing::debug!("fetching index from branch {} ({})", self.branch, url);

        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("rulehub/", env!("CARGO_PKG_VERSION")))
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(FetchError::Client)?;

        let response = client
            .get(&url)
            .send()
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        let body = response
            .bytes()
            .map_err(|source| FetchError::Request { url, source })?;

        Ok(body.to_vec())
    }
}

/// Stub for when the remote feature is disabled
#[cfg(not(feature = "remote"))]
impl IndexSource for RemoteHubConfig {
    fn fetch_index(&self) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Disabled)
    }
}

/// Outcome of a cache refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexUpdate {
    /// Fetched bytes equal the cached file, nothing written
    UpToDate,
    /// The cache was (re)written
    Written { bytes: usize },
}

/// Fetch the index and refresh the cache file if it changed
pub fn update_index(source: &dyn IndexSource, index_file: &Path) -> Result<IndexUpdate, HubError> {
    let body = source.fetch_index()?;

    match std::fs::read(index_file) {
        Ok(old_content) if old_content == body => {
            info!("hub index is up to date");
            return Ok(IndexUpdate::UpToDate);
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("failed to read hub index: {}", e),
    }

    write_atomic(index_file, &body).map_err(|source| HubError::WriteIndex {
        path: index_file.to_path_buf(),
        source,
    })?;

    info!("Wrote index to {}, {} bytes", index_file.display(), body.len());

    Ok(IndexUpdate::Written { bytes: body.len() })
}

/// Write through a sibling temp file so readers never see a partial index
fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(content)?;
    tmp.flush()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }

    tmp.persist(path).map(|_| ()).map_err(|e| e.error)
}
