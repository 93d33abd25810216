//! Hub configuration
//!
//! The local section locates the index cache and the installation tree;
//! the optional remote section describes where the index is downloaded
//! from. Both are usually read from a YAML file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::remote::RemoteHubConfig;

/// Default configuration file name inside the config directory
pub const CONFIG_FILE: &str = "hub.yaml";

/// Default index file name inside the hub directory
pub const INDEX_FILE: &str = ".index.json";

/// Local, pre-resolved directories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalHubConfig {
    /// Where downloaded item files live, mirroring the remote layout
    pub hub_dir: PathBuf,

    /// Cached copy of the remote index
    pub index_file: PathBuf,

    /// Root of the `<type>/[<stage>/]<file>` installation tree
    pub install_dir: PathBuf,

    /// Where items install their data files
    pub install_data_dir: PathBuf,
}

impl LocalHubConfig {
    /// Conventional layout below a single root directory
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let hub_dir = root.join("hub");
        Self {
            index_file: hub_dir.join(INDEX_FILE),
            hub_dir,
            install_dir: root.to_path_buf(),
            install_data_dir: root.join("data"),
        }
    }

    /// A configuration without an index file or data directory is unusable
    pub fn is_empty(&self) -> bool {
        self.index_file.as_os_str().is_empty() || self.install_data_dir.as_os_str().is_empty()
    }
}

/// Configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub local: Option<LocalHubConfig>,

    #[serde(default)]
    pub remote: Option<RemoteHubConfig>,
}

impl HubConfig {
    /// Parse a configuration from YAML
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_yaml_ng::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content, path)
    }

    /// Default config file path (`<config dir>/hub.yaml`)
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        directories::ProjectDirs::from("net", "rulehub", "rulehub")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }
}
