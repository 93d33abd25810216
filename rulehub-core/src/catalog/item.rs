//! Catalog items and item types
//!
//! An [`Item`] merges what the index says about a piece of content with
//! what the synchronizer observed on disk ([`ItemState`]).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::config::LocalHubConfig;

/// The full catalog: item type -> item name -> item
pub type Items = BTreeMap<ItemType, BTreeMap<String, Item>>;

/// Category of hub content
///
/// The declaration order is the reporting order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ItemType {
    // Placeholder until the index pass assigns the real type
    #[default]
    #[serde(rename = "parsers")]
    Parsers,
    #[serde(rename = "postoverflows")]
    PostOverflows,
    #[serde(rename = "scenarios")]
    Scenarios,
    #[serde(rename = "contexts")]
    Contexts,
    #[serde(rename = "appsec-configs")]
    AppsecConfigs,
    #[serde(rename = "appsec-rules")]
    AppsecRules,
    #[serde(rename = "collections")]
    Collections,
}

impl ItemType {
    /// Every item type, in reporting order
    pub const ALL: [ItemType; 7] = [
        ItemType::Parsers,
        ItemType::PostOverflows,
        ItemType::Scenarios,
        ItemType::Contexts,
        ItemType::AppsecConfigs,
        ItemType::AppsecRules,
        ItemType::Collections,
    ];

    /// Name used as index key and installation subdirectory
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Parsers => "parsers",
            ItemType::PostOverflows => "postoverflows",
            ItemType::Scenarios => "scenarios",
            ItemType::Contexts => "contexts",
            ItemType::AppsecConfigs => "appsec-configs",
            ItemType::AppsecRules => "appsec-rules",
            ItemType::Collections => "collections",
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            ItemType::Parsers => "parser",
            ItemType::PostOverflows => "postoverflow",
            ItemType::Scenarios => "scenario",
            ItemType::Contexts => "context",
            ItemType::AppsecConfigs => "appsec-config",
            ItemType::AppsecRules => "appsec-rule",
            ItemType::Collections => "collection",
        }
    }

    /// Staged types are installed under `<type>/<stage>/<file>`
    pub fn is_staged(&self) -> bool {
        matches!(self, ItemType::Parsers | ItemType::PostOverflows)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemType::ALL
            .into_iter()
            .find(|t| t.as_str() == s || t.singular() == s)
            .ok_or_else(|| format!("unknown item type: {s}"))
    }
}

/// Non-owning key of an item inside a hub
///
/// Resolve it with [`Hub::resolve`](super::Hub::resolve).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ItemRef {
    pub item_type: ItemType,
    pub name: String,
}

impl ItemRef {
    pub fn new(item_type: ItemType, name: impl Into<String>) -> Self {
        Self {
            item_type,
            name: name.into(),
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.item_type.singular(), self.name)
    }
}

/// Metadata of one published version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemVersion {
    /// Hex SHA-256 of the item content at this version
    #[serde(default)]
    pub digest: String,

    #[serde(default)]
    pub deprecated: bool,
}

/// Locally observed state, recomputed by every sync pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemState {
    /// Installed path (link or file) under the installation directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,

    /// Version matching the local content, `"?"` when none matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_hash: Option<String>,

    pub installed: bool,
    pub downloaded: bool,
    pub up_to_date: bool,
    pub tainted: bool,

    /// Sub-items that caused this item to be tainted
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tainted_by: Vec<String>,

    /// Installed items that list this one as a sub-item
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub belongs_to_collections: Vec<String>,
}

/// A single catalog entry
///
/// Fields marked `skip_deserializing` are filled in by the index
/// completion pass or by the synchronizer, never by the index document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(skip_deserializing)]
    pub name: String,

    #[serde(rename = "type", skip_deserializing)]
    pub item_type: ItemType,

    #[serde(default)]
    pub author: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stage: String,

    /// Path of the item on the distribution server, relative to the hub root
    #[serde(rename = "path", default)]
    pub remote_path: String,

    #[serde(skip_deserializing)]
    pub file_name: String,

    /// Latest available version
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub versions: BTreeMap<String, ItemVersion>,

    #[serde(default)]
    pub description: String,

    /// Opaque (base64) content as shipped in the index
    #[serde(default, skip_serializing)]
    pub content: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parsers: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub postoverflows: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenarios: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<String>,

    #[serde(rename = "appsec-configs", default, skip_serializing_if = "Vec::is_empty")]
    pub appsec_configs: Vec<String>,

    #[serde(rename = "appsec-rules", default, skip_serializing_if = "Vec::is_empty")]
    pub appsec_rules: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<String>,

    #[serde(skip_deserializing)]
    pub state: ItemState,
}

impl Item {
    /// Synthesize an entry for an installed file the index does not know
    pub fn local(item_type: ItemType, file_name: &str, stage: &str, path: PathBuf) -> Self {
        Self {
            name: file_name.to_string(),
            item_type,
            stage: stage.to_string(),
            file_name: file_name.to_string(),
            state: ItemState {
                local_path: Some(path),
                installed: true,
                up_to_date: true,
                ..ItemState::default()
            },
            ..Self::default()
        }
    }

    /// Installed, but not backed by the index
    pub fn is_local(&self) -> bool {
        self.state.installed && self.remote_path.is_empty()
    }

    pub fn item_ref(&self) -> ItemRef {
        ItemRef::new(self.item_type, self.name.clone())
    }

    /// All declared sub-item references, in item type order
    pub fn sub_items(&self) -> Vec<ItemRef> {
        let lists: [(ItemType, &Vec<String>); 7] = [
            (ItemType::Parsers, &self.parsers),
            (ItemType::PostOverflows, &self.postoverflows),
            (ItemType::Scenarios, &self.scenarios),
            (ItemType::Contexts, &self.contexts),
            (ItemType::AppsecConfigs, &self.appsec_configs),
            (ItemType::AppsecRules, &self.appsec_rules),
            (ItemType::Collections, &self.collections),
        ];

        lists
            .into_iter()
            .flat_map(|(item_type, names)| {
                names.iter().map(move |name| ItemRef::new(item_type, name.clone()))
            })
            .collect()
    }

    pub fn has_sub_items(&self) -> bool {
        !self.sub_items().is_empty()
    }

    /// Where the downloaded copy lives, if the item comes from the index
    pub fn hub_path(&self, local: &LocalHubConfig) -> Option<PathBuf> {
        if self.remote_path.is_empty() {
            return None;
        }
        Some(local.hub_dir.join(&self.remote_path))
    }

    /// Conventional installation path: `<install_dir>/<type>/[<stage>/]<file>`
    pub fn install_path(&self, local: &LocalHubConfig) -> PathBuf {
        let mut path = local.install_dir.join(self.item_type.as_str());
        if !self.stage.is_empty() {
            path.push(&self.stage);
        }
        path.join(&self.file_name)
    }

    /// Version whose digest matches `hash`
    pub fn version_for_digest(&self, hash: &str) -> Option<&str> {
        self.versions
            .iter()
            .find(|(_, v)| super::hasher::digest_matches(&v.digest, hash))
            .map(|(version, _)| version.as_str())
    }

    /// Whether the latest version is marked deprecated
    pub fn is_deprecated(&self) -> bool {
        self.versions
            .get(&self.version)
            .map(|v| v.deprecated)
            .unwrap_or(false)
    }

    /// Truncate description to first line
    pub fn short_description(&self) -> &str {
        self.description
            .lines()
            .next()
            .unwrap_or(&self.description)
            .trim()
    }
}
