//! Index parsing
//!
//! The index is a JSON document keyed by item type, then by item name.
//! Decoding is generic serde; the derived fields (name, author, type,
//! file name, stage) are filled in by a separate completion pass.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, trace};

use super::error::IndexError;
use super::item::{Item, ItemType, Items};

/// Wire schema of the index document
///
/// Unknown top-level keys are ignored so newer indexes stay readable.
#[derive(Debug, Default, Deserialize)]
struct IndexDocument {
    #[serde(default)]
    parsers: BTreeMap<String, Item>,
    #[serde(default)]
    postoverflows: BTreeMap<String, Item>,
    #[serde(default)]
    scenarios: BTreeMap<String, Item>,
    #[serde(default)]
    contexts: BTreeMap<String, Item>,
    #[serde(rename = "appsec-configs", default)]
    appsec_configs: BTreeMap<String, Item>,
    #[serde(rename = "appsec-rules", default)]
    appsec_rules: BTreeMap<String, Item>,
    #[serde(default)]
    collections: BTreeMap<String, Item>,
}

impl IndexDocument {
    fn into_items(self) -> Items {
        Items::from([
            (ItemType::Parsers, self.parsers),
            (ItemType::PostOverflows, self.postoverflows),
            (ItemType::Scenarios, self.scenarios),
            (ItemType::Contexts, self.contexts),
            (ItemType::AppsecConfigs, self.appsec_configs),
            (ItemType::AppsecRules, self.appsec_rules),
            (ItemType::Collections, self.collections),
        ])
    }
}

/// A decoded and completed index
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIndex {
    pub items: Items,
    /// Reference integrity problems, in type then name order
    pub warnings: Vec<String>,
}

/// Read and parse the cached index file
pub fn read_index(path: &Path) -> Result<ParsedIndex, IndexError> {
    let bytes = std::fs::read(path).map_err(|source| IndexError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_index(&bytes)
}

/// Decode index bytes into a completed catalog
pub fn parse_index(bytes: &[u8]) -> Result<ParsedIndex, IndexError> {
    let document: IndexDocument = serde_json::from_slice(bytes)?;
    let mut items = document.into_items();

    debug!(
        "{} items in hub index",
        items.values().map(|m| m.len()).sum::<usize>()
    );

    complete_items(&mut items);
    let warnings = missing_sub_items(&items);

    Ok(ParsedIndex { items, warnings })
}

/// Fill in the fields that are derived rather than decoded
pub fn complete_items(items: &mut Items) {
    for (item_type, map) in items.iter_mut() {
        trace!("{}: {} items", item_type, map.len());

        for (name, item) in map.iter_mut() {
            item.name = name.clone();

            // if the item has no (redundant) author, take it from the key
            if item.author.is_empty() {
                if let Some((author, _)) = name.split_once('/') {
                    item.author = author.to_string();
                }
            }

            item.item_type = *item_type;
            item.file_name = base_name(&item.remote_path).to_string();

            if item_type.is_staged() && item.stage.is_empty() {
                item.stage = stage_from_path(&item.remote_path).to_string();
            }
        }
    }
}

/// One warning per sub-item reference that points nowhere
pub fn missing_sub_items(items: &Items) -> Vec<String> {
    let mut warnings = Vec::new();

    for map in items.values() {
        for item in map.values() {
            for sub in item.sub_items() {
                let exists = items
                    .get(&sub.item_type)
                    .is_some_and(|m| m.contains_key(&sub.name));

                if !exists {
                    let warning = format!(
                        "referred {} in {} {} doesn't exist",
                        sub,
                        item.item_type.singular(),
                        item.name
                    );
                    debug!("{}", warning);
                    warnings.push(warning);
                }
            }
        }
    }

    warnings
}

/// Last segment of a `/`-separated path, empty for an empty path
fn base_name(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}

/// `parsers/s01-parse/acme/sshd-logs.yaml` -> `s01-parse`
fn stage_from_path(path: &str) -> &str {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() >= 4 {
        segments[1]
    } else {
        ""
    }
}
