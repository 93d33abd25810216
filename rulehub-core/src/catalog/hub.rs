//! The hub façade
//!
//! Owns the catalog and runs the construction pipeline:
//! optional index refresh, index parse, local sync.

use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::config::LocalHubConfig;
use super::error::HubError;
use super::index;
use super::item::{Item, ItemRef, ItemType, Items};
use super::remote::{self, IndexSource, IndexUpdate, RemoteHubConfig};
use super::sync;

/// Catalog of hub items merged with their local state
#[derive(Debug)]
pub struct Hub {
    items: Items,
    local: LocalHubConfig,
    source: Option<Box<dyn IndexSource>>,
    warnings: Vec<String>,
    /// Leading part of `warnings` produced by the index parser
    index_warnings: usize,
}

impl Hub {
    /// Build a hub from local and (optionally) remote configuration
    ///
    /// When `update_index` is set the cached index is refreshed from the
    /// remote first; every remote operation fails with
    /// [`HubError::NilRemote`] when `remote` is `None`.
    pub fn new(
        local: Option<LocalHubConfig>,
        remote: Option<RemoteHubConfig>,
        update_index: bool,
    ) -> Result<Self, HubError> {
        let source = remote.map(|r| Box::new(r) as Box<dyn IndexSource>);
        Self::with_source(local, source, update_index)
    }

    /// Same as [`Hub::new`] with any index transport
    pub fn with_source(
        local: Option<LocalHubConfig>,
        source: Option<Box<dyn IndexSource>>,
        update_index: bool,
    ) -> Result<Self, HubError> {
        let local = match local {
            Some(local) if !local.is_empty() => local,
            _ => return Err(HubError::NoLocalConfig),
        };

        let mut hub = Self {
            items: Items::new(),
            local,
            source,
            warnings: Vec::new(),
            index_warnings: 0,
        };

        if update_index {
            hub.update_index()?;
        }

        debug!("loading hub idx {}", hub.local.index_file.display());

        hub.parse_index()?;
        hub.local_sync()?;

        Ok(hub)
    }

    /// Download the index and rewrite the cache if it changed
    pub fn update_index(&self) -> Result<IndexUpdate, HubError> {
        let source = self.source.as_deref().ok_or(HubError::NilRemote)?;
        remote::update_index(source, &self.local.index_file)
    }

    /// Rebuild the catalog from the cached index
    ///
    /// Local state is cleared; call [`Hub::local_sync`] afterwards.
    pub fn parse_index(&mut self) -> Result<(), HubError> {
        let parsed = index::read_index(&self.local.index_file)?;

        self.items = parsed.items;
        self.index_warnings = parsed.warnings.len();
        self.warnings = parsed.warnings;

        Ok(())
    }

    /// Recompute the local state of every item
    ///
    /// Warnings from a previous sync are replaced, index warnings kept.
    /// On error the catalog and warnings are left as they were.
    pub fn local_sync(&mut self) -> Result<(), HubError> {
        let outcome = sync::sync_local_state(&mut self.items, &self.local)?;

        self.warnings.truncate(self.index_warnings);
        self.warnings.extend(outcome.warnings);

        Ok(())
    }

    /// The full catalog
    pub fn items(&self) -> &Items {
        &self.items
    }

    /// Non-fatal problems found while parsing and syncing, in order
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Where installed items keep their data files
    pub fn data_dir(&self) -> &Path {
        &self.local.install_data_dir
    }

    pub fn local_config(&self) -> &LocalHubConfig {
        &self.local
    }

    pub fn get_item_map(&self, item_type: ItemType) -> Option<&BTreeMap<String, Item>> {
        self.items.get(&item_type)
    }

    pub fn get_item(&self, item_type: ItemType, name: &str) -> Option<&Item> {
        self.items.get(&item_type)?.get(name)
    }

    /// Resolve an item key
    pub fn resolve(&self, item_ref: &ItemRef) -> Option<&Item> {
        self.get_item(item_ref.item_type, &item_ref.name)
    }

    /// Sub-items of `item` that exist in the catalog
    pub fn sub_items(&self, item: &Item) -> Vec<&Item> {
        item.sub_items()
            .iter()
            .filter_map(|sub| self.resolve(sub))
            .collect()
    }

    /// Sorted item names of one type
    pub fn item_names(&self, item_type: ItemType) -> Vec<&str> {
        self.items
            .get(&item_type)
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Installed items of one type, sorted by name
    pub fn installed_items(&self, item_type: ItemType) -> Vec<&Item> {
        self.items
            .get(&item_type)
            .map(|map| map.values().filter(|i| i.state.installed).collect())
            .unwrap_or_default()
    }

    /// Total counts of the hub items, including local and tainted
    pub fn item_stats(&self) -> Vec<String> {
        item_stats(&self.items)
    }
}

/// Summary lines for a catalog, in item type order
pub fn item_stats(items: &Items) -> Vec<String> {
    let mut loaded = Vec::new();
    let mut local = 0;
    let mut tainted = 0;

    for item_type in ItemType::ALL {
        let Some(map) = items.get(&item_type).filter(|m| !m.is_empty()) else {
            continue;
        };

        loaded.push(format!("{} {}", map.len(), item_type));

        for item in map.values() {
            if item.is_local() {
                local += 1;
            }
            if item.state.tainted {
                tainted += 1;
            }
        }
    }

    let loaded = if loaded.is_empty() {
        "0 items".to_string()
    } else {
        loaded.join(", ")
    };

    let mut stats = vec![format!("Loaded: {loaded}")];

    if local > 0 || tainted > 0 {
        stats.push(format!("Unmanaged items: {local} local, {tainted} tainted"));
    }

    stats
}
