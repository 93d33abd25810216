//! Local state synchronization
//!
//! Annotates a parsed catalog with what is actually on disk:
//!
//! ```text
//! hub_dir/<remote_path>                     ← downloaded copy, fingerprinted
//! install_dir/<type>/[<stage>/]<file>.yaml  ← installed link or file
//! ```
//!
//! Installed links must resolve to a downloaded hub file. Installed regular
//! files either match an indexed item by stage and file name (an installed
//! copy) or become local-only items.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::config::LocalHubConfig;
use super::error::SyncError;
use super::hasher;
use super::item::{Item, ItemRef, ItemState, ItemType, Items};

/// Version reported when local content matches no published version
pub const UNKNOWN_VERSION: &str = "?";

/// Result of a sync pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Paths that were examined, including expected files found missing
    pub evaluated: usize,
    /// Paths that could not be examined
    pub failed: usize,
    /// Per-item problems, in discovery order
    pub warnings: Vec<String>,
}

/// Recompute the local state of every item
///
/// Previous state and previously synthesized local items are discarded
/// first, so the pass is idempotent. The pass runs on a copy of the
/// catalog; `items` is only replaced when it succeeds.
pub fn sync_local_state(
    items: &mut Items,
    local: &LocalHubConfig,
) -> Result<SyncOutcome, SyncError> {
    let mut sync = Synchronizer {
        local,
        outcome: SyncOutcome::default(),
        hub_files: HashMap::new(),
    };

    let mut next = items.clone();
    reset_state(&mut next);
    sync.scan_hub_dir(&mut next);
    sync.scan_install_dir(&mut next)?;
    sync.link_collections(&mut next);

    let outcome = sync.outcome;
    if outcome.evaluated == 0 && outcome.failed > 0 {
        return Err(SyncError::NothingEvaluated {
            failed: outcome.failed,
            warnings: outcome.warnings,
        });
    }

    debug!(
        "sync done: {} paths evaluated, {} failed",
        outcome.evaluated, outcome.failed
    );
    *items = next;
    Ok(outcome)
}

fn reset_state(items: &mut Items) {
    for map in items.values_mut() {
        map.retain(|_, item| !item.is_local());
        for item in map.values_mut() {
            item.state = ItemState::default();
        }
    }
}

/// An installation entry that follows the naming convention
#[derive(Debug)]
struct InstallEntry {
    item_type: ItemType,
    path: PathBuf,
    file_name: String,
    stage: String,
    is_link: bool,
}

impl InstallEntry {
    fn from_walk(item_type: ItemType, entry: &walkdir::DirEntry) -> Option<Self> {
        if entry.file_type().is_dir() {
            return None;
        }

        let expected_depth = if item_type.is_staged() { 2 } else { 1 };
        if entry.depth() != expected_depth {
            debug!("ignoring {}: unexpected location", entry.path().display());
            return None;
        }

        let file_name = entry.file_name().to_str()?.to_string();
        if !(file_name.ends_with(".yaml") || file_name.ends_with(".yml")) {
            debug!("ignoring {}: not a yaml file", entry.path().display());
            return None;
        }

        let stage = if item_type.is_staged() {
            entry.path().parent()?.file_name()?.to_str()?.to_string()
        } else {
            String::new()
        };

        Some(Self {
            item_type,
            path: entry.path().to_path_buf(),
            file_name,
            stage,
            is_link: entry.path_is_symlink(),
        })
    }
}

struct Synchronizer<'a> {
    local: &'a LocalHubConfig,
    outcome: SyncOutcome,
    /// Canonical hub file path -> owning item, to resolve installed links
    hub_files: HashMap<PathBuf, ItemRef>,
}

impl Synchronizer<'_> {
    fn fail(&mut self, path: &Path, error: &io::Error) {
        warn!("failed to evaluate {}: {}", path.display(), error);
        self.outcome.failed += 1;
        self.outcome
            .warnings
            .push(format!("{}: {}", path.display(), error));
    }

    fn warn(&mut self, message: String) {
        debug!("{}", message);
        self.outcome.warnings.push(message);
    }

    /// Fingerprint the downloaded copy of every indexed item
    fn scan_hub_dir(&mut self, items: &mut Items) {
        for map in items.values_mut() {
            for item in map.values_mut() {
                let Some(path) = item.hub_path(self.local) else {
                    continue;
                };

                match hasher::hash_file(&path) {
                    Ok(hash) => {
                        self.outcome.evaluated += 1;
                        item.state.downloaded = true;
                        apply_fingerprint(item, hash);

                        let key = std::fs::canonicalize(&path).unwrap_or(path);
                        self.hub_files.insert(key, item.item_ref());
                    }
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        self.outcome.evaluated += 1;
                    }
                    Err(e) => self.fail(&path, &e),
                }
            }
        }
    }

    /// Walk `install_dir/<type>/` for every known type
    fn scan_install_dir(&mut self, items: &mut Items) -> Result<(), SyncError> {
        if !dir_exists(&self.local.install_dir)? {
            debug!(
                "no installation directory at {}",
                self.local.install_dir.display()
            );
            return Ok(());
        }

        for item_type in ItemType::ALL {
            let type_dir = self.local.install_dir.join(item_type.as_str());
            if !dir_exists(&type_dir)? {
                continue;
            }

            let max_depth = if item_type.is_staged() { 2 } else { 1 };
            let walker = WalkDir::new(&type_dir)
                .min_depth(1)
                .max_depth(max_depth)
                .sort_by_file_name();

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        let path = e.path().unwrap_or(type_dir.as_path()).to_path_buf();
                        self.fail(&path, &io::Error::from(e));
                        continue;
                    }
                };

                if let Some(install) = InstallEntry::from_walk(item_type, &entry) {
                    if install.is_link {
                        self.evaluate_link(items, install);
                    } else {
                        self.evaluate_file(items, install);
                    }
                }
            }
        }

        Ok(())
    }

    /// An installed link must point at a downloaded item of the same type
    fn evaluate_link(&mut self, items: &mut Items, entry: InstallEntry) {
        let target = match std::fs::canonicalize(&entry.path) {
            Ok(target) => target,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.outcome.evaluated += 1;
                self.warn(format!("{}: dangling link, ignored", entry.path.display()));
                return;
            }
            Err(e) => {
                self.fail(&entry.path, &e);
                return;
            }
        };
        self.outcome.evaluated += 1;

        let Some(item_ref) = self.hub_files.get(&target).cloned() else {
            self.warn(format!(
                "{}: links to {}, which is not a hub item, ignored",
                entry.path.display(),
                target.display()
            ));
            return;
        };

        if item_ref.item_type != entry.item_type {
            self.warn(format!(
                "{}: links to {} but is installed as a {}, ignored",
                entry.path.display(),
                item_ref,
                entry.item_type.singular()
            ));
            return;
        }

        if let Some(item) = lookup_mut(items, &item_ref) {
            if let Some(message) = mark_installed(item, entry.path) {
                self.warn(message);
            }
        }
    }

    /// A regular file is an installed copy of an indexed item, or a local item
    fn evaluate_file(&mut self, items: &mut Items, entry: InstallEntry) {
        let hash = match hasher::hash_file(&entry.path) {
            Ok(hash) => hash,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // removed while walking
                self.outcome.evaluated += 1;
                return;
            }
            Err(e) => {
                self.fail(&entry.path, &e);
                return;
            }
        };
        self.outcome.evaluated += 1;

        let map = items.entry(entry.item_type).or_default();

        let managed = map
            .values()
            .find(|item| {
                !item.remote_path.is_empty()
                    && item.file_name == entry.file_name
                    && item.stage == entry.stage
            })
            .map(|item| item.name.clone());

        if let Some(name) = managed {
            let Some(item) = map.get_mut(&name) else {
                return;
            };
            if let Some(message) = mark_installed(item, entry.path) {
                self.warn(message);
                return;
            }
            apply_fingerprint(item, hash);
            return;
        }

        if let Some(existing) = map.get(&entry.file_name) {
            let kind = if existing.is_local() { "local" } else { "indexed" };
            self.warn(format!(
                "{}: local {} clashes with {} item {}, ignored",
                entry.path.display(),
                entry.item_type.singular(),
                kind,
                entry.file_name
            ));
            return;
        }

        debug!("found local {} {}", entry.item_type.singular(), entry.file_name);
        let mut item = Item::local(entry.item_type, &entry.file_name, &entry.stage, entry.path);
        item.state.local_hash = Some(hash);
        map.insert(entry.file_name, item);
    }

    /// Record collection membership and propagate taint from sub-items
    fn link_collections(&mut self, items: &mut Items) {
        let owners: Vec<(ItemRef, Vec<ItemRef>)> = items
            .values()
            .flat_map(|map| map.values())
            .filter(|item| item.state.installed && item.has_sub_items())
            .map(|item| (item.item_ref(), item.sub_items()))
            .collect();

        for (owner, subs) in &owners {
            for sub in subs {
                // dangling references were reported when the index was parsed
                let Some(sub_item) = lookup_mut(items, sub) else {
                    continue;
                };

                if sub_item.state.installed {
                    sub_item
                        .state
                        .belongs_to_collections
                        .push(owner.name.clone());
                } else {
                    self.warn(format!("{owner} is installed but {sub} is not"));
                }
            }
        }

        // collections can nest, so repeat until nothing changes
        loop {
            let mut changed = false;

            for (owner, subs) in &owners {
                for sub in subs {
                    let sub_tainted = lookup(items, sub)
                        .is_some_and(|s| s.state.installed && s.state.tainted);
                    if !sub_tainted {
                        continue;
                    }

                    let Some(owner_item) = lookup_mut(items, owner) else {
                        continue;
                    };

                    let label = sub.to_string();
                    if owner_item.state.tainted_by.contains(&label) {
                        continue;
                    }

                    owner_item.state.tainted = true;
                    owner_item.state.tainted_by.push(label);
                    changed = true;
                    self.warn(format!("{owner} is tainted by {sub}"));
                }
            }

            if !changed {
                break;
            }
        }
    }
}

/// Returns a warning instead of overwriting an existing installation
fn mark_installed(item: &mut Item, path: PathBuf) -> Option<String> {
    if let Some(existing) = &item.state.local_path {
        if item.state.installed {
            return Some(format!(
                "{} is installed more than once ({} and {}), keeping the first",
                item.item_ref(),
                existing.display(),
                path.display()
            ));
        }
    }

    item.state.installed = true;
    item.state.local_path = Some(path);
    None
}

/// Compare a content hash with the published versions
fn apply_fingerprint(item: &mut Item, hash: String) {
    match item.version_for_digest(&hash).map(str::to_string) {
        Some(version) => {
            item.state.up_to_date = version == item.version;
            item.state.tainted = false;
            item.state.local_version = Some(version);
        }
        None => {
            item.state.up_to_date = false;
            item.state.tainted = true;
            item.state.local_version = Some(UNKNOWN_VERSION.to_string());
        }
    }
    item.state.local_hash = Some(hash);
}

fn dir_exists(path: &Path) -> Result<bool, SyncError> {
    match std::fs::metadata(path) {
        Ok(metadata) => Ok(metadata.is_dir()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(SyncError::ReadDir {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn lookup<'a>(items: &'a Items, item_ref: &ItemRef) -> Option<&'a Item> {
    items.get(&item_ref.item_type)?.get(&item_ref.name)
}

fn lookup_mut<'a>(items: &'a mut Items, item_ref: &ItemRef) -> Option<&'a mut Item> {
    items.get_mut(&item_ref.item_type)?.get_mut(&item_ref.name)
}

#[cfg(test)]
mod sync_tests {
    use super::*;
    use crate::catalog::index::parse_index;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const SSHD_V1: &str = "name: acme/sshd-logs\nversion: 1\n";
    const SSHD_V2: &str = "name: acme/sshd-logs\nversion: 2\n";
    const SSH_BF: &str = "name: acme/ssh-bf\ntype: leaky\n";
    const COLLECTION: &str = "parsers: [acme/sshd-logs]\nscenarios: [acme/ssh-bf]\n";

    fn index_json() -> String {
        format!(
            r#"{{
  "parsers": {{
    "acme/sshd-logs": {{
      "path": "parsers/s01-parse/acme/sshd-logs.yaml",
      "version": "0.2",
      "versions": {{"0.1": {{"digest": "{}"}}, "0.2": {{"digest": "{}"}}}}
    }}
  }},
  "scenarios": {{
    "acme/ssh-bf": {{
      "path": "scenarios/acme/ssh-bf.yaml",
      "version": "0.1",
      "versions": {{"0.1": {{"digest": "{}"}}}}
    }}
  }},
  "collections": {{
    "acme/sshd": {{
      "path": "collections/acme/sshd.yaml",
      "version": "0.1",
      "versions": {{"0.1": {{"digest": "{}"}}}},
      "parsers": ["acme/sshd-logs"],
      "scenarios": ["acme/ssh-bf"]
    }}
  }}
}}"#,
            hasher::hash_bytes(SSHD_V1.as_bytes()),
            hasher::hash_bytes(SSHD_V2.as_bytes()),
            hasher::hash_bytes(SSH_BF.as_bytes()),
            hasher::hash_bytes(COLLECTION.as_bytes()),
        )
    }

    struct Fixture {
        _temp_dir: TempDir,
        local: LocalHubConfig,
        items: Items,
    }

    impl Fixture {
        fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let local = LocalHubConfig::under(temp_dir.path());
            let items = parse_index(index_json().as_bytes()).unwrap().items;
            Self {
                _temp_dir: temp_dir,
                local,
                items,
            }
        }

        fn download(&self, remote_path: &str, content: &str) -> PathBuf {
            let path = self.local.hub_dir.join(remote_path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
            path
        }

        fn install_file(&self, relative: &str, content: &str) -> PathBuf {
            let path = self.local.install_dir.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
            path
        }

        #[cfg(unix)]
        fn install_link(&self, relative: &str, target: &Path) -> PathBuf {
            let path = self.local.install_dir.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::os::unix::fs::symlink(target, &path).unwrap();
            path
        }

        fn sync(&mut self) -> SyncOutcome {
            sync_local_state(&mut self.items, &self.local).unwrap()
        }

        fn item(&self, item_type: ItemType, name: &str) -> &Item {
            &self.items[&item_type][name]
        }
    }

    #[test]
    fn test_nothing_on_disk() {
        let mut fixture = Fixture::new();
        let outcome = fixture.sync();

        assert!(outcome.warnings.is_empty());
        for map in fixture.items.values() {
            for item in map.values() {
                assert_eq!(item.state, ItemState::default());
            }
        }
    }

    #[test]
    fn test_downloaded_not_installed() {
        let mut fixture = Fixture::new();
        fixture.download("parsers/s01-parse/acme/sshd-logs.yaml", SSHD_V2);
        fixture.sync();

        let item = fixture.item(ItemType::Parsers, "acme/sshd-logs");
        assert!(item.state.downloaded);
        assert!(!item.state.installed);
        assert!(item.state.up_to_date);
        assert!(!item.state.tainted);
        assert_eq!(item.state.local_version.as_deref(), Some("0.2"));
    }

    #[cfg(unix)]
    #[test]
    fn test_installed_link_pristine() {
        let mut fixture = Fixture::new();
        let hub_file = fixture.download("parsers/s01-parse/acme/sshd-logs.yaml", SSHD_V2);
        let link = fixture.install_link("parsers/s01-parse/sshd-logs.yaml", &hub_file);
        fixture.sync();

        let item = fixture.item(ItemType::Parsers, "acme/sshd-logs");
        assert!(item.state.installed);
        assert!(item.state.downloaded);
        assert!(!item.state.tainted);
        assert!(!item.is_local());
        assert_eq!(item.state.local_path.as_ref(), Some(&link));
    }

    #[cfg(unix)]
    #[test]
    fn test_old_version_is_not_tainted() {
        let mut fixture = Fixture::new();
        let hub_file = fixture.download("parsers/s01-parse/acme/sshd-logs.yaml", SSHD_V1);
        fixture.install_link("parsers/s01-parse/sshd-logs.yaml", &hub_file);
        fixture.sync();

        let item = fixture.item(ItemType::Parsers, "acme/sshd-logs");
        assert!(!item.state.tainted);
        assert!(!item.state.up_to_date);
        assert_eq!(item.state.local_version.as_deref(), Some("0.1"));
    }

    #[cfg(unix)]
    #[test]
    fn test_hand_edited_item_is_tainted() {
        let mut fixture = Fixture::new();
        let hub_file = fixture.download(
            "parsers/s01-parse/acme/sshd-logs.yaml",
            "name: acme/sshd-logs\n# my tweak\n",
        );
        fixture.install_link("parsers/s01-parse/sshd-logs.yaml", &hub_file);
        fixture.sync();

        let item = fixture.item(ItemType::Parsers, "acme/sshd-logs");
        assert!(item.state.installed);
        assert!(item.state.tainted);
        assert_eq!(item.state.local_version.as_deref(), Some(UNKNOWN_VERSION));
    }

    #[test]
    fn test_installed_copy_is_managed() {
        let mut fixture = Fixture::new();
        fixture.install_file("scenarios/ssh-bf.yaml", SSH_BF);
        fixture.sync();

        let item = fixture.item(ItemType::Scenarios, "acme/ssh-bf");
        assert!(item.state.installed);
        assert!(!item.state.downloaded);
        assert!(!item.state.tainted);
        assert!(!item.is_local());
        assert_eq!(fixture.items[&ItemType::Scenarios].len(), 1);
    }

    #[test]
    fn test_modified_copy_is_tainted() {
        let mut fixture = Fixture::new();
        fixture.install_file("scenarios/ssh-bf.yaml", "name: acme/ssh-bf\ncapacity: 1\n");
        fixture.sync();

        let item = fixture.item(ItemType::Scenarios, "acme/ssh-bf");
        assert!(item.state.installed);
        assert!(item.state.tainted);
    }

    #[test]
    fn test_unknown_file_is_local() {
        let mut fixture = Fixture::new();
        let path = fixture.install_file("scenarios/my-scenario.yaml", "name: me/custom\n");
        fixture.sync();

        let item = fixture.item(ItemType::Scenarios, "my-scenario.yaml");
        assert!(item.is_local());
        assert!(item.state.installed);
        assert!(!item.state.tainted);
        assert!(item.remote_path.is_empty());
        assert_eq!(item.state.local_path.as_ref(), Some(&path));
        assert_eq!(
            item.state.local_hash.as_deref(),
            Some(hasher::hash_bytes(b"name: me/custom\n").as_str())
        );
    }

    #[test]
    fn test_staged_local_item_keeps_stage() {
        let mut fixture = Fixture::new();
        fixture.install_file("parsers/s02-enrich/my-enrich.yml", "filter: true\n");
        fixture.sync();

        let item = fixture.item(ItemType::Parsers, "my-enrich.yml");
        assert!(item.is_local());
        assert_eq!(item.stage, "s02-enrich");
    }

    #[test]
    fn test_unrecognized_entries_are_ignored() {
        let mut fixture = Fixture::new();
        fixture.install_file("scenarios/README.md", "notes");
        fixture.install_file("scenarios/nested/deep.yaml", "x: 1\n");
        fixture.install_file("parsers/top-level.yaml", "x: 1\n");
        fixture.install_file("widgets/thing.yaml", "x: 1\n");
        let outcome = fixture.sync();

        assert!(outcome.warnings.is_empty());
        let local_count = fixture
            .items
            .values()
            .flat_map(|m| m.values())
            .filter(|i| i.is_local())
            .count();
        assert_eq!(local_count, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_is_reported() {
        let mut fixture = Fixture::new();
        fixture.install_link(
            "scenarios/ghost.yaml",
            Path::new("/nonexistent/rulehub/ghost.yaml"),
        );
        let outcome = fixture.sync();

        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("dangling link"));
        assert!(!fixture.items[&ItemType::Scenarios].contains_key("ghost.yaml"));
    }

    #[cfg(unix)]
    #[test]
    fn test_link_outside_hub_is_reported() {
        let mut fixture = Fixture::new();
        let outside = fixture.install_file("elsewhere/custom.yaml", "x: 1\n");
        fixture.install_link("scenarios/custom.yaml", &outside);
        let outcome = fixture.sync();

        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("not a hub item"));
    }

    #[cfg(unix)]
    #[test]
    fn test_collection_membership_and_taint() {
        let mut fixture = Fixture::new();
        let parser = fixture.download(
            "parsers/s01-parse/acme/sshd-logs.yaml",
            "name: acme/sshd-logs\n# edited\n",
        );
        let scenario = fixture.download("scenarios/acme/ssh-bf.yaml", SSH_BF);
        let collection = fixture.download("collections/acme/sshd.yaml", COLLECTION);
        fixture.install_link("parsers/s01-parse/sshd-logs.yaml", &parser);
        fixture.install_link("scenarios/ssh-bf.yaml", &scenario);
        fixture.install_link("collections/sshd.yaml", &collection);
        let outcome = fixture.sync();

        let collection = fixture.item(ItemType::Collections, "acme/sshd");
        assert!(collection.state.tainted);
        assert_eq!(collection.state.tainted_by, vec!["parser acme/sshd-logs"]);

        let scenario = fixture.item(ItemType::Scenarios, "acme/ssh-bf");
        assert_eq!(scenario.state.belongs_to_collections, vec!["acme/sshd"]);
        assert!(!scenario.state.tainted);

        assert!(outcome
            .warnings
            .iter()
            .any(|w| w == "collection acme/sshd is tainted by parser acme/sshd-logs"));
    }

    #[cfg(unix)]
    #[test]
    fn test_collection_with_missing_sub_item() {
        let mut fixture = Fixture::new();
        let collection = fixture.download("collections/acme/sshd.yaml", COLLECTION);
        fixture.install_link("collections/sshd.yaml", &collection);
        let outcome = fixture.sync();

        let collection = fixture.item(ItemType::Collections, "acme/sshd");
        assert!(!collection.state.tainted);
        assert_eq!(outcome.warnings.len(), 2);
        assert_eq!(
            outcome.warnings[0],
            "collection acme/sshd is installed but parser acme/sshd-logs is not"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_sync_is_idempotent() {
        let mut fixture = Fixture::new();
        let parser = fixture.download("parsers/s01-parse/acme/sshd-logs.yaml", "edited\n");
        fixture.install_link("parsers/s01-parse/sshd-logs.yaml", &parser);
        fixture.install_file("scenarios/mine.yaml", "x: 1\n");

        let first_outcome = fixture.sync();
        let first_items = fixture.items.clone();
        let second_outcome = fixture.sync();

        assert_eq!(first_outcome, second_outcome);
        assert_eq!(first_items, fixture.items);
    }

    #[test]
    fn test_local_items_dropped_when_file_removed() {
        let mut fixture = Fixture::new();
        let path = fixture.install_file("scenarios/mine.yaml", "x: 1\n");
        fixture.sync();
        assert!(fixture.items[&ItemType::Scenarios].contains_key("mine.yaml"));

        fs::remove_file(path).unwrap();
        fixture.sync();
        assert!(!fixture.items[&ItemType::Scenarios].contains_key("mine.yaml"));
    }

    #[test]
    fn test_unreadable_entry_does_not_abort_pass() {
        let mut fixture = Fixture::new();
        // a directory where a file is expected cannot be hashed
        fs::create_dir_all(fixture.local.hub_dir.join("scenarios/acme/ssh-bf.yaml")).unwrap();
        fixture.download("parsers/s01-parse/acme/sshd-logs.yaml", SSHD_V2);
        let outcome = fixture.sync();

        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(fixture.item(ItemType::Parsers, "acme/sshd-logs").state.downloaded);
    }

    #[test]
    fn test_fails_when_nothing_can_be_evaluated() {
        let temp_dir = TempDir::new().unwrap();
        let local = LocalHubConfig::under(temp_dir.path());
        let json = r#"{"scenarios": {"acme/ssh-bf": {"path": "scenarios/acme/ssh-bf.yaml"}}}"#;
        let mut items = parse_index(json.as_bytes()).unwrap().items;
        fs::create_dir_all(local.hub_dir.join("scenarios/acme/ssh-bf.yaml")).unwrap();

        let before = items.clone();
        let err = sync_local_state(&mut items, &local).unwrap_err();
        match err {
            SyncError::NothingEvaluated { failed, warnings } => {
                assert_eq!(failed, 1);
                assert_eq!(warnings.len(), 1);
                assert!(warnings[0].contains("ssh-bf.yaml"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(items, before);
    }

    #[test]
    fn test_same_local_file_in_two_stages() {
        let mut fixture = Fixture::new();
        fixture.install_file("parsers/s00-raw/custom.yaml", "x: 1\n");
        fixture.install_file("parsers/s01-parse/custom.yaml", "x: 2\n");
        let outcome = fixture.sync();

        let item = fixture.item(ItemType::Parsers, "custom.yaml");
        assert_eq!(item.stage, "s00-raw");
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("clashes with local item custom.yaml"));
    }

    #[test]
    fn test_local_file_named_like_indexed_item() {
        let json = r#"{"scenarios": {"mine.yaml": {"path": "scenarios/acme/other.yaml"}}}"#;
        let mut fixture = Fixture::new();
        fixture.items = parse_index(json.as_bytes()).unwrap().items;
        fixture.install_file("scenarios/mine.yaml", "x: 1\n");
        let outcome = fixture.sync();

        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("clashes with indexed item mine.yaml"));
    }
}
