//! Test helper functions for integration tests
//!
//! Shared across test files using the tests/common/ pattern.

#![allow(dead_code)]

use rulehub_core::catalog::hasher::hash_bytes;
use rulehub_core::LocalHubConfig;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// A temporary hub layout plus an index under construction
pub struct HubFixture {
    _temp_dir: TempDir,
    pub local: LocalHubConfig,
    index: Map<String, Value>,
}

impl HubFixture {
    pub fn new() -> Self {
        init_test_logging();

        let temp_dir = TempDir::new().expect("create temp dir");
        let local = LocalHubConfig::under(temp_dir.path());
        fs::create_dir_all(&local.hub_dir).expect("create hub dir");

        Self {
            _temp_dir: temp_dir,
            local,
            index: Map::new(),
        }
    }

    /// Declare an item whose only version (0.1) has `content`
    pub fn add_item(&mut self, item_type: &str, name: &str, remote_path: &str, content: &str) {
        self.add_item_with(item_type, name, remote_path, content, json!({}));
    }

    /// Declare an item with extra index fields (sub-items, author, ...)
    pub fn add_item_with(
        &mut self,
        item_type: &str,
        name: &str,
        remote_path: &str,
        content: &str,
        extra: Value,
    ) {
        let mut entry = json!({
            "path": remote_path,
            "version": "0.1",
            "versions": {"0.1": {"digest": hash_bytes(content.as_bytes())}},
        });
        if let (Some(entry), Some(extra)) = (entry.as_object_mut(), extra.as_object()) {
            for (key, value) in extra {
                entry.insert(key.clone(), value.clone());
            }
        }

        self.index
            .entry(item_type.to_string())
            .or_insert_with(|| json!({}))
            .as_object_mut()
            .expect("type map")
            .insert(name.to_string(), entry);
    }

    pub fn index_bytes(&self) -> Vec<u8> {
        serde_json::to_vec_pretty(&Value::Object(self.index.clone())).expect("encode index")
    }

    /// Write the index to the cache file
    pub fn write_index(&self) {
        fs::write(&self.local.index_file, self.index_bytes()).expect("write index");
    }

    /// Place a file in the hub download directory
    pub fn download(&self, remote_path: &str, content: &str) -> PathBuf {
        write_file(&self.local.hub_dir.join(remote_path), content)
    }

    /// Place a regular file in the installation directory
    pub fn install_file(&self, relative: &str, content: &str) -> PathBuf {
        write_file(&self.local.install_dir.join(relative), content)
    }

    /// Link an installation path to a downloaded hub file
    #[cfg(unix)]
    pub fn install_link(&self, relative: &str, remote_path: &str) -> PathBuf {
        let link = self.local.install_dir.join(relative);
        fs::create_dir_all(link.parent().expect("parent")).expect("create install dir");
        std::os::unix::fs::symlink(self.local.hub_dir.join(remote_path), &link)
            .expect("create symlink");
        link
    }

    /// Download and link an item in one step
    #[cfg(unix)]
    pub fn install(&self, relative: &str, remote_path: &str, content: &str) -> PathBuf {
        self.download(remote_path, content);
        self.install_link(relative, remote_path)
    }
}

fn write_file(path: &Path, content: &str) -> PathBuf {
    fs::create_dir_all(path.parent().expect("parent")).expect("create parent dir");
    fs::write(path, content).expect("write file");
    path.to_path_buf()
}
