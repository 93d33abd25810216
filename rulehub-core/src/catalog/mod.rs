//! Rulehub catalog - index ingestion and local state reconciliation
//!
//! This module tracks the remote hub index, compares it with what is
//! installed on disk, and exposes the result as a single [`Hub`].
//!
//! # Overview
//!
//! - Refresh the cached index from the remote hub (optional)
//! - Parse the index into typed [`Items`]
//! - Fingerprint downloaded and installed files, flagging local-only
//!   and tainted items
//! - Answer aggregate queries (item counts, warnings)
//!
//! # Architecture
//!
//! ```text
//! Remote hub
//!     │
//!     └── .index.json          ← fetched through IndexSource
//!            │
//!            ▼
//!     hub_dir/.index.json      ← byte-compared cache
//!            │  parse
//!            ▼
//!     Items                    ← typed catalog
//!            │  sync (hub_dir + install_dir)
//!            ▼
//!     Hub                      ← stats, warnings, lookups
//! ```

mod config;
mod error;
mod hub;
mod item;
mod remote;

pub mod hasher;
pub mod index;
pub mod sync;

pub use config::{HubConfig, LocalHubConfig, CONFIG_FILE, INDEX_FILE};
pub use error::{ConfigError, FetchError, HubError, IndexError, SyncError};
pub use hub::{item_stats, Hub};
pub use item::{Item, ItemRef, ItemState, ItemType, ItemVersion, Items};
pub use remote::{update_index, IndexSource, IndexUpdate, RemoteHubConfig, FETCH_TIMEOUT};
