//! Rulehub core library exports

pub mod catalog;

pub use catalog::{Hub, HubConfig, HubError, LocalHubConfig, RemoteHubConfig};
