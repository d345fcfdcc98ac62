//! JSON file key-value store with per-key expiration.
//!
//! A store is one JSON file holding two maps:
//!
//! - **`all`**: plain entries
//! - **`expires`**: entries with an absolute expiration stamp
//!
//! A key lives in at most one of them. Reads go through a per-handle cache;
//! every mutation rewrites the whole file. An optional background task evicts
//! expired entries and writes a backup snapshot on an interval.
//!
//! # Example
//!
//! ```ignore
//! use zjson::store::{Store, StoreConfig};
//! use std::time::Duration;
//!
//! let store = Store::open(StoreConfig::new("db.json"))?;
//! store.set("hi", &1, Some(Duration::from_secs(5))).await?;
//! store.sleep(store.ttl("hi").await?.unwrap_or_default()).await;
//! assert_eq!(store.get("hi").await?, None);
//! ```
//!
//! # Corruption
//!
//! A file that is missing, unreadable, or not a two-map document is replaced
//! by an empty document when a handle is opened. Its previous contents are
//! lost without an error being returned.

mod cache;
mod client;
mod document;
mod file;
mod keys;
mod reaper;
mod registry;


// Re-export the public API
pub use crate::config::StoreConfig;
pub use client::Store;
pub use document::{Document, ExpiringEntry, Stored};
pub use file::BACKUP_INDENT;
pub use keys::Keys;
pub use reaper::CleanReport;
pub use registry::is_open;
