//! # zjson
//!
//! A single-file, JSON-backed key-value store with optional per-key
//! expiration and a background clean-and-backup task.
//!
//! ## Features
//!
//! - Human-readable store file with configurable indentation
//! - Per-key TTL with lazy eviction on read
//! - Background eviction of expired keys plus periodic backup snapshots
//! - One handle per file per process, enforced at open
//! - Self-repair of missing or corrupt files
//!
//! ## Example
//!
//! ```rust,no_run
//! use zjson::{Store, StoreConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> zjson::Result<()> {
//!     let store = Store::open(
//!         StoreConfig::new("file.json").with_auto_clean_and_backup(true),
//!     )?;
//!
//!     store.set("user:1", &serde_json::json!({"name": "Ada"}), None).await?;
//!     store.set("session", "token", Some(Duration::from_secs(30))).await?;
//!
//!     for key in store.keys(Some("^user:"), 0).await? {
//!         println!("{key} = {:?}", store.get(&key).await?);
//!     }
//!
//!     store.backup(None).await?;
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod store;
pub mod utils;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use store::{CleanReport, Document, ExpiringEntry, Keys, Store, Stored};
