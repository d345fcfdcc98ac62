//! Public store handle.
//!
//! Every operation locks the handle's cache, reads the document through it,
//! applies its change in place, and writes the whole document back before
//! releasing the lock.

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::cache::DocumentCache;
use super::document::{Document, Lookup, Stored};
use super::file::{self, DocumentFile};
use super::keys::{self, Keys};
use super::reaper::{self, CleanReport};
use super::registry::PathLease;
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::utils;

/// Shared state behind every clone of a [`Store`].
pub(crate) struct StoreInner {
    pub(crate) config: StoreConfig,
    pub(crate) file: DocumentFile,
    pub(crate) cache: DocumentCache,
    pub(crate) backup_path: PathBuf,
    reaper: Mutex<Option<JoinHandle<()>>>,
    _lease: PathLease,
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        if let Some(task) = self.reaper.get_mut().take() {
            task.abort();
        }
        info!(path = %self.file.path().display(), "Closed store");
    }
}

/// Handle on one JSON store file.
///
/// Cloning is cheap and clones share one cache; together they count as a
/// single handle for the one-handle-per-path rule. The path is released when
/// the last clone is dropped, or, with the background task enabled, when a
/// clean pass running at that moment finishes.
///
/// # Example
///
/// ```rust,no_run
/// use zjson::{Store, StoreConfig};
/// use std::time::Duration;
///
/// # async fn demo() -> zjson::Result<()> {
/// let store = Store::open(StoreConfig::new("db.json"))?;
/// store.set("x", &10, None).await?;
/// assert_eq!(store.get("x").await?, Some(10.into()));
///
/// store.set("session", "abc", Some(Duration::from_secs(60))).await?;
/// assert!(store.ttl("session").await?.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Opens a handle on the file described by `config`.
    ///
    /// Creates the directory and file if missing and replaces a corrupt file
    /// with an empty document. Starts the background clean-and-backup task
    /// when enabled.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if the configuration fails validation
    /// - [`Error::Runtime`] if the background task is enabled outside a tokio runtime
    /// - [`Error::AlreadyConnected`] if another live handle owns the path
    /// - [`Error::Io`] if the directory or file cannot be created
    pub fn open(config: StoreConfig) -> Result<Self> {
        config.validate()?;

        let runtime = if config.auto_clean_and_backup {
            let handle = Handle::try_current().map_err(|e| {
                Error::Runtime(format!(
                    "auto_clean_and_backup requires a tokio runtime: {e}"
                ))
            })?;
            Some(handle)
        } else {
            None
        };

        let path = config.resolve_path()?;
        let lease = PathLease::acquire(&path)?;
        let file = DocumentFile::open_or_repair(&path, config.indent)?;
        let backup_path = config.backup_path_for(&path);

        let inner = Arc::new(StoreInner {
            config,
            file,
            cache: DocumentCache::new(),
            backup_path,
            reaper: Mutex::new(None),
            _lease: lease,
        });

        if let Some(runtime) = runtime {
            let task = reaper::spawn(&runtime, Arc::downgrade(&inner), inner.config.clean_interval);
            *inner.reaper.lock() = Some(task);
        }

        info!(
            path = %path.display(),
            auto_clean = inner.config.auto_clean_and_backup,
            "Opened store"
        );
        Ok(Self { inner })
    }

    /// Resolved path of the store file.
    pub fn path(&self) -> &Path {
        self.inner.file.path()
    }

    /// Configuration the handle was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Default backup destination.
    pub fn backup_path(&self) -> &Path {
        &self.inner.backup_path
    }

    /// Stores `value` under `key`.
    ///
    /// With a non-zero `expire` the entry goes to the expiring map and any
    /// plain entry for `key` is removed; otherwise the reverse. Set-like
    /// collections are stored as lists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] when `value` has no JSON form (the
    /// store is left untouched), or an IO error if the write fails.
    pub async fn set<V>(&self, key: &str, value: &V, expire: Option<Duration>) -> Result<Stored>
    where
        V: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value)
            .map_err(|e| Error::unsupported_type(std::any::type_name::<V>(), e))?;

        let mut cache = self.inner.cache.lock().await;
        let stored = cache
            .read(&self.inner.file)
            .await?
            .insert(key, value, expire, utils::now_stamp());
        cache.persist(&self.inner.file).await?;

        debug!(key, expiring = matches!(stored, Stored::Expiring(_)), "Stored key");
        Ok(stored)
    }

    /// Returns the value under `key`, or `None` if absent or expired.
    ///
    /// A stored `null` comes back as `Some(Value::Null)`. An expired entry
    /// found here is removed and the removal persisted immediately.
    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut cache = self.inner.cache.lock().await;
        let doc = cache.read(&self.inner.file).await?;

        let found = match doc.lookup(key, utils::now_stamp()) {
            Lookup::Live(value) => Some(value.clone()),
            Lookup::Missing => None,
            Lookup::Expired => {
                doc.remove(key);
                cache.persist(&self.inner.file).await?;
                debug!(key, "Evicted expired key on read");
                None
            },
        };
        Ok(found)
    }

    /// Like [`get`](Self::get), decoding the value into `T`.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)
            .await?
            .map(|value| {
                serde_json::from_value(value)
                    .map_err(|e| Error::json(format!("decoding key '{key}'"), e))
            })
            .transpose()
    }

    /// Time left before `key` expires.
    ///
    /// `None` for plain keys, missing keys, and expired keys.
    pub async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let mut cache = self.inner.cache.lock().await;
        let doc = cache.read(&self.inner.file).await?;
        Ok(doc.ttl(key, utils::now_stamp()))
    }

    /// Removes `key` from both maps and persists.
    ///
    /// Idempotent: an absent key is not an error. Returns whether anything
    /// was removed.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let mut cache = self.inner.cache.lock().await;
        let removed = cache.read(&self.inner.file).await?.remove(key);
        cache.persist(&self.inner.file).await?;

        debug!(key, removed, "Deleted key");
        Ok(removed)
    }

    /// Drops every key and persists an empty document.
    pub async fn delete_all(&self) -> Result<()> {
        let mut cache = self.inner.cache.lock().await;
        cache.invalidate();
        self.inner.file.persist(&Document::new()).await?;

        debug!(path = %self.path().display(), "Cleared store");
        Ok(())
    }

    /// Lists key names, plain keys first, then expiring ones.
    ///
    /// `pattern` is a regular expression searched anywhere in the name;
    /// `limit > 0` caps the number of keys returned. Expired keys that have
    /// not been evicted yet are still listed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] before touching the store if the
    /// pattern does not compile.
    pub async fn keys(&self, pattern: Option<&str>, limit: usize) -> Result<Keys> {
        let pattern = keys::compile_pattern(pattern)?;

        let mut cache = self.inner.cache.lock().await;
        let names = cache.read(&self.inner.file).await?.key_names();
        Ok(Keys::new(names, pattern, limit))
    }

    /// Writes the current document to `destination`, defaulting to
    /// [`backup_path`](Self::backup_path). Backups always use four-space
    /// indentation. Returns the path written.
    pub async fn backup(&self, destination: Option<&Path>) -> Result<PathBuf> {
        let dest = destination.map_or_else(|| self.inner.backup_path.clone(), Path::to_path_buf);

        let mut cache = self.inner.cache.lock().await;
        let doc = cache.read(&self.inner.file).await?;
        self.inner.file.write_snapshot(doc, &dest).await?;
        Ok(dest)
    }

    /// Replaces the store file with the raw contents of `source`.
    ///
    /// The contents are not validated. The cache is dropped so the next
    /// operation reads the restored document.
    pub async fn seed_from_backup(&self, source: impl AsRef<Path>) -> Result<()> {
        let source = source.as_ref();
        let mut cache = self.inner.cache.lock().await;
        self.inner.file.seed_from(source).await?;
        cache.invalidate();

        info!(
            path = %self.path().display(),
            source = %source.display(),
            "Seeded store from backup"
        );
        Ok(())
    }

    /// Runs one clean-and-backup pass now.
    ///
    /// With an empty cache the pass only loads the document; otherwise it
    /// writes a backup, evicts expired keys, and persists.
    pub async fn clean_and_backup(&self) -> Result<CleanReport> {
        reaper::clean_pass(&self.inner).await
    }

    /// Suspends the calling task without blocking others.
    pub async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// Structured dump of the handle configuration.
    pub fn describe(&self) -> Value {
        let config = &self.inner.config;
        serde_json::json!({
            "class_name": "Store",
            "path": self.path().display().to_string(),
            "name": config.name,
            "directory": config.directory.as_ref().map(|d| d.display().to_string()),
            "indent": config.indent,
            "auto_clean_and_backup": config.auto_clean_and_backup,
            "clean_interval_secs": config.clean_interval.as_secs_f64(),
            "backup_path": self.inner.backup_path.display().to_string(),
        })
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.path())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = file::encode(&self.describe(), file::BACKUP_INDENT).map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&bytes))
    }
}
