//! Single-slot document cache.
//!
//! Each store handle owns one cache. The slot is behind an async mutex that
//! callers hold for the whole read-modify-write-persist sequence, so the
//! document a write mutates is the same object later reads return.

use tokio::sync::{Mutex, MutexGuard};

use super::document::Document;
use super::file::DocumentFile;
use crate::error::Result;

#[derive(Debug, Default)]
pub(crate) struct DocumentCache {
    slot: Mutex<Option<Document>>,
}

impl DocumentCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to the slot.
    pub(crate) async fn lock(&self) -> CacheGuard<'_> {
        CacheGuard {
            slot: self.slot.lock().await,
        }
    }
}

/// Exclusive access to the cached document.
pub(crate) struct CacheGuard<'a> {
    slot: MutexGuard<'a, Option<Document>>,
}

impl CacheGuard<'_> {
    /// Returns the cached document, loading it from `file` on a miss.
    pub(crate) async fn read(&mut self, file: &DocumentFile) -> Result<&mut Document> {
        let doc = match self.slot.take() {
            Some(doc) => doc,
            None => file.load().await?,
        };
        Ok(self.slot.insert(doc))
    }

    /// The cached document without touching disk.
    pub(crate) fn cached(&self) -> Option<&Document> {
        self.slot.as_ref()
    }

    pub(crate) fn is_populated(&self) -> bool {
        self.slot.is_some()
    }

    /// Drops the cached document; the next read reloads from disk.
    pub(crate) fn invalidate(&mut self) {
        self.slot.take();
    }

    /// Writes the cached document to `file`.
    ///
    /// A failed write also drops the slot, so changes that never reached
    /// disk are not served by later reads.
    pub(crate) async fn persist(&mut self, file: &DocumentFile) -> Result<()> {
        let Some(doc) = self.slot.as_ref() else {
            return Ok(());
        };
        let written = file.persist(doc).await;
        if written.is_err() {
            self.invalidate();
        }
        written
    }
}
