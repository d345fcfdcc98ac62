//! Background clean-and-backup task.
//!
//! Each pass takes a process-wide lock, so passes of different stores never
//! overlap. A pass against a populated cache writes a backup snapshot,
//! evicts expired entries, and persists; against an empty cache it only
//! loads the document. Failures are logged and never end the task.

use std::sync::{LazyLock, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::client::StoreInner;
use crate::error::Result;
use crate::utils;

static PASS_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// What a clean pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanReport {
    /// The cache was empty; the document was loaded and nothing evicted.
    Warmed,
    /// A backup was written and these expired keys were evicted.
    Cleaned { evicted: Vec<String> },
}

/// Starts the periodic task on `runtime`.
///
/// Between passes the task holds only a weak reference and exits once the
/// store is gone. During a pass it holds a strong one, so the last handle
/// dropped mid-pass releases its path only when that pass ends.
pub(crate) fn spawn(
    runtime: &Handle,
    store: Weak<StoreInner>,
    interval: Duration,
) -> JoinHandle<()> {
    runtime.spawn(run(store, interval))
}

async fn run(store: Weak<StoreInner>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(interval = ?interval, "Starting clean-and-backup loop");

    loop {
        ticker.tick().await;

        let Some(inner) = store.upgrade() else {
            debug!("Store closed, stopping clean-and-backup loop");
            break;
        };

        match clean_pass(&inner).await {
            Ok(CleanReport::Warmed) => {
                debug!(path = %inner.file.path().display(), "Loaded document for cleaning");
            },
            Ok(CleanReport::Cleaned { evicted }) => {
                if !evicted.is_empty() {
                    debug!(
                        path = %inner.file.path().display(),
                        evicted = evicted.len(),
                        "Evicted expired keys"
                    );
                }
            },
            Err(err) => {
                warn!(
                    path = %inner.file.path().display(),
                    error = %err,
                    "Clean pass failed, flushing cached document"
                );
                flush_cached(&inner).await;
            },
        }
    }
}

/// Runs one pass under the process-wide lock.
pub(crate) async fn clean_pass(inner: &StoreInner) -> Result<CleanReport> {
    let _pass = PASS_LOCK.lock().await;
    let mut cache = inner.cache.lock().await;

    if !cache.is_populated() {
        cache.read(&inner.file).await?;
        return Ok(CleanReport::Warmed);
    }

    let doc = cache.read(&inner.file).await?;
    inner.file.write_snapshot(doc, &inner.backup_path).await?;
    let evicted = doc.evict_expired(utils::now_stamp());
    inner.file.persist(doc).await?;

    Ok(CleanReport::Cleaned { evicted })
}

/// Best-effort write of whatever is cached; errors are dropped.
async fn flush_cached(inner: &StoreInner) {
    let cache = inner.cache.lock().await;
    if let Some(doc) = cache.cached()
        && let Err(err) = inner.file.persist(doc).await
    {
        debug!(error = %err, "Best-effort flush failed");
    }
}
