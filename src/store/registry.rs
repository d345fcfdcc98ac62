//! Process-wide registry of open store paths.
//!
//! A path may back at most one live handle per process. Opening a handle
//! takes a [`PathLease`]; dropping the lease frees the path again.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::error::{Error, Result};

static OPEN_PATHS: LazyLock<Mutex<HashSet<PathBuf>>> = LazyLock::new(Default::default);

/// Exclusive claim on a resolved store path.
#[derive(Debug)]
pub(crate) struct PathLease {
    path: PathBuf,
}

impl PathLease {
    /// Claims `path`, failing if another handle holds it.
    pub(crate) fn acquire(path: &Path) -> Result<Self> {
        let mut open = OPEN_PATHS.lock();
        if !open.insert(path.to_path_buf()) {
            return Err(Error::already_connected(path));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for PathLease {
    fn drop(&mut self) {
        OPEN_PATHS.lock().remove(&self.path);
    }
}

/// Returns true while a handle holds `path`.
pub fn is_open(path: &Path) -> bool {
    OPEN_PATHS.lock().contains(path)
}
