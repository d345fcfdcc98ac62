//! JSON file backing a store.
//!
//! Owns the on-disk layout: creation and self-repair at open, full-document
//! loads, and whole-file rewrites. Writes go to a temporary file in the
//! target directory and are renamed over the target, so readers never see a
//! partially written document. A symlinked target is written through, and the
//! replaced file keeps its permissions.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::document::Document;
use crate::error::{Error, Result};

/// Indentation used for backup snapshots, independent of the store setting.
pub const BACKUP_INDENT: usize = 4;

/// Handle on the JSON file of one store.
#[derive(Debug, Clone)]
pub(crate) struct DocumentFile {
    path: PathBuf,
    indent: usize,
}

impl DocumentFile {
    /// Ensures a well-formed document exists at `path`.
    ///
    /// Creates the parent directory if needed. A missing, unreadable, or
    /// structurally invalid file is overwritten with an empty document; the
    /// previous contents are lost.
    pub(crate) fn open_or_repair(path: &Path, indent: usize) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                Error::io(format!("creating directory {}", parent.display()), e)
            })?;
        }

        let file = Self {
            path: path.to_path_buf(),
            indent,
        };

        let intact = fs::read(path)
            .ok()
            .is_some_and(|raw| serde_json::from_slice::<Document>(&raw).is_ok());
        if !intact {
            if path.exists() {
                warn!(path = %path.display(), "Store file is corrupt, replacing with an empty document");
            } else {
                debug!(path = %path.display(), "Creating store file");
            }
            let bytes = encode(&Document::new(), indent)?;
            write_file(path, &bytes)?;
        }

        Ok(file)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the whole document.
    pub(crate) async fn load(&self) -> Result<Document> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|e| Error::io(format!("reading {}", self.path.display()), e))?;
        let text = String::from_utf8_lossy(&raw);
        let doc = serde_json::from_str(&text)
            .map_err(|e| Error::json(format!("parsing {}", self.path.display()), e))?;
        debug!(path = %self.path.display(), "Loaded document from disk");
        Ok(doc)
    }

    /// Replaces the file contents with `doc`.
    pub(crate) async fn persist(&self, doc: &Document) -> Result<()> {
        let bytes = encode(doc, self.indent)?;
        write_blocking(self.path.clone(), bytes).await
    }

    /// Writes `doc` to `dest` with [`BACKUP_INDENT`].
    pub(crate) async fn write_snapshot(&self, doc: &Document, dest: &Path) -> Result<()> {
        let bytes = encode(doc, BACKUP_INDENT)?;
        write_blocking(dest.to_path_buf(), bytes).await?;
        debug!(path = %self.path.display(), backup = %dest.display(), "Wrote backup snapshot");
        Ok(())
    }

    /// Copies `source` over the store file byte for byte.
    ///
    /// The contents are not validated; a bad backup surfaces on the next load.
    pub(crate) async fn seed_from(&self, source: &Path) -> Result<()> {
        let raw = tokio::fs::read(source)
            .await
            .map_err(|e| Error::io(format!("reading backup {}", source.display()), e))?;
        write_blocking(self.path.clone(), raw).await
    }
}

/// Pretty-prints `value` with `indent` spaces, leaving non-ASCII text unescaped.
pub(crate) fn encode<T: Serialize>(value: &T, indent: usize) -> Result<Vec<u8>> {
    let indent = vec![b' '; indent];
    let formatter = PrettyFormatter::with_indent(&indent);
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| Error::json("encoding document", e))?;
    Ok(out)
}

async fn write_blocking(path: PathBuf, bytes: Vec<u8>) -> Result<()> {
    tokio::task::spawn_blocking(move || write_file(&path, &bytes))
        .await
        .map_err(|e| Error::io("joining write task", std::io::Error::other(e)))?
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let context = || format!("writing {}", path.display());

    let target = resolve_target(path).map_err(|e| Error::io(context(), e))?;
    let permissions = fs::metadata(&target)
        .map_err(|e| Error::io(context(), e))?
        .permissions();
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(context(), e))?;
    tmp.write_all(bytes).map_err(|e| Error::io(context(), e))?;
    tmp.as_file()
        .set_permissions(permissions)
        .map_err(|e| Error::io(context(), e))?;
    tmp.as_file().sync_all().map_err(|e| Error::io(context(), e))?;
    tmp.persist(&target).map_err(|e| Error::io(context(), e.error))?;
    Ok(())
}

/// The file a write to `path` should replace, following symlinks.
///
/// A missing file is created empty first so it gets the process umask
/// rather than the private mode of a temporary file.
fn resolve_target(path: &Path) -> io::Result<PathBuf> {
    if !path.exists() {
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
    }
    fs::canonicalize(path)
}
