//! Lazy key listing over a document snapshot.

use regex::Regex;
use std::iter::FusedIterator;

use crate::error::Result;

/// Compiles an optional search pattern.
pub(crate) fn compile_pattern(pattern: Option<&str>) -> Result<Option<Regex>> {
    Ok(pattern.map(Regex::new).transpose()?)
}

/// Iterator over key names captured when [`Store::keys`] was called.
///
/// Yields plain keys first, then expiring ones, filtered by an unanchored
/// regex search and capped by the limit. Later writes to the store are not
/// observed; call `keys` again for a fresh listing.
///
/// [`Store::keys`]: crate::Store::keys
#[derive(Debug, Clone)]
pub struct Keys {
    names: std::vec::IntoIter<String>,
    pattern: Option<Regex>,
    remaining: Option<usize>,
}

impl Keys {
    /// `limit == 0` means unlimited.
    pub(crate) fn new(names: Vec<String>, pattern: Option<Regex>, limit: usize) -> Self {
        Self {
            names: names.into_iter(),
            pattern,
            remaining: (limit > 0).then_some(limit),
        }
    }
}

impl Iterator for Keys {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.remaining == Some(0) {
            return None;
        }
        let pattern = self.pattern.as_ref();
        let name = self
            .names
            .find(|name| pattern.is_none_or(|re| re.is_match(name)))?;
        if let Some(left) = self.remaining.as_mut() {
            *left -= 1;
        }
        Some(name)
    }
}

impl FusedIterator for Keys {}
