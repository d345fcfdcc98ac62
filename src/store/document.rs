//! In-memory document model.
//!
//! A document holds two ordered maps: `all` for plain entries and `expires`
//! for entries carrying an absolute expiration stamp. A key lives in at most
//! one of them; every mutator here maintains that.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::utils;

/// Expiring entry as persisted in the `expires` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiringEntry {
    /// Stored value.
    pub value: Value,
    /// Absolute expiration, fractional seconds since the Unix epoch.
    #[serde(rename = "expire_stamp")]
    pub expire_at: f64,
}

impl ExpiringEntry {
    /// Creates an entry expiring `ttl` after `now`.
    pub fn new(value: Value, now: f64, ttl: Duration) -> Self {
        Self {
            value,
            expire_at: utils::stamp_after(now, ttl),
        }
    }

    /// An entry is expired once `now` is strictly past its stamp.
    pub fn is_expired(&self, now: f64) -> bool {
        now > self.expire_at
    }

    /// Time left before expiry, `None` once expired.
    pub fn remaining(&self, now: f64) -> Option<Duration> {
        utils::remaining(self.expire_at, now)
    }
}

/// Representation returned by `set`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stored {
    /// Value written to `all`.
    Persistent(Value),
    /// Record written to `expires`.
    Expiring(ExpiringEntry),
}

impl Stored {
    /// The stored value regardless of where it went.
    pub fn value(&self) -> &Value {
        match self {
            Self::Persistent(value) => value,
            Self::Expiring(entry) => &entry.value,
        }
    }

    /// JSON form: the bare value, or `{value, expire_stamp}` for expiring entries.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Persistent(value) => value.clone(),
            Self::Expiring(entry) => serde_json::json!({
                "value": entry.value,
                "expire_stamp": entry.expire_at,
            }),
        }
    }
}

/// Result of looking a key up at a point in time.
#[derive(Debug, PartialEq)]
pub(crate) enum Lookup<'a> {
    Live(&'a Value),
    Expired,
    Missing,
}

/// Root persisted structure.
///
/// Both maps are required when parsing; a file missing either is treated as
/// corrupt and repaired.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub all: IndexMap<String, Value>,
    pub expires: IndexMap<String, ExpiringEntry>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, expiring after `ttl` when given.
    ///
    /// A zero `ttl` stores a non-expiring entry.
    pub fn insert(&mut self, key: &str, value: Value, ttl: Option<Duration>, now: f64) -> Stored {
        match ttl.filter(|ttl| !ttl.is_zero()) {
            Some(ttl) => {
                self.all.shift_remove(key);
                let entry = ExpiringEntry::new(value, now, ttl);
                self.expires.insert(key.to_string(), entry.clone());
                Stored::Expiring(entry)
            },
            None => {
                self.expires.shift_remove(key);
                self.all.insert(key.to_string(), value.clone());
                Stored::Persistent(value)
            },
        }
    }

    pub(crate) fn lookup(&self, key: &str, now: f64) -> Lookup<'_> {
        if let Some(value) = self.all.get(key) {
            return Lookup::Live(value);
        }
        match self.expires.get(key) {
            Some(entry) if entry.is_expired(now) => Lookup::Expired,
            Some(entry) => Lookup::Live(&entry.value),
            None => Lookup::Missing,
        }
    }

    /// Remaining lifetime of an expiring key.
    pub fn ttl(&self, key: &str, now: f64) -> Option<Duration> {
        self.expires.get(key).and_then(|entry| entry.remaining(now))
    }

    /// Removes `key` from both maps, returning whether anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let plain = self.all.shift_remove(key).is_some();
        let expiring = self.expires.shift_remove(key).is_some();
        plain || expiring
    }

    /// Drops every expired entry and returns the evicted keys.
    pub fn evict_expired(&mut self, now: f64) -> Vec<String> {
        let mut evicted = Vec::new();
        self.expires.retain(|key, entry| {
            if entry.is_expired(now) {
                evicted.push(key.clone());
                false
            } else {
                true
            }
        });
        evicted
    }

    /// Key names in iteration order: `all` first, then `expires`.
    pub fn key_names(&self) -> Vec<String> {
        self.all
            .keys()
            .chain(self.expires.keys())
            .cloned()
            .collect()
    }

    /// Total number of entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.all.len() + self.expires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty() && self.expires.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: f64 = 1_000.0;

    #[test]
    fn test_insert_plain_then_expiring_moves_key() {
        let mut doc = Document::new();
        doc.insert("x", json!(10), None, NOW);
        assert!(doc.all.contains_key("x"));

        let stored = doc.insert("x", json!(1), Some(Duration::from_secs(5)), NOW);
        assert!(!doc.all.contains_key("x"));
        assert_eq!(
            stored,
            Stored::Expiring(ExpiringEntry {
                value: json!(1),
                expire_at: 1_005.0,
            })
        );
    }

    #[test]
    fn test_insert_expiring_then_plain_moves_key() {
        let mut doc = Document::new();
        doc.insert("x", json!("a"), Some(Duration::from_secs(5)), NOW);
        let stored = doc.insert("x", json!("b"), None, NOW);

        assert!(doc.expires.is_empty());
        assert_eq!(stored, Stored::Persistent(json!("b")));
        assert_eq!(doc.all.get("x"), Some(&json!("b")));
    }

    #[test]
    fn test_zero_ttl_is_plain() {
        let mut doc = Document::new();
        let stored = doc.insert("k", json!(true), Some(Duration::ZERO), NOW);
        assert_eq!(stored, Stored::Persistent(json!(true)));
        assert!(doc.expires.is_empty());
    }

    #[test]
    fn test_lookup_respects_expiry() {
        let mut doc = Document::new();
        doc.insert("k", json!(1), Some(Duration::from_secs(1)), NOW);

        assert_eq!(doc.lookup("k", NOW + 1.0), Lookup::Live(&json!(1)));
        assert_eq!(doc.lookup("k", NOW + 1.5), Lookup::Expired);
        assert_eq!(doc.lookup("nope", NOW), Lookup::Missing);
    }

    #[test]
    fn test_lookup_stored_null_is_live() {
        let mut doc = Document::new();
        doc.insert("n", Value::Null, None, NOW);
        assert_eq!(doc.lookup("n", NOW), Lookup::Live(&Value::Null));
    }

    #[test]
    fn test_ttl() {
        let mut doc = Document::new();
        doc.insert("k", json!(1), Some(Duration::from_secs(10)), NOW);
        doc.insert("p", json!(1), None, NOW);

        assert_eq!(doc.ttl("k", NOW + 4.0), Some(Duration::from_secs(6)));
        assert_eq!(doc.ttl("k", NOW + 11.0), None);
        assert_eq!(doc.ttl("p", NOW), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut doc = Document::new();
        doc.insert("k", json!(1), None, NOW);
        assert!(doc.remove("k"));
        assert!(!doc.remove("k"));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_evict_expired_keeps_live_and_order() {
        let mut doc = Document::new();
        doc.insert("a", json!(1), Some(Duration::from_secs(1)), NOW);
        doc.insert("b", json!(2), Some(Duration::from_secs(100)), NOW);
        doc.insert("c", json!(3), Some(Duration::from_secs(1)), NOW);
        doc.insert("d", json!(4), Some(Duration::from_secs(100)), NOW);

        let evicted = doc.evict_expired(NOW + 50.0);
        assert_eq!(evicted, vec!["a", "c"]);
        assert_eq!(doc.key_names(), vec!["b", "d"]);
    }

    #[test]
    fn test_key_names_plain_first() {
        let mut doc = Document::new();
        doc.insert("e1", json!(1), Some(Duration::from_secs(1)), NOW);
        doc.insert("p1", json!(1), None, NOW);
        doc.insert("p2", json!(1), None, NOW);
        assert_eq!(doc.key_names(), vec!["p1", "p2", "e1"]);
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn test_wire_format() {
        let mut doc = Document::new();
        doc.expires.insert(
            "k".to_string(),
            ExpiringEntry {
                value: json!([1, 2]),
                expire_at: 12.5,
            },
        );
        let encoded = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            encoded,
            json!({"all": {}, "expires": {"k": {"value": [1, 2], "expire_stamp": 12.5}}})
        );
    }

    #[test]
    fn test_missing_map_does_not_parse() {
        assert!(serde_json::from_str::<Document>(r#"{"all": {}}"#).is_err());
        assert!(serde_json::from_str::<Document>(r#"[1, 2]"#).is_err());
        assert!(serde_json::from_str::<Document>(r#"{"all": {}, "expires": {}}"#).is_ok());
    }
}
