//! Key-value storage capability.
//!
//! Handlers use storage for session data and for sharing values such as the
//! platform access token between workers. The core never touches it; it only
//! carries the handle in the [`Context`](crate::Context).
//!
//! # Example
//!
//! ```rust,ignore
//! async fn visit_count(req: Arc<Request>, storage: Arc<dyn Storage>) -> anyhow::Result<String> {
//!     let key = format!("visits:{}", req.message().sender().unwrap_or_default());
//!     let count = storage.get(&key)?.and_then(|v| v.as_u64()).unwrap_or(0) + 1;
//!     storage.set(&key, count.into(), None)?;
//!     Ok(format!("visit #{count}"))
//! }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use crate::error::StorageResult;

/// A shared key-value store with optional per-entry expiry.
///
/// Implementations must be safe to call from many concurrent dispatches.
pub trait Storage: Send + Sync + 'static {
    /// Returns the value stored under `key`, or `None` if absent or expired.
    fn get(&self, key: &str) -> StorageResult<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// With a `ttl`, the entry stops being visible once it elapses.
    fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> StorageResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> StorageResult<()>;
}

impl dyn Storage {
    /// Reads and deserializes a typed value.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.get(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Serializes and stores a typed value.
    pub fn set_as<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> StorageResult<()> {
        self.set(key, serde_json::to_value(value)?, ttl)
    }
}

#[derive(Debug)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// Writes between two sweeps of expired entries.
const SWEEP_INTERVAL: usize = 256;

/// In-process [`Storage`] backed by a `HashMap`.
///
/// This is the default store installed when the application does not inject
/// one. Contents are lost on restart and are not shared between processes.
///
/// Expired entries are evicted when read, and every [`SWEEP_INTERVAL`]
/// writes the whole map is swept.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Entry>>,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all expired entries and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));

        let purged = before - entries.len();
        if purged > 0 {
            trace!(purged, remaining = entries.len(), "Purged expired storage entries");
        }
        purged
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Expired: another writer may have replaced it since the read lock was released.
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|e| !e.is_live(now)) {
            entries.remove(key);
            trace!(key, "Evicted expired storage entry");
        }
        Ok(None)
    }

    fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> StorageResult<()> {
        let now = Instant::now();
        // A TTL too large to represent never expires.
        let entry = Entry {
            value,
            expires_at: ttl.and_then(|ttl| now.checked_add(ttl)),
        };

        let mut entries = self.entries.write();
        entries.insert(key.to_string(), entry);

        if self.writes.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            let before = entries.len();
            entries.retain(|_, e| e.is_live(now));
            trace!(purged = before - entries.len(), "Swept expired storage entries");
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_set_get_delete() {
        let storage = MemoryStorage::new();
        storage.set("token", json!("abc"), None).unwrap();
        assert_eq!(storage.get("token").unwrap(), Some(json!("abc")));

        storage.set("token", json!("def"), None).unwrap();
        assert_eq!(storage.get("token").unwrap(), Some(json!("def")));

        storage.delete("token").unwrap();
        assert_eq!(storage.get("token").unwrap(), None);
        storage.delete("token").unwrap();
    }

    #[test]
    fn test_expired_entries_are_invisible() {
        let storage = MemoryStorage::new();
        storage.set("short", json!(1), Some(Duration::ZERO)).unwrap();
        storage.set("long", json!(2), Some(Duration::from_secs(3600))).unwrap();

        assert_eq!(storage.get("short").unwrap(), None);
        assert_eq!(storage.get("long").unwrap(), Some(json!(2)));
        assert_eq!(storage.len(), 1);

        assert_eq!(storage.purge_expired(), 0);
        assert_eq!(storage.entries.read().len(), 1);
    }

    #[test]
    fn test_purge_expired_drops_unread_entries() {
        let storage = MemoryStorage::new();
        storage.set("a", json!(1), Some(Duration::ZERO)).unwrap();
        storage.set("b", json!(2), None).unwrap();

        assert_eq!(storage.purge_expired(), 1);
        assert_eq!(storage.entries.read().len(), 1);
    }

    #[test]
    fn test_reading_expired_entry_evicts_it() {
        let storage = MemoryStorage::new();
        for i in 0..100 {
            storage.set(&format!("k{i}"), json!(i), Some(Duration::ZERO)).unwrap();
        }
        for i in 0..100 {
            assert_eq!(storage.get(&format!("k{i}")).unwrap(), None);
        }
        assert!(storage.entries.read().is_empty());
    }

    #[test]
    fn test_writes_sweep_expired_entries() {
        let storage = MemoryStorage::new();
        for i in 0..10_000 {
            storage.set(&format!("k{i}"), json!(i), Some(Duration::ZERO)).unwrap();
        }
        assert!(storage.entries.read().len() < SWEEP_INTERVAL);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let storage = MemoryStorage::new();
        storage.set("forever", json!(true), Some(Duration::MAX)).unwrap();
        assert_eq!(storage.get("forever").unwrap(), Some(json!(true)));
        assert_eq!(storage.purge_expired(), 0);
    }

    #[test]
    fn test_typed_access_through_trait_object() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set_as("visits", &3u32, None).unwrap();
        assert_eq!(storage.get_as::<u32>("visits").unwrap(), Some(3));
        assert_eq!(storage.get_as::<u32>("missing").unwrap(), None);

        storage.set("visits", json!("not a number"), None).unwrap();
        assert!(storage.get_as::<u32>("visits").is_err());
    }
}
