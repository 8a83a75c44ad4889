//! Expiring response cache keyed by the forecast query.
//!
//! A generic expiring key-value store: raw payloads are kept in memory and
//! optionally written through to a JSON file so cache hits survive process
//! restarts. Expired entries are pruned on access. Failed fetches are never
//! stored, so a failure cannot poison later attempts.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A stored raw payload with its expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    pub payload: String,
    pub expires_at: DateTime<Utc>,
}

pub struct ResponseCache {
    ttl: Duration,
    path: Option<PathBuf>,
    entries: Mutex<HashMap<String, CachedResponse>>,
}

impl ResponseCache {
    /// Open a file-backed cache. A missing or unreadable file starts empty.
    pub fn open(path: PathBuf, ttl_secs: u64) -> Self {
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Discarding unreadable cache file {}: {e}", path.display());
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self {
            ttl: Duration::seconds(ttl_secs as i64),
            path: Some(path),
            entries: Mutex::new(entries),
        }
    }

    /// A cache with no backing file.
    pub fn in_memory(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs as i64),
            path: None,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the unexpired payload for `key`, pruning it if expired.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Utc::now() => Some(entry.payload.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a payload under `key` with the configured expiry.
    pub fn store(&self, key: &str, payload: &str) {
        let mut entries = self.entries.lock();
        entries.insert(
            key.to_string(),
            CachedResponse {
                payload: payload.to_string(),
                expires_at: Utc::now() + self.ttl,
            },
        );
        self.persist(&entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn persist(&self, entries: &HashMap<String, CachedResponse>) {
        let Some(path) = &self.path else {
            return;
        };
        let contents = match serde_json::to_string(entries) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("Failed to serialize cache: {e}");
                return;
            }
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Failed to create cache directory: {e}");
                return;
            }
        }
        if let Err(e) = std::fs::write(path, contents) {
            tracing::warn!("Failed to write cache file {}: {e}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_then_get() {
        let cache = ResponseCache::in_memory(3600);
        cache.store("key", "payload");
        assert_eq!(cache.get("key").as_deref(), Some("payload"));
    }

    #[test]
    fn test_miss_on_unknown_key() {
        let cache = ResponseCache::in_memory(3600);
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_expired_entry_is_pruned() {
        let cache = ResponseCache::in_memory(0);
        cache.store("key", "payload");
        assert!(cache.get("key").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overwrite_replaces_payload() {
        let cache = ResponseCache::in_memory(3600);
        cache.store("key", "first");
        cache.store("key", "second");
        assert_eq!(cache.get("key").as_deref(), Some("second"));
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast_cache.json");

        let cache = ResponseCache::open(path.clone(), 3600);
        cache.store("key", "payload");
        drop(cache);

        let reopened = ResponseCache::open(path, 3600);
        assert_eq!(reopened.get("key").as_deref(), Some("payload"));
    }

    #[test]
    fn test_corrupt_cache_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast_cache.json");
        std::fs::write(&path, "{not json").unwrap();

        let cache = ResponseCache::open(path, 3600);
        assert!(cache.is_empty());
    }
}
