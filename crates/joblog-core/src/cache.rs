//! In-memory store of built log models.

use dashmap::DashMap;
use joblog_types::{JobLogKey, LogInfo};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

/// Maps a resource key to the most recently built [`LogInfo`].
///
/// Entries are only ever replaced, never merged. A key that was never set is
/// absent; a key whose log expired holds [`LogInfo::empty`].
pub struct LogCache<K = JobLogKey> {
    entries: DashMap<K, Arc<LogInfo>>,
}

impl<K: Eq + Hash> Default for LogCache<K> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<K: Eq + Hash + fmt::Debug> LogCache<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `info` for `key`, replacing any previous model.
    pub fn set(&self, key: K, info: LogInfo) {
        debug!(
            target: "joblog::cache",
            "Caching log model for {:?} ({} bytes)",
            key,
            info.updated_log.len()
        );
        self.entries.insert(key, Arc::new(info));
    }

    pub fn get(&self, key: &K) -> Option<Arc<LogInfo>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Mark the log for `key` as unavailable.
    pub fn clear(&self, key: K) {
        self.set(key, LogInfo::empty());
    }

    /// Forget `key` entirely, so it reads as never fetched.
    pub fn remove(&self, key: &K) -> Option<Arc<LogInfo>> {
        self.entries.remove(key).map(|(_, info)| info)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash> fmt::Debug for LogCache<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_log;
    use std::thread;

    fn key(job_id: u64) -> JobLogKey {
        JobLogKey::new("octo", "widgets", job_id)
    }

    #[test]
    fn test_get_absent() {
        let cache: LogCache = LogCache::new();
        assert!(cache.get(&key(1)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_overwrites() {
        let cache = LogCache::new();
        cache.set(key(1), parse_log("first"));
        cache.set(key(1), parse_log("second"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key(1)).unwrap().updated_log, "second");
    }

    #[test]
    fn test_clear_stores_empty_sentinel() {
        let cache = LogCache::new();
        cache.set(key(1), parse_log("##[group]x\ny"));
        cache.clear(key(1));

        let info = cache.get(&key(1)).expect("cleared entry should be present");
        assert!(info.is_unavailable());
        assert_eq!(*info, LogInfo::empty());
    }

    #[test]
    fn test_remove() {
        let cache = LogCache::new();
        cache.set(key(1), parse_log("a"));
        assert!(cache.remove(&key(1)).is_some());
        assert!(cache.get(&key(1)).is_none());
    }

    #[test]
    fn test_debug_reports_entry_count() {
        let cache = LogCache::new();
        cache.set(key(1), parse_log("a"));
        cache.set(key(2), parse_log("b"));
        assert_eq!(format!("{:?}", cache), "LogCache { entries: 2 }");
    }

    #[test]
    fn test_opaque_keys() {
        let cache: LogCache<String> = LogCache::new();
        cache.set("anything".to_string(), parse_log("text"));
        assert_eq!(cache.get(&"anything".to_string()).unwrap().updated_log, "text");
    }

    #[test]
    fn test_concurrent_sets_for_different_keys() {
        let cache = Arc::new(LogCache::new());
        let handles: Vec<_> = (0..8)
            .map(|job| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for round in 0..50 {
                        cache.set(key(job), parse_log(&format!("job {job} round {round}")));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 8);
        for job in 0..8 {
            assert_eq!(
                cache.get(&key(job)).unwrap().updated_log,
                format!("job {job} round 49")
            );
        }
    }
}
