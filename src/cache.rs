//! Time-bounded summary cache.
//!
//! Keys are article URLs, values are finished summaries. Entries expire
//! after a fixed TTL; expiry is checked at read time, so a stale entry is
//! purged by the `get` that discovers it even if no sweep ever runs.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// TTL cache guarded by a single lock. All operations are O(1)-ish and the
/// cache is called at most once per article, so one mutex is enough.
pub struct TtlCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<String, (Instant, String)>>,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_max_entries(ttl, DEFAULT_MAX_ENTRIES)
    }

    /// Cache with an explicit entry bound. When `set` pushes the map past
    /// the bound, the oldest entries are evicted first.
    pub fn with_max_entries(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch a live value. An expired entry is removed and reported absent.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or overwrite, stamping the entry with the current instant.
    pub fn set(&self, key: &str, value: String) {
        let mut entries = self.lock();
        entries.insert(key.to_string(), (Instant::now(), value));
        if entries.len() > self.max_entries {
            Self::evict_oldest(&mut entries, self.max_entries);
        }
    }

    /// Drop every expired entry.
    pub fn sweep(&self) {
        let ttl = self.ttl;
        self.lock().retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn evict_oldest(entries: &mut HashMap<String, (Instant, String)>, keep: usize) {
        let mut by_age: Vec<(Instant, String)> = entries
            .iter()
            .map(|(key, (stored_at, _))| (*stored_at, key.clone()))
            .collect();
        by_age.sort_by_key(|(stored_at, _)| *stored_at);
        for (_, key) in by_age.into_iter().take(entries.len().saturating_sub(keep)) {
            entries.remove(&key);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, (Instant, String)>> {
        // A poisoned lock only means another thread panicked mid-operation;
        // the map itself is still consistent.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_set_then_get() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set("k", "summary".to_string());
        assert_eq!(cache.get("k"), Some("summary".to_string()));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_set_overwrites() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set("k", "old".to_string());
        cache.set("k", "new".to_string());
        assert_eq!(cache.get("k"), Some("new".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expiry_on_read() {
        let cache = TtlCache::new(Duration::from_millis(20));
        cache.set("k", "summary".to_string());
        sleep(Duration::from_millis(40));
        assert_eq!(cache.get("k"), None);
        // The expired entry was purged by the read, not just hidden.
        assert!(cache.is_empty());
    }

    #[test]
    fn test_sweep_removes_expired_only() {
        let cache = TtlCache::new(Duration::from_millis(30));
        cache.set("old", "a".to_string());
        sleep(Duration::from_millis(40));
        cache.set("fresh", "b".to_string());
        cache.sweep();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("fresh"), Some("b".to_string()));
    }

    #[test]
    fn test_eviction_drops_oldest_first() {
        let cache = TtlCache::with_max_entries(Duration::from_secs(60), 2);
        cache.set("a", "1".to_string());
        sleep(Duration::from_millis(5));
        cache.set("b", "2".to_string());
        sleep(Duration::from_millis(5));
        cache.set("c", "3".to_string());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some("2".to_string()));
        assert_eq!(cache.get("c"), Some("3".to_string()));
    }
}
