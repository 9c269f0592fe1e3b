use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default entry lifetime: five minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    timestamp: u64,
    value: Value,
}

/// File-backed cache with per-entry TTL. One JSON file per key; expired or
/// corrupted entries are purged on read. Writes are best-effort: a cache
/// failure must never fail the surrounding API call.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(dir: PathBuf, ttl: Duration) -> Self {
        Self { dir, ttl }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let safe_key: String = key
            .chars()
            .map(|c| if c == '/' || c == ':' { '_' } else { c })
            .collect();
        self.dir.join(format!("{}.json", safe_key))
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let path = self.entry_path(key);
        let content = std::fs::read_to_string(&path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(_) => {
                Self::purge(&path);
                return None;
            }
        };

        if now_secs().saturating_sub(entry.timestamp) > self.ttl.as_secs() {
            Self::purge(&path);
            return None;
        }

        Some(entry.value)
    }

    pub fn set(&self, key: &str, value: &Value) {
        let entry = CacheEntry {
            timestamp: now_secs(),
            value: value.clone(),
        };
        if std::fs::create_dir_all(&self.dir).is_err() {
            return;
        }
        let path = self.entry_path(key);
        match serde_json::to_string(&entry) {
            Ok(content) => {
                if let Err(e) = std::fs::write(&path, content) {
                    tracing::debug!("cache write failed for {}: {}", path.display(), e);
                }
            }
            Err(e) => tracing::debug!("cache encode failed for {}: {}", key, e),
        }
    }

    pub fn clear(&self, key: &str) {
        Self::purge(&self.entry_path(key));
    }

    fn purge(path: &Path) {
        let _ = std::fs::remove_file(path);
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cache_in(dir: &Path) -> ResponseCache {
        ResponseCache::new(dir.to_path_buf(), DEFAULT_TTL)
    }

    fn write_entry(cache: &ResponseCache, key: &str, age_secs: u64, value: Value) {
        let entry = CacheEntry {
            timestamp: now_secs() - age_secs,
            value,
        };
        std::fs::write(
            cache.entry_path(key),
            serde_json::to_string(&entry).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn set_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());
        let value = json!([{"id": "srv-1", "name": "chat"}]);

        cache.set("services_list_20", &value);
        assert_eq!(cache.get("services_list_20"), Some(value));
    }

    #[test]
    fn missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cache_in(dir.path()).get("nope"), None);
    }

    #[test]
    fn entry_within_ttl_is_a_hit_and_past_ttl_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());

        write_entry(&cache, "fresh", DEFAULT_TTL.as_secs() - 5, json!(1));
        assert_eq!(cache.get("fresh"), Some(json!(1)));

        write_entry(&cache, "stale", DEFAULT_TTL.as_secs() + 5, json!(2));
        assert_eq!(cache.get("stale"), None);
        // expired entries are deleted, not just skipped
        assert!(!cache.entry_path("stale").exists());
    }

    #[test]
    fn corrupted_entry_is_purged() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());
        std::fs::write(cache.entry_path("bad"), "{not json").unwrap();

        assert_eq!(cache.get("bad"), None);
        assert!(!cache.entry_path("bad").exists());
    }

    #[test]
    fn clear_removes_the_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());
        cache.set("k", &json!(true));
        cache.clear("k");
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn keys_are_sanitized_into_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());
        cache.set("services/list:20", &json!(3));
        assert_eq!(cache.get("services/list:20"), Some(json!(3)));
        assert!(cache.entry_path("services/list:20").ends_with("services_list_20.json"));
    }
}
