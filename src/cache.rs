use std::collections::HashMap;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

/// Fingerprint a rendered user instruction together with the provider identity.
/// The same question text against two different providers must produce two
/// different keys, and any change to the rendered instruction (e.g. an edited
/// current answer) produces a fresh key.
pub fn cache_key(user_instruction: &str, provider: &str) -> String {
    let hash = Sha256::digest(format!("{provider}:{user_instruction}").as_bytes());
    hex::encode(hash)
}

/// TTL-bounded response cache. Expiry is checked lazily on read; a stale entry
/// is evicted at that point rather than by a background sweep. When disabled,
/// both operations are no-ops and every lookup misses.
#[derive(Debug)]
pub struct ResponseCache {
    entries: HashMap<String, (String, Instant)>,
    ttl: Duration,
    enabled: bool,
}

impl ResponseCache {
    pub fn new(enabled: bool, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            enabled,
        }
    }

    pub fn get(&mut self, key: &str) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    pub fn put(&mut self, key: &str, value: &str) {
        self.put_at(key, value, Instant::now());
    }

    /// Number of stored entries, stale ones included (they are only discovered
    /// on read). Used for status reporting.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn get_at(&mut self, key: &str, now: Instant) -> Option<String> {
        if !self.enabled {
            return None;
        }
        match self.entries.get(key) {
            Some((value, stored_at)) => {
                if now.duration_since(*stored_at) < self.ttl {
                    return Some(value.clone());
                }
            }
            None => return None,
        }
        // Entry exists but has outlived its ttl: evict on read.
        self.entries.remove(key);
        None
    }

    pub(crate) fn put_at(&mut self, key: &str, value: &str, now: Instant) {
        if self.enabled {
            self.entries
                .insert(key.to_string(), (value.to_string(), now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_within_ttl_returns_value() {
        let mut cache = ResponseCache::new(true, Duration::from_secs(3600));
        cache.put("k", "cached answer");
        assert_eq!(cache.get("k").as_deref(), Some("cached answer"));
    }

    #[test]
    fn stale_entry_misses_and_is_evicted() {
        let mut cache = ResponseCache::new(true, Duration::from_secs(10));
        let start = Instant::now();
        cache.put_at("k", "v", start);

        let later = start + Duration::from_secs(11);
        assert_eq!(cache.get_at("k", later), None);
        // Evicted on the stale read, so it stays a miss even within a new ttl.
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get_at("k", later), None);
    }

    #[test]
    fn disabled_cache_never_stores_or_hits() {
        let mut cache = ResponseCache::new(false, Duration::from_secs(3600));
        cache.put("k", "v");
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn key_varies_with_provider_and_prompt() {
        let k1 = cache_key("test prompt", "openrouter");
        let k2 = cache_key("test prompt", "ollama");
        let k3 = cache_key("different prompt", "openrouter");

        assert_ne!(k1, k2);
        assert_ne!(k1, k3);
        assert_eq!(k1, cache_key("test prompt", "openrouter"));
    }

    #[test]
    fn key_is_lowercase_hex() {
        let key = cache_key("prompt", "openrouter");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
