//! Response cache: SHA-256 keys over canonical JSON, LRU-bounded storage.
//!
//! Keys are computed over the request with object keys sorted at every depth, so logically
//! identical requests built in any field order share an entry. Digest collisions are not
//! handled.

use lru::LruCache;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// 64-char lowercase hex SHA-256 of the canonical JSON form of `request`.
pub fn cache_key(request: &Value) -> String {
    let canonical = canonicalize(request).to_string();
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

/// Bounded memo of successful responses, owned by one agent.
pub struct ResponseCache<V> {
    entries: LruCache<String, V>,
    hits: u64,
    misses: u64,
}

impl<V: Clone> ResponseCache<V> {
    /// A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, key: &str) -> Option<V> {
        match self.entries.get(key) {
            Some(v) => {
                self.hits += 1;
                Some(v.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: String, value: V) {
        self.entries.put(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// (hits, misses) since construction.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_is_64_lowercase_hex() {
        let key = cache_key(&json!({"query": "hello"}));
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn key_ignores_nested_field_order() {
        let a: Value = serde_json::from_str(
            r#"{"score": {"credit_score": 67, "risk_level": "Medium"}, "lang": "hindi"}"#,
        )
        .unwrap();
        let b: Value = serde_json::from_str(
            r#"{"lang": "hindi", "score": {"risk_level": "Medium", "credit_score": 67}}"#,
        )
        .unwrap();
        assert_eq!(cache_key(&a), cache_key(&b));
    }

    #[test]
    fn different_requests_get_different_keys() {
        assert_ne!(
            cache_key(&json!({"lang": "hindi"})),
            cache_key(&json!({"lang": "kannada"}))
        );
    }

    #[test]
    fn least_recently_used_entry_is_evicted() {
        let mut cache = ResponseCache::new(2);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        assert_eq!(cache.get("a"), Some(1));
        cache.insert("c".to_string(), 3);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("c"), Some(3));
        assert_eq!(cache.stats(), (3, 1));
    }

    #[test]
    fn zero_capacity_holds_one_entry() {
        let mut cache = ResponseCache::new(0);
        cache.insert("a".to_string(), "x".to_string());
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.get("a").as_deref(), Some("x"));
    }
}
