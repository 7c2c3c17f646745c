/// Redis caching layer for webhook responses.
///
/// Key schema (namespaced to avoid collisions):
/// - `mf:v1:response:{sha256(query)}` — raw webhook body (TTL: `CACHE_TTL_SECS`)
///
/// The raw body is stored rather than the table so that normalizer changes apply
/// to cached responses too.
use sha2::{Digest, Sha256};

use metric_common::redis::RedisCache;

const KEY_PREFIX: &str = "mf:v1:";

pub struct ResponseCache {
    store: Store,
    ttl_secs: u64,
}

enum Store {
    Redis(RedisCache),
    #[cfg(test)]
    Memory(std::sync::Mutex<std::collections::HashMap<String, String>>),
}

impl ResponseCache {
    pub fn new(redis: RedisCache, ttl_secs: u64) -> Self {
        Self {
            store: Store::Redis(redis),
            ttl_secs,
        }
    }

    pub fn disabled() -> Self {
        Self::new(RedisCache::disabled(), 0)
    }

    /// Process-local store for tests; TTLs are ignored.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            store: Store::Memory(Default::default()),
            ttl_secs: 0,
        }
    }

    pub async fn is_available(&self) -> bool {
        match &self.store {
            Store::Redis(redis) => redis.is_available().await,
            #[cfg(test)]
            Store::Memory(_) => true,
        }
    }

    pub async fn get_response(&self, query: &str) -> Option<String> {
        let key = response_key(query);
        match &self.store {
            Store::Redis(redis) => redis.get(&key).await,
            #[cfg(test)]
            Store::Memory(map) => map.lock().ok()?.get(&key).cloned(),
        }
    }

    pub async fn set_response(&self, query: &str, body: &str) {
        let key = response_key(query);
        match &self.store {
            Store::Redis(redis) => {
                redis.set_with_ttl(&key, body, self.ttl_secs).await;
            }
            #[cfg(test)]
            Store::Memory(map) => {
                if let Ok(mut map) = map.lock() {
                    map.insert(key, body.to_string());
                }
            }
        }
    }
}

/// Deterministic cache key for a query, trimmed so whitespace variants share an entry.
fn response_key(query: &str) -> String {
    let hash = Sha256::digest(query.trim().as_bytes());
    format!("{KEY_PREFIX}response:{:x}", hash)
}
