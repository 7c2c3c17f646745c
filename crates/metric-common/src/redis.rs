/// Redis wrapper with graceful degradation.
///
/// Reads return `Option<T>` and writes return `bool`. On any Redis error the call logs a
/// warning and degrades to a miss or a no-op, so the finder works without Redis.
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tracing::warn;

use crate::error::CommonError;

pub struct RedisCache {
    client: Option<redis::Client>,
}

impl RedisCache {
    /// Build a cache for `url`. A missing or malformed URL yields a cache that never hits.
    pub fn new(url: Option<&str>) -> Self {
        let client = url.and_then(|u| {
            open(u)
                .inspect_err(|e| warn!(error = %e, url = u, "failed to create redis client, cache disabled"))
                .ok()
        });
        Self { client }
    }

    /// A cache that is always disabled.
    pub fn disabled() -> Self {
        Self { client: None }
    }

    /// Send a PING. Returns `true` if Redis is reachable.
    pub async fn is_available(&self) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        let pong: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
        pong.is_ok()
    }

    /// Get a value. `None` if Redis is unavailable or the key doesn't exist.
    pub async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<String>>(key)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis GET failed"))
            .ok()
            .flatten()
    }

    /// Set a value with a TTL in seconds. Returns `true` if successful.
    pub async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis SETEX failed"))
            .is_ok()
    }

    async fn connection(&self) -> Option<MultiplexedConnection> {
        self.client
            .as_ref()?
            .get_multiplexed_async_connection()
            .await
            .inspect_err(|e| warn!(error = %e, "redis connection failed"))
            .ok()
    }
}

fn open(url: &str) -> Result<redis::Client, CommonError> {
    Ok(redis::Client::open(url)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn malformed_url_disables_cache() {
        let cache = RedisCache::new(Some("not a redis url"));
        assert!(cache.client.is_none());
        assert!(!cache.is_available().await);
        assert!(RedisCache::new(None).client.is_none());
        assert!(RedisCache::new(Some("redis://127.0.0.1:6379")).client.is_some());
    }

    #[tokio::test]
    async fn disabled_cache_misses_and_skips_writes() {
        let cache = RedisCache::disabled();
        assert!(!cache.is_available().await);
        assert_eq!(cache.get("mf:v1:missing").await, None);
        assert!(!cache.set_with_ttl("mf:v1:missing", "{}", 10).await);
    }
}
