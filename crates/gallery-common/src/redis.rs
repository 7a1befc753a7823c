/// Optional Redis backing for the gallery caches.
///
/// Operations report a miss (`None` / `false`) whenever Redis is not configured or not
/// reachable; command failures are logged. Nothing here ever returns an error.
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct RedisCache {
    client: Option<redis::Client>,
}

impl RedisCache {
    /// `None` or an unparsable URL gives a cache that always misses.
    pub fn new(url: Option<&str>) -> Self {
        let client = url.and_then(|u| {
            redis::Client::open(u)
                .inspect_err(|e| warn!(error = %e, url = u, "invalid REDIS_URL, caching disabled"))
                .ok()
        });
        Self { client }
    }

    /// A cache with no backing store.
    pub fn disabled() -> Self {
        Self { client: None }
    }

    /// True when a PING round-trip succeeds.
    pub async fn is_available(&self) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        let pong: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
        pong.is_ok()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<String>>(key)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis GET failed"))
            .ok()
            .flatten()
    }

    /// Store `value` under `key`, expiring after `ttl_secs`.
    pub async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .inspect_err(|e| warn!(error = %e, key, ttl_secs, "redis SETEX failed"))
            .is_ok()
    }

    pub async fn delete(&self, key: &str) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        conn.del::<_, ()>(key)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis DEL failed"))
            .is_ok()
    }

    async fn connection(&self) -> Option<MultiplexedConnection> {
        self.client
            .as_ref()?
            .get_multiplexed_async_connection()
            .await
            .inspect_err(|e| debug!(error = %e, "redis connection unavailable"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::RedisCache;

    #[tokio::test]
    async fn disabled_cache_always_misses() {
        let cache = RedisCache::disabled();
        assert!(!cache.is_available().await);
        assert!(!cache.set_with_ttl("k", "v", 10).await);
        assert_eq!(cache.get("k").await, None);
        assert!(!cache.delete("k").await);
    }

    #[tokio::test]
    async fn malformed_url_disables_cache() {
        let cache = RedisCache::new(Some("not a redis url"));
        assert_eq!(cache.get("k").await, None);
    }
}
