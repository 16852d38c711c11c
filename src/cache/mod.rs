use crate::redis_client::RedisClient;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

pub mod catalogue;

/// Кеш поверх Redis. Без Redis все методы - no-op, ошибки только логируются:
/// источник правды всегда хранилище.
#[derive(Clone)]
pub struct CacheService {
    redis: Option<RedisClient>,
    ttl_seconds: u64,
}

impl CacheService {
    pub fn new(redis: Option<RedisClient>, ttl_seconds: u64) -> Self {
        Self { redis, ttl_seconds }
    }

    pub fn disabled() -> Self {
        Self::new(None, 0)
    }

    pub fn is_enabled(&self) -> bool {
        self.redis.is_some()
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let redis = self.redis.as_ref()?;
        let mut conn = redis.conn.clone();
        let data: Option<String> = match conn.get(key).await {
            Ok(data) => data,
            Err(e) => {
                warn!("Cache read failed for {}: {:?}", key, e);
                return None;
            }
        };
        let parsed = serde_json::from_str(&data?)
            .inspect_err(|e| warn!("Cache entry {} is corrupted: {:?}", key, e))
            .ok();
        debug!("Cache {} for {}", if parsed.is_some() { "HIT" } else { "MISS" }, key);
        parsed
    }

    async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let Some(redis) = self.redis.as_ref() else { return };
        let data = match serde_json::to_string(value) {
            Ok(data) => data,
            Err(e) => {
                warn!("Cache serialize failed for {}: {:?}", key, e);
                return;
            }
        };
        let mut conn = redis.conn.clone();
        if let Err(e) = conn.set_ex::<_, _, ()>(key, data, self.ttl_seconds).await {
            warn!("Cache write failed for {}: {:?}", key, e);
        }
    }

    async fn invalidate(&self, key: &str) {
        let Some(redis) = self.redis.as_ref() else { return };
        let mut conn = redis.conn.clone();
        if let Err(e) = conn.del::<_, ()>(key).await {
            warn!("Cache invalidation failed for {}: {:?}", key, e);
        }
    }
}
