use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Client as RedisClient;
use tracing::debug;
use uuid::Uuid;

use crate::cache::{CacheKey, MatchCache};
use crate::errors::AppError;
use crate::matching::ranker::JobMatch;

const KEY_PREFIX: &str = "jobboard:matches";

/// KEYS[1] epoch, KEYS[2] user hash; ARGV: expected epoch, fingerprint, payload, ttl.
const PUT_IF_CURRENT: &str = r"
local current = redis.call('GET', KEYS[1]) or '0'
if current ~= ARGV[1] then
  return 0
end
redis.call('DEL', KEYS[2])
redis.call('HSET', KEYS[2], ARGV[2], ARGV[3])
redis.call('EXPIRE', KEYS[2], ARGV[4])
return 1
";

/// Shared cache for all service instances.
///
/// Layout: one Redis hash per user, `jobboard:matches:{epoch}:{user_id}`, whose
/// fields are skills fingerprints. The whole hash expires after `ttl`.
/// `invalidate_all` bumps the epoch counter so every existing hash becomes
/// unreachable and ages out on its own. The epoch doubles as the cache
/// generation: `put` writes only if the epoch is unchanged, checked in the same
/// script that writes.
pub struct RedisMatchCache {
    client: RedisClient,
    ttl: Duration,
}

impl RedisMatchCache {
    pub fn new(client: RedisClient, ttl: Duration) -> Self {
        Self { client, ttl }
    }

    async fn connection(&self) -> Result<MultiplexedConnection, AppError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    async fn epoch(&self, conn: &mut MultiplexedConnection) -> Result<u64, AppError> {
        let epoch: Option<u64> = redis::cmd("GET")
            .arg(epoch_key())
            .query_async(conn)
            .await?;
        Ok(epoch.unwrap_or(0))
    }

    async fn user_key(&self, conn: &mut MultiplexedConnection, user_id: Uuid) -> Result<String, AppError> {
        Ok(user_key(self.epoch(conn).await?, user_id))
    }
}

fn epoch_key() -> String {
    format!("{KEY_PREFIX}:epoch")
}

fn user_key(epoch: u64, user_id: Uuid) -> String {
    format!("{KEY_PREFIX}:{epoch}:{user_id}")
}

#[async_trait]
impl MatchCache for RedisMatchCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<JobMatch>>, AppError> {
        let mut conn = self.connection().await?;
        let hash_key = self.user_key(&mut conn, key.user_id).await?;

        let payload: Option<String> = redis::cmd("HGET")
            .arg(&hash_key)
            .arg(&key.skills_fingerprint)
            .query_async(&mut conn)
            .await?;

        payload
            .map(|p| serde_json::from_str::<Vec<JobMatch>>(&p))
            .transpose()
            .map_err(|e| AppError::Cache(format!("corrupt cache entry {hash_key}: {e}")))
    }

    async fn generation(&self) -> Result<u64, AppError> {
        let mut conn = self.connection().await?;
        self.epoch(&mut conn).await
    }

    async fn put(
        &self,
        key: &CacheKey,
        generation: u64,
        matches: &[JobMatch],
    ) -> Result<bool, AppError> {
        let payload = serde_json::to_string(matches)
            .map_err(|e| AppError::Cache(format!("cannot encode matches: {e}")))?;

        let mut conn = self.connection().await?;
        let hash_key = user_key(generation, key.user_id);

        // One fingerprint per user: a skills edit replaces the previous entry.
        let written: i64 = redis::Script::new(PUT_IF_CURRENT)
            .key(epoch_key())
            .key(&hash_key)
            .arg(generation)
            .arg(&key.skills_fingerprint)
            .arg(payload)
            .arg(self.ttl.as_secs().max(1))
            .invoke_async(&mut conn)
            .await?;

        if written == 1 {
            debug!("Cached {} matches under {hash_key}", matches.len());
        }
        Ok(written == 1)
    }

    async fn invalidate_user(&self, user_id: Uuid) -> Result<(), AppError> {
        let mut conn = self.connection().await?;
        let hash_key = self.user_key(&mut conn, user_id).await?;
        redis::cmd("DEL")
            .arg(&hash_key)
            .query_async::<_, ()>(&mut conn)
            .await?;
        debug!("Invalidated {hash_key}");
        Ok(())
    }

    async fn invalidate_all(&self) -> Result<(), AppError> {
        let mut conn = self.connection().await?;
        let epoch: u64 = redis::cmd("INCR")
            .arg(epoch_key())
            .query_async(&mut conn)
            .await?;
        debug!("Match cache epoch advanced to {epoch}");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
