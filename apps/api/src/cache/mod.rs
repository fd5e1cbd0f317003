//! Read-through cache for ranked match lists.
//!
//! Entries are keyed by `(user_id, skills_fingerprint)` so a skills edit can never
//! serve stale matches. Explicit invalidation covers the rest: `invalidate_user`
//! on profile edits and sign-out, `invalidate_all` whenever the job list changes.
//! Every backend carries a job-list generation that `invalidate_all` advances; a
//! computation that started under an older generation is never stored.
//! Presentation (the "NEW" badge) is never cached.

use std::future::Future;

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::ranker::JobMatch;

pub mod memory;
pub mod redis_cache;

pub use memory::InMemoryMatchCache;
pub use redis_cache::RedisMatchCache;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub user_id: Uuid,
    pub skills_fingerprint: String,
}

#[async_trait]
pub trait MatchCache: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<JobMatch>>, AppError>;

    /// Current job-list generation. Read it before computing and hand it to `put`.
    async fn generation(&self) -> Result<u64, AppError>;

    /// Stores `matches` only if the generation is still `generation`.
    /// Returns `false` when the job list changed in the meantime and nothing was written.
    async fn put(
        &self,
        key: &CacheKey,
        generation: u64,
        matches: &[JobMatch],
    ) -> Result<bool, AppError>;

    /// Drops every entry for one user, whatever their skills fingerprint.
    async fn invalidate_user(&self, user_id: Uuid) -> Result<(), AppError>;

    /// Drops every entry. Called when job postings change.
    async fn invalidate_all(&self) -> Result<(), AppError>;

    fn backend(&self) -> &'static str;
}

/// Returns the cached matches for `key`, or computes and stores them.
///
/// Cache failures never fail the request: a broken read counts as a miss and a
/// broken write is only logged. Results computed across an `invalidate_all` are
/// returned but not stored.
pub async fn get_or_compute<F, Fut>(
    cache: &dyn MatchCache,
    key: &CacheKey,
    compute: F,
) -> Result<Vec<JobMatch>, AppError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<JobMatch>, AppError>>,
{
    let generation = match cache.generation().await {
        Ok(generation) => Some(generation),
        Err(e) => {
            warn!("Match cache unavailable, recomputing: {e}");
            None
        }
    };

    if generation.is_some() {
        match cache.get(key).await {
            Ok(Some(matches)) => {
                debug!(
                    "Match cache hit for user {} ({})",
                    key.user_id, key.skills_fingerprint
                );
                return Ok(matches);
            }
            Ok(None) => debug!(
                "Match cache miss for user {} ({})",
                key.user_id, key.skills_fingerprint
            ),
            Err(e) => warn!("Match cache read failed, recomputing: {e}"),
        }
    }

    let matches = compute().await?;

    if let Some(generation) = generation {
        match cache.put(key, generation, &matches).await {
            Ok(true) => {}
            Ok(false) => debug!(
                "Job list changed while computing matches for user {}; not caching",
                key.user_id
            ),
            Err(e) => warn!("Match cache write failed: {e}"),
        }
    }
    Ok(matches)
}
