use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::cache::{CacheKey, MatchCache};
use crate::errors::AppError;
use crate::matching::ranker::JobMatch;

struct Entry {
    stored_at: Instant,
    matches: Vec<JobMatch>,
}

#[derive(Default)]
struct Entries {
    generation: u64,
    by_user: HashMap<Uuid, HashMap<String, Entry>>,
}

/// Single-process cache. Used with `CACHE_BACKEND=memory` and in tests.
pub struct InMemoryMatchCache {
    ttl: Duration,
    entries: RwLock<Entries>,
}

impl InMemoryMatchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(Entries::default()),
        }
    }

    fn is_live(&self, entry: &Entry) -> bool {
        entry.stored_at.elapsed() < self.ttl
    }
}

#[async_trait]
impl MatchCache for InMemoryMatchCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<JobMatch>>, AppError> {
        let entries = self.entries.read().await;
        let hit = entries
            .by_user
            .get(&key.user_id)
            .and_then(|by_fingerprint| by_fingerprint.get(&key.skills_fingerprint))
            .filter(|entry| self.is_live(entry))
            .map(|entry| entry.matches.clone());
        Ok(hit)
    }

    async fn generation(&self) -> Result<u64, AppError> {
        Ok(self.entries.read().await.generation)
    }

    async fn put(
        &self,
        key: &CacheKey,
        generation: u64,
        matches: &[JobMatch],
    ) -> Result<bool, AppError> {
        let mut entries = self.entries.write().await;
        if entries.generation != generation {
            return Ok(false);
        }

        entries.by_user.retain(|_, by_fingerprint| {
            by_fingerprint.retain(|_, entry| self.is_live(entry));
            !by_fingerprint.is_empty()
        });

        let by_fingerprint = entries.by_user.entry(key.user_id).or_default();
        // Older fingerprints for this user can never be read again.
        by_fingerprint.clear();
        by_fingerprint.insert(
            key.skills_fingerprint.clone(),
            Entry {
                stored_at: Instant::now(),
                matches: matches.to_vec(),
            },
        );
        Ok(true)
    }

    async fn invalidate_user(&self, user_id: Uuid) -> Result<(), AppError> {
        self.entries.write().await.by_user.remove(&user_id);
        debug!("Invalidated cached matches for user {user_id}");
        Ok(())
    }

    async fn invalidate_all(&self) -> Result<(), AppError> {
        let mut entries = self.entries.write().await;
        entries.generation += 1;
        entries.by_user.clear();
        debug!("Invalidated all cached matches (generation {})", entries.generation);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::ranker::tests::make_job;

    fn key(user_id: Uuid, fingerprint: &str) -> CacheKey {
        CacheKey {
            user_id,
            skills_fingerprint: fingerprint.to_string(),
        }
    }

    fn sample() -> Vec<JobMatch> {
        vec![JobMatch {
            job: make_job("A", Some(vec!["Go"]), 1),
            matching_skills: vec!["go".to_string()],
        }]
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = InMemoryMatchCache::new(Duration::from_secs(60));
        let k = key(Uuid::new_v4(), "f1");
        cache.put(&k, 0, &sample()).await.unwrap();
        assert_eq!(cache.get(&k).await.unwrap(), Some(sample()));
    }

    #[tokio::test]
    async fn test_different_fingerprint_misses() {
        let cache = InMemoryMatchCache::new(Duration::from_secs(60));
        let user = Uuid::new_v4();
        cache.put(&key(user, "f1"), 0, &sample()).await.unwrap();
        assert!(cache.get(&key(user, "f2")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalidate_user_only_touches_that_user() {
        let cache = InMemoryMatchCache::new(Duration::from_secs(60));
        let alice = key(Uuid::new_v4(), "f1");
        let bob = key(Uuid::new_v4(), "f1");
        cache.put(&alice, 0, &sample()).await.unwrap();
        cache.put(&bob, 0, &sample()).await.unwrap();

        cache.invalidate_user(alice.user_id).await.unwrap();

        assert!(cache.get(&alice).await.unwrap().is_none());
        assert!(cache.get(&bob).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalidate_all_clears_everyone() {
        let cache = InMemoryMatchCache::new(Duration::from_secs(60));
        let alice = key(Uuid::new_v4(), "f1");
        let bob = key(Uuid::new_v4(), "f2");
        cache.put(&alice, 0, &sample()).await.unwrap();
        cache.put(&bob, 0, &sample()).await.unwrap();

        cache.invalidate_all().await.unwrap();

        assert!(cache.get(&alice).await.unwrap().is_none());
        assert!(cache.get(&bob).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let cache = InMemoryMatchCache::new(Duration::from_secs(30));
        let k = key(Uuid::new_v4(), "f1");
        cache.put(&k, 0, &sample()).await.unwrap();

        tokio::time::advance(Duration::from_secs(31)).await;

        assert!(cache.get(&k).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_under_stale_generation_is_dropped() {
        let cache = InMemoryMatchCache::new(Duration::from_secs(60));
        let k = key(Uuid::new_v4(), "f1");
        let before = cache.generation().await.unwrap();

        cache.invalidate_all().await.unwrap();

        assert!(!cache.put(&k, before, &sample()).await.unwrap());
        assert!(cache.get(&k).await.unwrap().is_none());

        let now = cache.generation().await.unwrap();
        assert_eq!(now, before + 1);
        assert!(cache.put(&k, now, &sample()).await.unwrap());
        assert_eq!(cache.get(&k).await.unwrap(), Some(sample()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_pruned_on_write() {
        let cache = InMemoryMatchCache::new(Duration::from_secs(30));
        let stale = key(Uuid::new_v4(), "f1");
        cache.put(&stale, 0, &sample()).await.unwrap();

        tokio::time::advance(Duration::from_secs(31)).await;
        let fresh = key(Uuid::new_v4(), "f1");
        cache.put(&fresh, 0, &sample()).await.unwrap();

        let entries = cache.entries.read().await;
        assert_eq!(entries.by_user.len(), 1);
        assert!(entries.by_user.contains_key(&fresh.user_id));
    }
}
