use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobPostingRow, NewJobPosting};
use crate::models::profile::ProfileRow;
use crate::store::JobBoardStore;

/// Process-local store backing the test suite.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Tables>>,
}

#[derive(Default)]
struct Tables {
    profiles: Vec<ProfileRow>,
    jobs: Vec<JobPostingRow>,
    fail_job_reads: bool,
    read_delay: Option<Duration>,
    write_delay: Option<Duration>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_profile(&self, profile: ProfileRow) {
        let mut tables = self.inner.write().await;
        tables.profiles.retain(|p| p.id != profile.id);
        tables.profiles.push(profile);
    }

    pub async fn insert_job(&self, job: JobPostingRow) {
        self.inner.write().await.jobs.push(job);
    }

    /// Makes job reads fail, to exercise degraded read paths.
    pub async fn set_fail_job_reads(&self, fail: bool) {
        self.inner.write().await.fail_job_reads = fail;
    }

    /// Delays job-list reads after the snapshot is taken, so writes can land mid-read.
    pub async fn set_read_delay(&self, delay: Option<Duration>) {
        self.inner.write().await.read_delay = delay;
    }

    /// Delays every write, to exercise write timeouts.
    pub async fn set_write_delay(&self, delay: Option<Duration>) {
        self.inner.write().await.write_delay = delay;
    }
}

#[async_trait]
impl JobBoardStore for InMemoryStore {
    async fn get_profile(&self, profile_id: Uuid) -> Result<Option<ProfileRow>, AppError> {
        let tables = self.inner.read().await;
        Ok(tables.profiles.iter().find(|p| p.id == profile_id).cloned())
    }

    async fn list_jobs(&self, limit: i64) -> Result<Vec<JobPostingRow>, AppError> {
        let tables = self.inner.read().await;
        if tables.fail_job_reads {
            return Err(AppError::Internal(anyhow::anyhow!("job_postings unavailable")));
        }
        let mut jobs = tables.jobs.clone();
        let delay = tables.read_delay;
        drop(tables);

        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(usize::try_from(limit).unwrap_or(0));
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(jobs)
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<JobPostingRow>, AppError> {
        let tables = self.inner.read().await;
        if tables.fail_job_reads {
            return Err(AppError::Internal(anyhow::anyhow!("job_postings unavailable")));
        }
        Ok(tables.jobs.iter().find(|j| j.id == job_id).cloned())
    }

    async fn update_profile_skills(
        &self,
        profile_id: Uuid,
        skills: Option<&str>,
    ) -> Result<Option<ProfileRow>, AppError> {
        let delay = self.inner.read().await.write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut tables = self.inner.write().await;
        let Some(profile) = tables.profiles.iter_mut().find(|p| p.id == profile_id) else {
            return Ok(None);
        };
        profile.skills = skills.map(str::to_string);
        profile.updated_at = Utc::now();
        Ok(Some(profile.clone()))
    }

    async fn create_job(&self, job: &NewJobPosting) -> Result<JobPostingRow, AppError> {
        let delay = self.inner.read().await.write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let row = JobPostingRow {
            id: Uuid::new_v4(),
            business_id: job.business_id,
            title: job.title.clone(),
            profession: job.profession.clone(),
            skills: job.skills.clone(),
            location: job.location.clone(),
            created_at: Utc::now(),
        };
        self.inner.write().await.jobs.push(row.clone());
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::ranker::tests::make_job;

    #[tokio::test]
    async fn test_list_jobs_is_recency_descending_and_limited() {
        let store = InMemoryStore::new();
        let old = make_job("old", None, 30);
        let new = make_job("new", None, 1);
        let mid = make_job("mid", None, 10);
        store.insert_job(old.clone()).await;
        store.insert_job(new.clone()).await;
        store.insert_job(mid.clone()).await;

        let jobs = store.list_jobs(2).await.unwrap();
        assert_eq!(jobs.iter().map(|j| j.id).collect::<Vec<_>>(), vec![new.id, mid.id]);
    }

    #[tokio::test]
    async fn test_update_unknown_profile_returns_none() {
        let store = InMemoryStore::new();
        let updated = store
            .update_profile_skills(Uuid::new_v4(), Some("rust"))
            .await
            .unwrap();
        assert!(updated.is_none());
    }
}
