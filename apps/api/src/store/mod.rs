//! Read/write boundary to the external job-board backend.
//!
//! Handlers only see `Arc<dyn JobBoardStore>`. Production uses Postgres and
//! tests use the in-memory store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobPostingRow, NewJobPosting};
use crate::models::profile::ProfileRow;

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[cfg(test)]
pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait JobBoardStore: Send + Sync {
    async fn get_profile(&self, profile_id: Uuid) -> Result<Option<ProfileRow>, AppError>;

    /// Most recent postings first, at most `limit`.
    async fn list_jobs(&self, limit: i64) -> Result<Vec<JobPostingRow>, AppError>;

    async fn get_job(&self, job_id: Uuid) -> Result<Option<JobPostingRow>, AppError>;

    /// Replaces the free-text skills field. Returns the updated profile, or `None` if unknown.
    async fn update_profile_skills(
        &self,
        profile_id: Uuid,
        skills: Option<&str>,
    ) -> Result<Option<ProfileRow>, AppError>;

    async fn create_job(&self, job: &NewJobPosting) -> Result<JobPostingRow, AppError>;
}
