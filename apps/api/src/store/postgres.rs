use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobPostingRecord, JobPostingRow, NewJobPosting};
use crate::models::profile::ProfileRow;
use crate::store::JobBoardStore;

/// `JobBoardStore` over the backend's Postgres tables `profiles` and `job_postings`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobBoardStore for PgStore {
    async fn get_profile(&self, profile_id: Uuid) -> Result<Option<ProfileRow>, AppError> {
        Ok(sqlx::query_as::<_, ProfileRow>(
            "SELECT id, user_type, display_name, skills, updated_at FROM profiles WHERE id = $1",
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_jobs(&self, limit: i64) -> Result<Vec<JobPostingRow>, AppError> {
        let records = sqlx::query_as::<_, JobPostingRecord>(
            r#"
            SELECT id, business_id, title, profession, skills, location, created_at
            FROM job_postings
            ORDER BY created_at DESC, id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(records.into_iter().map(JobPostingRow::from).collect())
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<JobPostingRow>, AppError> {
        let record = sqlx::query_as::<_, JobPostingRecord>(
            r#"
            SELECT id, business_id, title, profession, skills, location, created_at
            FROM job_postings
            WHERE id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(JobPostingRow::from))
    }

    async fn update_profile_skills(
        &self,
        profile_id: Uuid,
        skills: Option<&str>,
    ) -> Result<Option<ProfileRow>, AppError> {
        let updated = sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE profiles
            SET skills = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, user_type, display_name, skills, updated_at
            "#,
        )
        .bind(skills)
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        if updated.is_some() {
            info!("Updated skills for profile {profile_id}");
        }
        Ok(updated)
    }

    async fn create_job(&self, job: &NewJobPosting) -> Result<JobPostingRow, AppError> {
        let row: JobPostingRow = sqlx::query_as::<_, JobPostingRecord>(
            r#"
            INSERT INTO job_postings (id, business_id, title, profession, skills, location)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, business_id, title, profession, skills, location, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(job.business_id)
        .bind(&job.title)
        .bind(&job.profession)
        .bind(&job.skills)
        .bind(&job.location)
        .fetch_one(&self.pool)
        .await?
        .into();

        info!("Created job posting {} for business {}", row.id, row.business_id);
        Ok(row)
    }
}
