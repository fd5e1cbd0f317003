//! Axum route handlers for board writes that invalidate cached matches.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::skills::parse_skills;
use crate::models::job::{JobPostingRow, NewJobPosting};
use crate::models::profile::ProfileRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateSkillsRequest {
    pub skills: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateSkillsResponse {
    pub profile: ProfileRow,
    pub skill_tokens: Vec<String>,
}

/// PATCH /api/v1/profiles/:id/skills
///
/// Replaces the free-text skills field. Match fetches already in flight run on
/// the old skills and are cancelled before the write; fetches that start during
/// or after it are left alone. Cached matches for the user are dropped once the
/// write lands.
pub async fn handle_update_skills(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    Json(req): Json<UpdateSkillsRequest>,
) -> Result<Json<UpdateSkillsResponse>, AppError> {
    state.sessions.cancel_fetches(profile_id).await;

    let profile = state
        .store
        .update_profile_skills(profile_id, req.skills.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {profile_id} not found")))?;

    if let Err(e) = state.cache.invalidate_user(profile_id).await {
        warn!("Could not drop cached matches for {profile_id}: {e}");
    }

    let skill_tokens = parse_skills(profile.skills.as_deref());
    Ok(Json(UpdateSkillsResponse {
        profile,
        skill_tokens,
    }))
}

/// POST /api/v1/jobs
///
/// A business user posts a job. The insert races `job_write_timeout`; on expiry
/// the caller gets 504 and no cache is touched.
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<NewJobPosting>,
) -> Result<(StatusCode, Json<JobPostingRow>), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    if req.profession.trim().is_empty() {
        return Err(AppError::Validation("profession cannot be empty".to_string()));
    }

    let owner = state
        .store
        .get_profile(req.business_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", req.business_id)))?;
    if !owner.is_business() {
        return Err(AppError::Forbidden(
            "Only business profiles can post jobs".to_string(),
        ));
    }

    let timeout = state.config.job_write_timeout;
    let job = tokio::time::timeout(timeout, state.store.create_job(&req))
        .await
        .map_err(|_| {
            AppError::Timeout(format!(
                "Job posting was not saved within {}s",
                timeout.as_secs()
            ))
        })??;

    info!("Job {} posted by {}", job.id, job.business_id);
    if let Err(e) = state.cache.invalidate_all().await {
        warn!("Could not invalidate match cache after new job {}: {e}", job.id);
    }

    Ok((StatusCode::CREATED, Json(job)))
}
