//! Axum route handlers for the Matching API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::cache::{get_or_compute, CacheKey};
use crate::errors::AppError;
use crate::matching::pipeline::{
    job_card, match_jobs, matching_jobs_widget, notifications_feed, ViewParams,
};
use crate::matching::presentation::JobMatchView;
use crate::matching::ranker::JobMatch;
use crate::matching::skills::{parse_skills, skills_fingerprint};
use crate::models::job::JobPostingRow;
use crate::models::profile::ProfileRow;
use crate::session::View;
use crate::state::AppState;

pub const NO_MATCHES_MESSAGE: &str = "No matching jobs found";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MatchesQuery {
    pub user_id: Uuid,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchesResponse {
    pub matches: Vec<JobMatchView>,
    /// Matches before the widget limit was applied.
    pub total_matches: usize,
    pub message: Option<String>,
    pub matcher: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationsResponse {
    pub items: Vec<JobMatchView>,
    pub unread: usize,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub skills: Option<String>,
    #[serde(default)]
    pub jobs: Vec<JobPostingRow>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub skill_tokens: Vec<String>,
    pub matches: Vec<JobMatchView>,
    pub total_matches: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/matches?user_id=&limit=
///
/// Matching-jobs widget: the user's best matches, ranked by match count.
/// A failed job read degrades to an empty list with a message.
pub async fn handle_matching_jobs(
    State(state): State<AppState>,
    Query(params): Query<MatchesQuery>,
) -> Result<Json<MatchesResponse>, AppError> {
    let limit = params.limit.unwrap_or(state.config.matching_jobs_limit);
    let ticket = state
        .sessions
        .begin_fetch(params.user_id, View::MatchingJobs)
        .await;

    ticket
        .run(async {
            let profile = require_profile(&state, params.user_id).await?;
            let user_skills = parse_skills(profile.skills.as_deref());

            let matches = match ranked_matches(&state, &profile, &user_skills).await {
                Ok(matches) => matches,
                Err(e) => {
                    warn!("Matching jobs degraded to empty for {}: {e}", profile.id);
                    Vec::new()
                }
            };

            let view_params = view_params(&state, &user_skills);
            let views = matching_jobs_widget(&matches, limit, view_params);
            Ok::<_, AppError>(Json(MatchesResponse {
                message: views.is_empty().then(|| NO_MATCHES_MESSAGE.to_string()),
                total_matches: matches.len(),
                matches: views,
                matcher: state.matcher.backend().to_string(),
            }))
        })
        .await
}

/// GET /api/v1/notifications?user_id=
///
/// Notifications feed: every matching job, newest first, with an unread count.
pub async fn handle_notifications(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<NotificationsResponse>, AppError> {
    let ticket = state
        .sessions
        .begin_fetch(params.user_id, View::Notifications)
        .await;

    ticket
        .run(async {
            let profile = require_profile(&state, params.user_id).await?;
            let user_skills = parse_skills(profile.skills.as_deref());

            let matches = match ranked_matches(&state, &profile, &user_skills).await {
                Ok(matches) => matches,
                Err(e) => {
                    warn!("Notifications degraded to empty for {}: {e}", profile.id);
                    Vec::new()
                }
            };

            let feed = notifications_feed(&matches, view_params(&state, &user_skills));
            Ok::<_, AppError>(Json(NotificationsResponse {
                message: feed.items.is_empty().then(|| NO_MATCHES_MESSAGE.to_string()),
                unread: feed.unread,
                items: feed.items,
            }))
        })
        .await
}

/// GET /api/v1/jobs/:id/highlights?user_id=
///
/// Job-card highlighting: which of the user's skills this job relates to, and
/// which of the job's skills none of them cover.
pub async fn handle_job_highlights(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<JobMatchView>, AppError> {
    let ticket = state.sessions.begin_fetch(params.user_id, View::JobCard).await;

    ticket
        .run(async {
            let profile = require_profile(&state, params.user_id).await?;
            let job = state
                .store
                .get_job(job_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

            let user_skills = parse_skills(profile.skills.as_deref());
            Ok::<_, AppError>(Json(job_card(job, view_params(&state, &user_skills))))
        })
        .await
}

/// POST /api/v1/matches/preview
///
/// Runs the pipeline over caller-supplied skills and jobs. Touches no storage.
pub async fn handle_preview(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let limit = request.limit.unwrap_or(state.config.matching_jobs_limit);
    let user_skills = parse_skills(request.skills.as_deref());
    let matches = match_jobs(&user_skills, request.jobs, state.matcher.as_ref());
    let views = matching_jobs_widget(&matches, limit, view_params(&state, &user_skills));

    Ok(Json(PreviewResponse {
        total_matches: matches.len(),
        skill_tokens: user_skills,
        matches: views,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn require_profile(state: &AppState, user_id: Uuid) -> Result<ProfileRow, AppError> {
    state
        .store
        .get_profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {user_id} not found")))
}

/// Ranked matches for the profile, read through the shared cache.
async fn ranked_matches(
    state: &AppState,
    profile: &ProfileRow,
    user_skills: &[String],
) -> Result<Vec<JobMatch>, AppError> {
    if user_skills.is_empty() {
        return Ok(Vec::new());
    }

    let key = CacheKey {
        user_id: profile.id,
        skills_fingerprint: skills_fingerprint(user_skills),
    };
    get_or_compute(state.cache.as_ref(), &key, move || async move {
        let jobs = state.store.list_jobs(state.config.job_fetch_limit).await?;
        Ok::<_, AppError>(match_jobs(user_skills, jobs, state.matcher.as_ref()))
    })
    .await
}

fn view_params<'a>(state: &'a AppState, user_skills: &'a [String]) -> ViewParams<'a> {
    ViewParams {
        user_skills,
        matcher: state.matcher.as_ref(),
        now: Utc::now(),
        new_job_window: state.config.new_job_window,
    }
}
