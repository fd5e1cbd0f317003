use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::SessionSummary;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    /// Identity as reported by the external auth provider.
    pub user_id: Uuid,
}

/// POST /api/v1/session
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SessionSummary>, AppError> {
    let profile = state
        .store
        .get_profile(req.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", req.user_id)))?;

    if !profile.has_known_user_type() {
        warn!(
            "Profile {} has unexpected user_type '{}'",
            profile.id, profile.user_type
        );
    }

    Ok(Json(state.sessions.sign_in(&profile).await))
}

/// GET /api/v1/session/:user_id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    state
        .sessions
        .get(user_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No session for user {user_id}")))
}

/// DELETE /api/v1/session/:user_id
pub async fn handle_sign_out(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.sign_out(user_id).await {
        return Err(AppError::NotFound(format!("No session for user {user_id}")));
    }

    if let Err(e) = state.cache.invalidate_user(user_id).await {
        warn!("Could not drop cached matches for {user_id} at sign-out: {e}");
    }
    Ok(StatusCode::NO_CONTENT)
}
