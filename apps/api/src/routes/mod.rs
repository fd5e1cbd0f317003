pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::board::handlers as board;
use crate::matching::handlers as matching;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/session", post(session::handle_sign_in))
        .route(
            "/api/v1/session/:user_id",
            get(session::handle_get_session).delete(session::handle_sign_out),
        )
        // Matching
        .route("/api/v1/matches", get(matching::handle_matching_jobs))
        .route("/api/v1/matches/preview", post(matching::handle_preview))
        .route("/api/v1/notifications", get(matching::handle_notifications))
        .route(
            "/api/v1/jobs/:id/highlights",
            get(matching::handle_job_highlights),
        )
        // Board writes
        .route(
            "/api/v1/profiles/:id/skills",
            patch(board::handle_update_skills),
        )
        .route("/api/v1/jobs", post(board::handle_create_job))
        .with_state(state)
}
