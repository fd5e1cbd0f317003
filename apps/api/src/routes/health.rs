use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus the active cache and matcher backends.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "jobboard-match",
        "cache": state.cache.backend(),
        "matcher": state.matcher.backend(),
        "active_sessions": state.sessions.active_sessions().await,
    }))
}
