use std::sync::Arc;

use crate::cache::MatchCache;
use crate::config::Config;
use crate::matching::evaluator::SkillMatcher;
use crate::session::SessionRegistry;
use crate::store::JobBoardStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobBoardStore>,
    /// Read-through cache of ranked matches, shared by every call site.
    pub cache: Arc<dyn MatchCache>,
    /// Pluggable skill matcher. Default: ContainmentMatcher.
    pub matcher: Arc<dyn SkillMatcher>,
    /// Signed-in sessions and their per-view fetch tokens.
    pub sessions: SessionRegistry,
    pub config: Config,
}
