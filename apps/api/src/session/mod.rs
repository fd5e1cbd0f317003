//! Signed-in sessions and per-view fetch cancellation.
//!
//! A session starts at sign-in and ends at sign-out. While it lives it owns one
//! cancellation token per view; starting a fetch for a view cancels the previous
//! fetch for that view, so a superseded result is never handed back.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::ProfileRow;

pub mod handlers;

/// The screens that fetch and derive matches independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    MatchingJobs,
    Notifications,
    JobCard,
}

impl View {
    pub fn as_str(self) -> &'static str {
        match self {
            View::MatchingJobs => "matching_jobs",
            View::Notifications => "notifications",
            View::JobCard => "job_card",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub user_id: Uuid,
    pub user_type: String,
    pub started_at: DateTime<Utc>,
}

struct Session {
    summary: SessionSummary,
    token: CancellationToken,
    fetches: HashMap<View, CancellationToken>,
}

impl Session {
    fn end(self) {
        // Child tokens are cancelled along with the session token.
        self.token.cancel();
    }
}

/// Application-level session store, owned by `AppState`.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session for `profile`, ending any previous one for the same user.
    pub async fn sign_in(&self, profile: &ProfileRow) -> SessionSummary {
        let summary = SessionSummary {
            user_id: profile.id,
            user_type: profile.user_type.clone(),
            started_at: Utc::now(),
        };
        let session = Session {
            summary: summary.clone(),
            token: CancellationToken::new(),
            fetches: HashMap::new(),
        };

        let previous = self.sessions.write().await.insert(profile.id, session);
        if let Some(previous) = previous {
            previous.end();
        }
        info!("Session started for {} user {}", summary.user_type, summary.user_id);
        summary
    }

    /// Ends the user's session, cancelling its in-flight fetches.
    /// Returns `false` when there was no session.
    pub async fn sign_out(&self, user_id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&user_id);
        match removed {
            Some(session) => {
                session.end();
                info!("Session ended for user {user_id}");
                true
            }
            None => false,
        }
    }

    pub async fn get(&self, user_id: Uuid) -> Option<SessionSummary> {
        self.sessions
            .read()
            .await
            .get(&user_id)
            .map(|s| s.summary.clone())
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Registers a new fetch for `view`, cancelling the one it replaces.
    ///
    /// Users without a session get a standalone ticket that nothing cancels.
    pub async fn begin_fetch(&self, user_id: Uuid, view: View) -> FetchTicket {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(&user_id) else {
            return FetchTicket {
                token: CancellationToken::new(),
                view,
            };
        };

        let token = session.token.child_token();
        if let Some(previous) = session.fetches.insert(view, token.clone()) {
            previous.cancel();
        }
        FetchTicket { token, view }
    }

    /// Cancels every in-flight fetch of the user, keeping the session itself.
    pub async fn cancel_fetches(&self, user_id: Uuid) {
        if let Some(session) = self.sessions.write().await.get_mut(&user_id) {
            for (_, token) in session.fetches.drain() {
                token.cancel();
            }
        }
    }
}

/// Permission to deliver one fetch result for one view.
pub struct FetchTicket {
    token: CancellationToken,
    view: View,
}

impl FetchTicket {
    /// Drives `fetch` unless the ticket is cancelled first.
    pub async fn run<T, F>(self, fetch: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        let superseded = || {
            warn!("Dropped superseded {} fetch", self.view.as_str());
            AppError::Superseded(format!("{} fetch was superseded", self.view.as_str()))
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(superseded()),
            result = fetch => {
                if self.token.is_cancelled() {
                    Err(superseded())
                } else {
                    result
                }
            }
        }
    }

    #[cfg(test)]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::profile::USER_TYPE_PROFESSIONAL;

    fn profile() -> ProfileRow {
        ProfileRow {
            id: Uuid::new_v4(),
            user_type: USER_TYPE_PROFESSIONAL.to_string(),
            display_name: Some("Ada".to_string()),
            skills: Some("Rust, SQL".to_string()),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_new_fetch_cancels_previous_for_same_view() {
        let registry = SessionRegistry::new();
        let p = profile();
        registry.sign_in(&p).await;

        let first = registry.begin_fetch(p.id, View::MatchingJobs).await;
        let second = registry.begin_fetch(p.id, View::MatchingJobs).await;

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[tokio::test]
    async fn test_fetches_for_other_views_are_independent() {
        let registry = SessionRegistry::new();
        let p = profile();
        registry.sign_in(&p).await;

        let widget = registry.begin_fetch(p.id, View::MatchingJobs).await;
        let _feed = registry.begin_fetch(p.id, View::Notifications).await;

        assert!(!widget.is_cancelled());
    }

    #[tokio::test]
    async fn test_sign_out_cancels_in_flight_fetches() {
        let registry = SessionRegistry::new();
        let p = profile();
        registry.sign_in(&p).await;
        let ticket = registry.begin_fetch(p.id, View::Notifications).await;

        assert!(registry.sign_out(p.id).await);
        assert!(ticket.is_cancelled());
        assert_eq!(registry.active_sessions().await, 0);
        assert!(!registry.sign_out(p.id).await);
    }

    #[tokio::test]
    async fn test_sign_in_again_replaces_session() {
        let registry = SessionRegistry::new();
        let p = profile();
        registry.sign_in(&p).await;
        let ticket = registry.begin_fetch(p.id, View::JobCard).await;

        registry.sign_in(&p).await;

        assert!(ticket.is_cancelled());
        assert_eq!(registry.active_sessions().await, 1);
    }

    #[tokio::test]
    async fn test_without_session_ticket_is_standalone() {
        let registry = SessionRegistry::new();
        let user_id = Uuid::new_v4();
        let first = registry.begin_fetch(user_id, View::MatchingJobs).await;
        let _second = registry.begin_fetch(user_id, View::MatchingJobs).await;
        assert!(!first.is_cancelled());
    }

    #[tokio::test]
    async fn test_run_returns_result_when_not_cancelled() {
        let registry = SessionRegistry::new();
        let ticket = registry.begin_fetch(Uuid::new_v4(), View::MatchingJobs).await;
        let value = ticket.run(async { Ok::<_, AppError>(42) }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_fetch_is_not_delivered() {
        let registry = SessionRegistry::new();
        let p = profile();
        registry.sign_in(&p).await;

        let stale = registry.begin_fetch(p.id, View::MatchingJobs).await;
        let slow = tokio::spawn(stale.run(async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, AppError>("stale")
        }));
        tokio::task::yield_now().await;

        let fresh = registry.begin_fetch(p.id, View::MatchingJobs).await;
        let delivered = fresh.run(async { Ok::<_, AppError>("fresh") }).await.unwrap();

        assert_eq!(delivered, "fresh");
        assert!(matches!(slow.await.unwrap(), Err(AppError::Superseded(_))));
    }

    #[tokio::test]
    async fn test_cancel_fetches_keeps_session() {
        let registry = SessionRegistry::new();
        let p = profile();
        registry.sign_in(&p).await;
        let ticket = registry.begin_fetch(p.id, View::MatchingJobs).await;

        registry.cancel_fetches(p.id).await;

        assert!(ticket.is_cancelled());
        assert!(registry.get(p.id).await.is_some());
    }
}
