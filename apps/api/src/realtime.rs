//! Realtime change feed from the backend.
//!
//! The backend emits Postgres notifications when rows change. A job change
//! invalidates every cached match list. A profile change (payload: profile id)
//! invalidates that user's entries and cancels their in-flight fetches.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::MatchCache;
use crate::session::SessionRegistry;

pub const JOBS_CHANNEL: &str = "job_postings_changed";
pub const PROFILES_CHANNEL: &str = "profiles_changed";

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    JobsChanged,
    ProfileChanged(Uuid),
    Ignored,
}

pub fn parse_notification(channel: &str, payload: &str) -> ChangeEvent {
    match channel {
        JOBS_CHANNEL => ChangeEvent::JobsChanged,
        PROFILES_CHANNEL => match Uuid::parse_str(payload.trim()) {
            Ok(id) => ChangeEvent::ProfileChanged(id),
            Err(_) => {
                warn!("Ignoring {PROFILES_CHANNEL} notification with payload '{payload}'");
                ChangeEvent::Ignored
            }
        },
        _ => ChangeEvent::Ignored,
    }
}

/// Applies one change to the cache and sessions. Failures are logged, never fatal.
pub async fn apply_change(cache: &dyn MatchCache, sessions: &SessionRegistry, event: ChangeEvent) {
    match event {
        ChangeEvent::JobsChanged => {
            if let Err(e) = cache.invalidate_all().await {
                warn!("Realtime job change: cache invalidation failed: {e}");
            }
        }
        ChangeEvent::ProfileChanged(user_id) => {
            if let Err(e) = cache.invalidate_user(user_id).await {
                warn!("Realtime profile change: cache invalidation failed for {user_id}: {e}");
            }
            sessions.cancel_fetches(user_id).await;
        }
        ChangeEvent::Ignored => {}
    }
}

/// Spawns the listener. It reconnects after a fixed delay until `shutdown` fires.
pub fn spawn_listener(
    pool: PgPool,
    cache: Arc<dyn MatchCache>,
    sessions: SessionRegistry,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match listen(&pool, cache.as_ref(), &sessions, &shutdown).await {
                Ok(()) => {
                    info!("Realtime listener stopped");
                    return;
                }
                Err(e) => warn!(
                    "Realtime listener dropped: {e}; reconnecting in {}s",
                    RECONNECT_DELAY.as_secs()
                ),
            }

            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = tokio::time::sleep(RECONNECT_DELAY) => {}
            }
        }
    })
}

async fn listen(
    pool: &PgPool,
    cache: &dyn MatchCache,
    sessions: &SessionRegistry,
    shutdown: &CancellationToken,
) -> Result<()> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen_all([JOBS_CHANNEL, PROFILES_CHANNEL]).await?;
    info!("Realtime listener subscribed to {JOBS_CHANNEL}, {PROFILES_CHANNEL}");

    // Changes may have happened while disconnected.
    apply_change(cache, sessions, ChangeEvent::JobsChanged).await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            notification = listener.recv() => {
                let notification = notification?;
                debug!(
                    "Change on {}: {}",
                    notification.channel(),
                    notification.payload()
                );
                let event = parse_notification(notification.channel(), notification.payload());
                apply_change(cache, sessions, event).await;
            }
        }
    }
}
