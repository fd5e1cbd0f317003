use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::ranker::JobMatch;

/// UI-ready annotation for one job card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatchView {
    pub job_id: Uuid,
    pub title: String,
    pub profession: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Drives the "NEW" badge.
    pub is_new: bool,
    pub match_count: usize,
    /// The user's skills this job is relevant to.
    pub matched_skill_labels: Vec<String>,
    /// The job's skills none of the user's skills relate to.
    pub unmatched_skill_labels: Vec<String>,
}

/// `true` when the job is younger than `window` at `now`. Future-dated jobs count as new.
pub fn is_new(created_at: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    now.signed_duration_since(created_at) < window
}

/// Projects a match into its view model. Pure; evaluated fresh on every request.
pub fn present(
    job_match: &JobMatch,
    unmatched_skill_labels: Vec<String>,
    now: DateTime<Utc>,
    window: Duration,
) -> JobMatchView {
    let job = &job_match.job;
    JobMatchView {
        job_id: job.id,
        title: job.title.clone(),
        profession: job.profession.clone(),
        location: job.location.clone(),
        created_at: job.created_at,
        is_new: is_new(job.created_at, now, window),
        match_count: job_match.match_count(),
        matched_skill_labels: job_match.matching_skills.clone(),
        unmatched_skill_labels,
    }
}
