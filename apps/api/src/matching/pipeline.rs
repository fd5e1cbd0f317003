//! The one matching pipeline shared by every call site:
//! skills string → parser → evaluator → ranker → presentation.
//!
//! Nothing here holds state; identical inputs give identical output.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::matching::evaluator::SkillMatcher;
use crate::matching::presentation::{present, JobMatchView};
use crate::matching::ranker::{rank_by_match_count, JobMatch};
use crate::models::job::JobPostingRow;

/// Inputs the presentation step needs besides the match itself.
#[derive(Clone, Copy)]
pub struct ViewParams<'a> {
    pub user_skills: &'a [String],
    pub matcher: &'a dyn SkillMatcher,
    pub now: DateTime<Utc>,
    pub new_job_window: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsFeed {
    pub items: Vec<JobMatchView>,
    /// Items still carrying the "NEW" badge.
    pub unread: usize,
}

/// Ranks `jobs` against the user's tokens and keeps only jobs with at least one match.
pub fn match_jobs(
    user_skills: &[String],
    jobs: Vec<JobPostingRow>,
    matcher: &dyn SkillMatcher,
) -> Vec<JobMatch> {
    rank_by_match_count(jobs, user_skills, matcher)
        .into_iter()
        .filter(|m| m.match_count() > 0)
        .collect()
}

/// Matching-jobs widget: the best `limit` matches.
pub fn matching_jobs_widget(
    matches: &[JobMatch],
    limit: usize,
    params: ViewParams<'_>,
) -> Vec<JobMatchView> {
    matches.iter().take(limit).map(|m| view(m, params)).collect()
}

/// Notifications feed: every match, newest posting first.
pub fn notifications_feed(matches: &[JobMatch], params: ViewParams<'_>) -> NotificationsFeed {
    let mut items: Vec<JobMatchView> = matches.iter().map(|m| view(m, params)).collect();
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let unread = items.iter().filter(|i| i.is_new).count();
    NotificationsFeed { items, unread }
}

/// Job-card highlighting for a single job. Produced even when nothing matched.
pub fn job_card(job: JobPostingRow, params: ViewParams<'_>) -> JobMatchView {
    let matching_skills = params
        .matcher
        .matching_skills(job.skills.as_deref(), params.user_skills);
    view(
        &JobMatch {
            job,
            matching_skills,
        },
        params,
    )
}

fn view(job_match: &JobMatch, params: ViewParams<'_>) -> JobMatchView {
    let unmatched = params
        .matcher
        .unmatched_job_skills(job_match.job.skills.as_deref(), params.user_skills);
    present(job_match, unmatched, params.now, params.new_job_window)
}
