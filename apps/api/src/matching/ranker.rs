use serde::{Deserialize, Serialize};

use crate::matching::evaluator::SkillMatcher;
use crate::models::job::JobPostingRow;

/// A job together with the user skills it matched. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatch {
    pub job: JobPostingRow,
    pub matching_skills: Vec<String>,
}

impl JobMatch {
    pub fn match_count(&self) -> usize {
        self.matching_skills.len()
    }
}

/// Orders every job by descending match count.
///
/// The sort is stable: jobs with equal counts keep their input order, which is
/// recency-descending when the list comes from the store. The output is a
/// permutation of the input; truncation to a "top N" is left to callers.
pub fn rank_by_match_count(
    jobs: Vec<JobPostingRow>,
    user_skills: &[String],
    matcher: &dyn SkillMatcher,
) -> Vec<JobMatch> {
    let mut ranked: Vec<JobMatch> = jobs
        .into_iter()
        .map(|job| {
            let matching_skills = matcher.matching_skills(job.skills.as_deref(), user_skills);
            JobMatch {
                job,
                matching_skills,
            }
        })
        .collect();

    ranked.sort_by_key(|m| std::cmp::Reverse(m.match_count()));
    ranked
}
