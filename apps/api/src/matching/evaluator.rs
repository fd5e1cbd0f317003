//! Match Evaluator — pluggable, trait-based check of user skill tokens against a job's skills.
//!
//! Default: `ContainmentMatcher` (bidirectional substring containment, pure and deterministic).
//!
//! `AppState` holds an `Arc<dyn SkillMatcher>`, so every call site (matching-jobs widget,
//! notifications feed, job-card highlighting) goes through the same evaluator.

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Decides which of a user's skill tokens are relevant to a job.
pub trait SkillMatcher: Send + Sync {
    /// Returns the subset of `user_skills` (in their original order) related to
    /// at least one of `job_skills`. `None` or empty job skills match nothing.
    fn matching_skills(&self, job_skills: Option<&[String]>, user_skills: &[String]) -> Vec<String>;

    /// Returns the job skills (original casing) that no user skill relates to.
    fn unmatched_job_skills(
        &self,
        job_skills: Option<&[String]>,
        user_skills: &[String],
    ) -> Vec<String>;

    /// Backend label, reported alongside results for transparency.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// ContainmentMatcher — default implementation
// ────────────────────────────────────────────────────────────────────────────

/// A user skill matches a job skill when either lowercased string contains the other.
///
/// "react" matches "react native" and "react native" matches "react". This also
/// means "java" matches "javascript"; that permissiveness is kept on purpose.
/// No stemming, synonyms or edit distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainmentMatcher;

impl SkillMatcher for ContainmentMatcher {
    fn matching_skills(&self, job_skills: Option<&[String]>, user_skills: &[String]) -> Vec<String> {
        matching_skills(job_skills, user_skills)
    }

    fn unmatched_job_skills(
        &self,
        job_skills: Option<&[String]>,
        user_skills: &[String],
    ) -> Vec<String> {
        unmatched_job_skills(job_skills, user_skills)
    }

    fn backend(&self) -> &'static str {
        "containment"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core containment algorithm
// ────────────────────────────────────────────────────────────────────────────

/// See [`SkillMatcher::matching_skills`]. `user_skills` are expected to be parser
/// output (already lowercase and trimmed); job skills are only lowercased here.
/// Blank job skills are skipped but surrounding whitespace is kept when comparing.
pub fn matching_skills(job_skills: Option<&[String]>, user_skills: &[String]) -> Vec<String> {
    let job_skills = normalized_job_skills(job_skills);
    if job_skills.is_empty() {
        return Vec::new();
    }

    user_skills
        .iter()
        .filter(|user_skill| !user_skill.is_empty())
        .filter(|user_skill| job_skills.iter().any(|job_skill| related(job_skill, user_skill)))
        .cloned()
        .collect()
}

/// See [`SkillMatcher::unmatched_job_skills`].
pub fn unmatched_job_skills(job_skills: Option<&[String]>, user_skills: &[String]) -> Vec<String> {
    let Some(job_skills) = job_skills else {
        return Vec::new();
    };

    job_skills
        .iter()
        .filter(|raw| !raw.trim().is_empty())
        .filter(|raw| {
            let job_skill = raw.to_lowercase();
            !user_skills
                .iter()
                .filter(|user_skill| !user_skill.is_empty())
                .any(|user_skill| related(&job_skill, user_skill))
        })
        .cloned()
        .collect()
}

fn normalized_job_skills(job_skills: Option<&[String]>) -> Vec<String> {
    job_skills
        .unwrap_or_default()
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_lowercase())
        .collect()
}

fn related(job_skill: &str, user_skill: &str) -> bool {
    job_skill.contains(user_skill) || user_skill.contains(job_skill)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
