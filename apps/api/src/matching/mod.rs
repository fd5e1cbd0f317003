// Skill-based job matching.
// One pipeline (parser → evaluator → ranker → presentation) serves the
// matching-jobs widget, the notifications feed and job-card highlighting.

pub mod evaluator;
pub mod handlers;
pub mod pipeline;
pub mod presentation;
pub mod ranker;
pub mod skills;
