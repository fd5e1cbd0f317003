use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A job posting owned by a business profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPostingRow {
    pub id: Uuid,
    pub business_id: Uuid,
    pub title: String,
    pub profession: String,
    /// Free-text skill labels. Anything that is not a list of strings reads as `None`.
    #[serde(default, deserialize_with = "lenient_skills")]
    pub skills: Option<Vec<String>>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// `job_postings` row as Postgres returns it. `text[]` may hold NULL elements,
/// so skills are decoded loosely and narrowed by [`skills_from_column`].
#[derive(Debug, FromRow)]
pub struct JobPostingRecord {
    pub id: Uuid,
    pub business_id: Uuid,
    pub title: String,
    pub profession: String,
    pub skills: Option<Vec<Option<String>>>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<JobPostingRecord> for JobPostingRow {
    fn from(record: JobPostingRecord) -> Self {
        Self {
            id: record.id,
            business_id: record.business_id,
            title: record.title,
            profession: record.profession,
            skills: skills_from_column(record.skills),
            location: record.location,
            created_at: record.created_at,
        }
    }
}

/// Same rule as the JSON path: a list with a NULL element is malformed and reads as `None`.
pub fn skills_from_column(column: Option<Vec<Option<String>>>) -> Option<Vec<String>> {
    column?.into_iter().collect()
}

/// Fields a business user supplies when posting a job.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJobPosting {
    pub business_id: Uuid,
    pub title: String,
    pub profession: String,
    #[serde(default, deserialize_with = "lenient_skills")]
    pub skills: Option<Vec<String>>,
    pub location: Option<String>,
}

/// Accepts an array of strings; null, scalars, objects and mixed arrays become `None`.
fn lenient_skills<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(None);
    };
    let skills: Option<Vec<String>> = items
        .into_iter()
        .map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect();
    Ok(skills)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job_json(skills: Value) -> Value {
        json!({
            "id": Uuid::nil(),
            "business_id": Uuid::nil(),
            "title": "Frontend Engineer",
            "profession": "Engineering",
            "skills": skills,
            "location": null,
            "created_at": "2026-10-18T10:00:00Z"
        })
    }

    #[test]
    fn test_string_array_skills_are_kept() {
        let job: JobPostingRow = serde_json::from_value(job_json(json!(["React", "MongoDB"]))).unwrap();
        assert_eq!(job.skills, Some(vec!["React".to_string(), "MongoDB".to_string()]));
    }

    #[test]
    fn test_null_skills_read_as_none() {
        let job: JobPostingRow = serde_json::from_value(job_json(Value::Null)).unwrap();
        assert_eq!(job.skills, None);
    }

    #[test]
    fn test_malformed_skills_read_as_none() {
        let job: JobPostingRow = serde_json::from_value(job_json(json!("React, Node"))).unwrap();
        assert_eq!(job.skills, None);

        let job: JobPostingRow = serde_json::from_value(job_json(json!(["React", 3]))).unwrap();
        assert_eq!(job.skills, None);
    }

    fn record(skills: Option<Vec<Option<&str>>>) -> JobPostingRecord {
        JobPostingRecord {
            id: Uuid::nil(),
            business_id: Uuid::nil(),
            title: "Frontend Engineer".to_string(),
            profession: "Engineering".to_string(),
            skills: skills.map(|items| {
                items
                    .into_iter()
                    .map(|item| item.map(str::to_string))
                    .collect()
            }),
            location: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_column_with_null_element_reads_as_none() {
        let job = JobPostingRow::from(record(Some(vec![Some("React"), None])));
        assert_eq!(job.skills, None);
        assert_eq!(job.title, "Frontend Engineer");
    }

    #[test]
    fn test_column_skills_are_kept_or_null() {
        let job = JobPostingRow::from(record(Some(vec![Some("React"), Some("MongoDB")])));
        assert_eq!(job.skills, Some(vec!["React".to_string(), "MongoDB".to_string()]));

        assert_eq!(JobPostingRow::from(record(None)).skills, None);
        assert_eq!(JobPostingRow::from(record(Some(vec![]))).skills, Some(vec![]));
    }

    #[test]
    fn test_missing_skills_field_reads_as_none() {
        let mut raw = job_json(Value::Null);
        raw.as_object_mut().unwrap().remove("skills");
        let job: JobPostingRow = serde_json::from_value(raw).unwrap();
        assert_eq!(job.skills, None);
    }
}
