/// Draft content submitted for moderation
///
/// A draft is a field-for-field snapshot of the Job or Internship an
/// admin wants to publish, captured at submission time. The snapshot is
/// stored serialized in the pending queue and must deserialize back to
/// the exact same fields at decision time.
use crate::error::{PortalError, PortalResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Post type discriminant, stored alongside the snapshot in the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostType {
    #[serde(rename = "JOB")]
    Job,
    #[serde(rename = "INTERNSHIP")]
    Internship,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Job => "JOB",
            PostType::Internship => "INTERNSHIP",
        }
    }

    pub fn from_str(s: &str) -> PortalResult<Self> {
        match s {
            "JOB" => Ok(PostType::Job),
            "INTERNSHIP" => Ok(PostType::Internship),
            _ => Err(PortalError::Validation(format!("Invalid post type: {}", s))),
        }
    }
}

/// Draft of a job listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDraft {
    pub title: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub employment_type: Option<String>,
    pub work_model: Option<String>,
    pub experience: Option<String>,
    pub salary: Option<f64>,
    pub skills: Option<String>,
    pub company: String,
    pub job_description: Option<String>,
    pub status: String,
    pub opening_start_date: Option<NaiveDate>,
    pub last_apply_date: Option<NaiveDate>,
    pub number_of_openings: Option<i32>,
    pub perks: Option<String>,
    pub company_description: Option<String>,
}

/// Draft of an internship listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternshipDraft {
    pub title: String,
    pub company: String,
    pub location: String,
    pub duration: Option<String>,
    pub stipend: Option<String>,
    pub qualifications: String,
    pub skills: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub opening_start_date: Option<NaiveDate>,
    pub last_apply_date: Option<NaiveDate>,
    pub number_of_openings: Option<i32>,
    pub perks: Option<String>,
    pub company_description: Option<String>,
}

/// The submitted unit of content, tagged by post type so the decision
/// branch and the snapshot can never disagree about what was queued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DraftContent {
    #[serde(rename = "JOB")]
    Job(JobDraft),
    #[serde(rename = "INTERNSHIP")]
    Internship(InternshipDraft),
}

impl DraftContent {
    pub fn post_type(&self) -> PostType {
        match self {
            DraftContent::Job(_) => PostType::Job,
            DraftContent::Internship(_) => PostType::Internship,
        }
    }

    /// Serialize the snapshot for queue storage
    pub fn serialize(&self) -> PortalResult<String> {
        serde_json::to_string(self)
            .map_err(|e| PortalError::Internal(format!("Failed to serialize draft: {}", e)))
    }

    /// Reconstruct the snapshot at decision time
    pub fn deserialize(content: &str) -> PortalResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| PortalError::Internal(format!("Failed to deserialize draft: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_job_draft() -> JobDraft {
        JobDraft {
            title: Some("Engineer".to_string()),
            location: Some("Pune".to_string()),
            category: Some("IT".to_string()),
            employment_type: Some("Full-time".to_string()),
            work_model: Some("Hybrid".to_string()),
            experience: Some("2-4 years".to_string()),
            salary: Some(1200000.0),
            skills: Some("Rust, SQL".to_string()),
            company: "Acme".to_string(),
            job_description: Some("Build things that stay built.".to_string()),
            status: "OPEN".to_string(),
            opening_start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            last_apply_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            number_of_openings: Some(2),
            perks: Some("Remote fridays".to_string()),
            company_description: Some("Acme makes everything.".to_string()),
        }
    }

    #[test]
    fn test_job_draft_roundtrip_is_exact() {
        let draft = DraftContent::Job(sample_job_draft());

        let serialized = draft.serialize().unwrap();
        let restored = DraftContent::deserialize(&serialized).unwrap();

        assert_eq!(restored, draft);
    }

    #[test]
    fn test_internship_draft_roundtrip_is_exact() {
        let draft = DraftContent::Internship(InternshipDraft {
            title: "Research Intern".to_string(),
            company: "Acme Labs".to_string(),
            location: "Remote".to_string(),
            duration: Some("6 months".to_string()),
            stipend: Some("15000/month".to_string()),
            qualifications: "B.E. in progress".to_string(),
            skills: None,
            description: Some("Assist the research team.".to_string()),
            status: "OPEN".to_string(),
            opening_start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            last_apply_date: None,
            number_of_openings: Some(1),
            perks: None,
            company_description: None,
        });

        let serialized = draft.serialize().unwrap();
        let restored = DraftContent::deserialize(&serialized).unwrap();

        assert_eq!(restored, draft);
    }

    #[test]
    fn test_dates_use_unambiguous_format() {
        let draft = DraftContent::Job(sample_job_draft());
        let serialized = draft.serialize().unwrap();

        assert!(serialized.contains("\"2024-01-01\""));
        assert!(serialized.contains("\"2024-02-01\""));
    }

    #[test]
    fn test_tag_drives_variant() {
        let serialized = DraftContent::Job(sample_job_draft()).serialize().unwrap();
        assert!(serialized.contains("\"type\":\"JOB\""));

        match DraftContent::deserialize(&serialized).unwrap() {
            DraftContent::Job(job) => assert_eq!(job.company, "Acme"),
            DraftContent::Internship(_) => panic!("tag mapped to the wrong variant"),
        }
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let result = DraftContent::deserialize(r#"{"type":"PLACEMENT","company":"Acme"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_post_type_strings() {
        assert_eq!(PostType::from_str("JOB").unwrap(), PostType::Job);
        assert_eq!(
            PostType::from_str("INTERNSHIP").unwrap(),
            PostType::Internship
        );
        assert!(PostType::from_str("job").is_err());
        assert_eq!(PostType::Job.as_str(), "JOB");
    }
}
