use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub score: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Application row joined with the applicant's public fields, as returned by
/// the per-job listing endpoint.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobApplicationWithApplicant {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub score: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_image: Option<String>,
}

/// The four statuses the bulk update path accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn parse(s: &str) -> Option<ApplicationStatus> {
        match s {
            "pending" => Some(ApplicationStatus::Pending),
            "reviewing" => Some(ApplicationStatus::Reviewing),
            "accepted" => Some(ApplicationStatus::Accepted),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_the_four_allowed_statuses() {
        assert_eq!(ApplicationStatus::parse("pending"), Some(ApplicationStatus::Pending));
        assert_eq!(ApplicationStatus::parse("reviewing"), Some(ApplicationStatus::Reviewing));
        assert_eq!(ApplicationStatus::parse("accepted"), Some(ApplicationStatus::Accepted));
        assert_eq!(ApplicationStatus::parse("rejected"), Some(ApplicationStatus::Rejected));
        assert_eq!(ApplicationStatus::parse("archived"), None);
        assert_eq!(ApplicationStatus::parse("Pending"), None);
        assert_eq!(ApplicationStatus::parse(""), None);
    }
}
