use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FreelancerProject {
    pub id: Uuid,
    /// Owning employer
    pub created_by: Uuid,
    pub title: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FreelancerBid {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub cover_letter: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
