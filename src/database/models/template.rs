use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobTemplate {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub name: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
