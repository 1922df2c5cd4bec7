use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Null for OAuth-origin accounts; never serialized
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub role: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The subset of user fields safe to attach to other principals' records
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
}
