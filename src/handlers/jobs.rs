use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Principal;
use crate::database::models::Job;
use crate::database::Database;
use crate::error::{ApiError, ApiResult};
use crate::services::authz;

/// GET /api/jobs - the employer's postings, newest first
pub async fn list(Extension(principal): Extension<Principal>) -> ApiResult<Json<Vec<Job>>> {
    let pool = Database::pool().await?;

    let jobs = sqlx::query_as::<_, Job>(
        "SELECT id, employer_id, title, description, status, created_at
         FROM jobs WHERE employer_id = $1 ORDER BY created_at DESC",
    )
    .bind(principal.id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(jobs))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCreate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// POST /api/jobs
pub async fn create(
    Extension(principal): Extension<Principal>,
    Json(payload): Json<JobCreate>,
) -> ApiResult<impl IntoResponse> {
    let title = required(payload.title.as_deref(), "title")?;
    let description = required(payload.description.as_deref(), "description")?;
    let status = payload.status.as_deref().unwrap_or("open");

    let pool = Database::pool().await?;

    let job = sqlx::query_as::<_, Job>(
        "INSERT INTO jobs (id, employer_id, title, description, status, created_at)
         VALUES ($1, $2, $3, $4, $5, now())
         RETURNING id, employer_id, title, description, status, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(principal.id)
    .bind(title)
    .bind(description)
    .bind(status)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/jobs/:id
pub async fn get(
    Path(job_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Job>> {
    let pool = Database::pool().await?;
    let job = authz::find_owned_job(&pool, job_id, principal.id).await?;
    Ok(Json(job))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// PATCH /api/jobs/:id - whitelisted fields only; employer_id is immutable
pub async fn update(
    Path(job_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<JobUpdate>,
) -> ApiResult<Json<Job>> {
    let pool = Database::pool().await?;
    let job = authz::find_owned_job(&pool, job_id, principal.id).await?;

    let updated = sqlx::query_as::<_, Job>(
        "UPDATE jobs SET
             title = COALESCE($1, title),
             description = COALESCE($2, description),
             status = COALESCE($3, status)
         WHERE id = $4
         RETURNING id, employer_id, title, description, status, created_at",
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.status)
    .bind(job.id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(updated))
}

/// DELETE /api/jobs/:id
pub async fn delete(
    Path(job_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<StatusCode> {
    let pool = Database::pool().await?;
    let job = authz::find_owned_job(&pool, job_id, principal.id).await?;

    sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(job.id)
        .execute(&pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{} is required", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_missing_and_blank() {
        assert!(required(None, "title").is_err());
        assert!(required(Some(""), "title").is_err());
        assert!(required(Some("   "), "title").is_err());
        assert_eq!(required(Some("Backend Engineer"), "title").unwrap(), "Backend Engineer");
    }
}
