use axum::{extract::Path, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::Principal;
use crate::database::models::{
    ApplicationStatus, JobApplication, JobApplicationWithApplicant,
};
use crate::database::Database;
use crate::error::{ApiError, ApiResult};
use crate::services::{applications, authz};

/// GET /api/jobs/:id/applications - applications for an owned job, newest first
pub async fn list(
    Path(job_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<JobApplicationWithApplicant>>> {
    let pool = Database::pool().await?;
    let job = authz::find_owned_job(&pool, job_id, principal.id).await?;

    let rows = sqlx::query_as::<_, JobApplicationWithApplicant>(
        "SELECT a.id, a.job_id, a.user_id, a.status, a.score, a.notes, a.created_at,
                u.name AS applicant_name, u.email AS applicant_email, u.image AS applicant_image
         FROM job_applications a
         JOIN users u ON u.id = a.user_id
         WHERE a.job_id = $1
         ORDER BY a.created_at DESC",
    )
    .bind(job.id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationUpdate {
    pub status: Option<String>,
    pub score: Option<i32>,
    pub notes: Option<String>,
}

/// PATCH /api/jobs/:id/applications/:app_id
///
/// The single-record path applies the submitted status as-is; only the bulk
/// path enforces the four-value whitelist.
pub async fn update(
    Path((job_id, app_id)): Path<(Uuid, Uuid)>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<ApplicationUpdate>,
) -> ApiResult<Json<JobApplication>> {
    let pool = Database::pool().await?;
    let job = authz::find_owned_job(&pool, job_id, principal.id).await?;

    let application = sqlx::query_as::<_, JobApplication>(
        "SELECT id, job_id, user_id, status, score, notes, created_at
         FROM job_applications WHERE id = $1",
    )
    .bind(app_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Application not found"))?;

    if application.job_id != job.id {
        return Err(ApiError::forbidden(
            "Application does not belong to this job",
        ));
    }

    let updated = sqlx::query_as::<_, JobApplication>(
        "UPDATE job_applications SET
             status = COALESCE($1, status),
             score = COALESCE($2, score),
             notes = COALESCE($3, notes)
         WHERE id = $4
         RETURNING id, job_id, user_id, status, score, notes, created_at",
    )
    .bind(&payload.status)
    .bind(payload.score)
    .bind(&payload.notes)
    .bind(application.id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatusUpdate {
    #[serde(default)]
    pub application_ids: Vec<Uuid>,
    pub status: Option<String>,
}

/// PATCH /api/jobs/:id/applications/bulk - all-or-nothing batch status update
pub async fn bulk_update(
    Path(job_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<BulkStatusUpdate>,
) -> ApiResult<Json<Value>> {
    // Validate fully before touching storage
    let status = payload
        .status
        .as_deref()
        .and_then(ApplicationStatus::parse)
        .ok_or_else(|| ApiError::bad_request("Invalid status value"))?;

    if payload.application_ids.is_empty() {
        return Err(ApiError::bad_request("applicationIds must not be empty"));
    }

    let pool = Database::pool().await?;
    let job = authz::find_owned_job(&pool, job_id, principal.id).await?;

    let updated =
        applications::bulk_update_status(&pool, job.id, &payload.application_ids, status).await?;

    Ok(Json(json!({ "updated": updated })))
}
